//! Monthly aggregate routes - list, manual entry, rebuild

pub mod api;

pub use api::{api_monthly, api_monthly_rebuild, api_monthly_upsert};
