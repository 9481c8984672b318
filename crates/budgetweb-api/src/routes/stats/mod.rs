//! Financial overview route

pub mod api;

pub use api::api_stats;
