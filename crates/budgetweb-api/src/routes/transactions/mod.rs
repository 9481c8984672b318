//! Transaction routes - paginated list, create, update, delete
//!
//! Writes trigger a recompute of the affected months.

pub mod api;

pub use api::{
    api_transaction_create, api_transaction_delete, api_transaction_detail, api_transaction_update,
    api_transactions,
};
