//! Budget routes
//!
//! Budget changes refresh the monthly aggregates their date window touches.

pub mod api;

pub use api::{api_budget_create, api_budget_delete, api_budget_update, api_budgets};
