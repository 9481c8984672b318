//! Route modules for the API server
//!
//! Every module mounts under `/api/v1/finance`:
//! - transactions: paginated list and CRUD
//! - budgets: budget CRUD
//! - goals: goal CRUD
//! - monthly: monthly aggregates, manual entries, rebuild
//! - stats: all-time overview
//! - bank: accounts and statement import
//!
//! Each module has a `mod.rs` with its exports and an `api.rs` with the
//! JSON handlers.

pub mod bank;
pub mod budgets;
pub mod goals;
pub mod monthly;
pub mod stats;
pub mod transactions;
