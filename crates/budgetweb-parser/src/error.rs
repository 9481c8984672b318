//! Error types for budgetweb-parser
//!
//! Statement parsing never fails as a whole; a bad line is dropped and the
//! reason recorded.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a statement line produced no transaction
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    #[error("expected at least 3 fields, found {found}")]
    TooFewFields { found: usize },

    #[error("unable to parse date format: {value}")]
    UnrecognizedDate { value: String },

    #[error("not a calendar date: {value}")]
    InvalidDate { value: String },

    #[error("invalid amount: {value}")]
    InvalidAmount { value: String },

    #[error("missing description")]
    MissingDescription,

    #[error("amount {value} pushes the statement totals out of range")]
    AmountOutOfRange { value: String },
}
