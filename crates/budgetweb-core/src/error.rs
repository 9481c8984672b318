//! Error types for budgetweb-core
//!
//! This module provides error handling for the finance services, including
//! error codes, detailed messages, and suggestions.

use serde::{Deserialize, Serialize};
use std::io;
use thiserror::Error;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Record does not exist
    NotFound,
    /// Record belongs to another user
    Forbidden,
    /// Input failed validation
    ValidationError,
    /// Unique key already taken
    DuplicateEntry,
    /// Backing store failed
    StoreError,
    /// One or more months could not be aggregated
    AggregationFailed,
    /// IO error
    IoError,
    /// Snapshot (de)serialization failed
    SerializationError,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::NotFound => write!(f, "NOT_FOUND"),
            ErrorCode::Forbidden => write!(f, "FORBIDDEN"),
            ErrorCode::ValidationError => write!(f, "VALIDATION_ERROR"),
            ErrorCode::DuplicateEntry => write!(f, "DUPLICATE_ENTRY"),
            ErrorCode::StoreError => write!(f, "STORE_ERROR"),
            ErrorCode::AggregationFailed => write!(f, "AGGREGATION_FAILED"),
            ErrorCode::IoError => write!(f, "IO_ERROR"),
            ErrorCode::SerializationError => write!(f, "SERIALIZATION_ERROR"),
        }
    }
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// Suggestions for resolution
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl ErrorDetails {
    /// Create a new error detail
    pub fn new(code: ErrorCode, message: String) -> Self {
        Self {
            code,
            message,
            details: None,
            suggestions: vec![],
        }
    }

    /// Add detail information
    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.details = Some(detail);
        self
    }

    /// Add a suggestion
    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestions.push(suggestion);
        self
    }
}

impl std::fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref details) = self.details {
            write!(f, "\nDetails: {}", details)?;
        }
        if !self.suggestions.is_empty() {
            write!(f, "\nSuggestions:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n  - {}", suggestion)?;
            }
        }
        Ok(())
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    /// Informational
    Info,
    /// Warning - operation may be affected
    Warning,
    /// Error - operation failed
    Error,
    /// Critical - application may be unstable
    Critical,
}

impl ErrorSeverity {
    /// Log level an error of this severity is reported at
    pub fn log_level(self) -> log::Level {
        match self {
            ErrorSeverity::Info => log::Level::Info,
            ErrorSeverity::Warning => log::Level::Warn,
            ErrorSeverity::Error | ErrorSeverity::Critical => log::Level::Error,
        }
    }
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "info"),
            ErrorSeverity::Warning => write!(f, "warning"),
            ErrorSeverity::Error => write!(f, "error"),
            ErrorSeverity::Critical => write!(f, "critical"),
        }
    }
}

/// Main error type for budgetweb-core
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("{resource} not found: {id}")]
    NotFound { resource: String, id: String },

    #[error("Not authorized to access this {resource}")]
    Forbidden { resource: String, id: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Duplicate entry: {entry}")]
    DuplicateEntry { entry: String },

    #[error("Store error: {message}")]
    StoreError { message: String },

    #[error("Monthly aggregation failed for: {}", months.join(", "))]
    AggregationFailed { months: Vec<String> },

    #[error("IO error: {message}")]
    IoError { message: String },

    #[error("Serialization error: {message}")]
    SerializationError { message: String },
}

impl CoreError {
    pub fn not_found(resource: &str, id: &str) -> Self {
        CoreError::NotFound {
            resource: resource.to_string(),
            id: id.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        CoreError::ValidationError {
            message: message.into(),
        }
    }

    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::NotFound { .. } => ErrorCode::NotFound,
            CoreError::Forbidden { .. } => ErrorCode::Forbidden,
            CoreError::ValidationError { .. } => ErrorCode::ValidationError,
            CoreError::DuplicateEntry { .. } => ErrorCode::DuplicateEntry,
            CoreError::StoreError { .. } => ErrorCode::StoreError,
            CoreError::AggregationFailed { .. } => ErrorCode::AggregationFailed,
            CoreError::IoError { .. } => ErrorCode::IoError,
            CoreError::SerializationError { .. } => ErrorCode::SerializationError,
        }
    }

    /// Get the severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CoreError::NotFound { .. } => ErrorSeverity::Info,
            CoreError::Forbidden { .. } => ErrorSeverity::Warning,
            CoreError::ValidationError { .. } => ErrorSeverity::Warning,
            CoreError::DuplicateEntry { .. } => ErrorSeverity::Warning,
            CoreError::StoreError { .. } => ErrorSeverity::Critical,
            CoreError::AggregationFailed { .. } => ErrorSeverity::Error,
            CoreError::IoError { .. } => ErrorSeverity::Error,
            CoreError::SerializationError { .. } => ErrorSeverity::Error,
        }
    }

    /// Convert to detailed error info
    pub fn to_details(&self) -> ErrorDetails {
        let mut details = ErrorDetails::new(self.code(), self.to_string());

        match self {
            CoreError::NotFound { resource, id } => {
                details = details
                    .with_detail(serde_json::json!({ "resource": resource, "id": id }))
                    .with_suggestion(format!("Check that the {} id is correct.", resource));
            }
            CoreError::ValidationError { message } => {
                details = details
                    .with_detail(serde_json::json!({ "validation_message": message }))
                    .with_suggestion("Review the validation message for specific requirements.".to_string());
            }
            CoreError::DuplicateEntry { .. } => {
                details = details.with_suggestion(
                    "Update the existing record instead of creating a new one.".to_string(),
                );
            }
            CoreError::AggregationFailed { months } => {
                details = details
                    .with_detail(serde_json::json!({ "months": months }))
                    .with_suggestion("Retry with POST /api/v1/finance/monthly/rebuild.".to_string());
            }
            _ => {}
        }

        details
    }
}

/// Result type with CoreError
pub type CoreResult<T> = Result<T, CoreError>;

impl From<io::Error> for CoreError {
    fn from(error: io::Error) -> Self {
        CoreError::IoError {
            message: error.to_string(),
        }
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(error: serde_json::Error) -> Self {
        CoreError::SerializationError {
            message: error.to_string(),
        }
    }
}

/// Error context for reporting
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// User ID (if authenticated)
    pub user_id: Option<String>,
    /// Operation being performed
    pub operation: String,
    /// Additional context data
    pub data: serde_json::Value,
}

impl ErrorContext {
    /// Create a new error context
    pub fn new(operation: &str) -> Self {
        Self {
            user_id: None,
            operation: operation.to_string(),
            data: serde_json::json!({}),
        }
    }

    /// Add user ID
    pub fn with_user_id(mut self, user_id: &str) -> Self {
        self.user_id = Some(user_id.to_string());
        self
    }

    /// Add context data
    pub fn with_data(mut self, key: &str, value: serde_json::Value) -> Self {
        self.data[key] = value;
        self
    }
}

/// Error logger trait
pub trait ErrorLogger: Send + Sync {
    /// Log an error
    fn log_error(&self, error: &CoreError, context: &ErrorContext);
    /// Log a warning
    fn log_warning(&self, message: &str, context: &ErrorContext);
}

/// Default error logger using log crate
#[derive(Default)]
pub struct DefaultErrorLogger;

impl ErrorLogger for DefaultErrorLogger {
    fn log_error(&self, error: &CoreError, context: &ErrorContext) {
        let severity = error.severity();
        log::log!(
            target: "budgetweb::error",
            severity.log_level(),
            "{} [{}] {} - Operation: {} - User: {:?} - Data: {}",
            severity.to_string().to_uppercase(),
            error.code(),
            error.to_details(),
            context.operation,
            context.user_id,
            context.data
        );
    }

    fn log_warning(&self, message: &str, context: &ErrorContext) {
        log::warn!(
            target: "budgetweb::error",
            "WARNING: {} - Operation: {} - User: {:?} - Data: {}",
            message,
            context.operation,
            context.user_id,
            context.data
        );
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::NotFound.to_string(), "NOT_FOUND");
        assert_eq!(ErrorCode::DuplicateEntry.to_string(), "DUPLICATE_ENTRY");
        assert_eq!(ErrorCode::AggregationFailed.to_string(), "AGGREGATION_FAILED");
    }

    #[test]
    fn test_core_error_code_and_severity() {
        let error = CoreError::not_found("Transaction", "abc");
        assert_eq!(error.code(), ErrorCode::NotFound);
        assert_eq!(error.severity(), ErrorSeverity::Info);

        let error = CoreError::StoreError {
            message: "disk full".to_string(),
        };
        assert_eq!(error.severity(), ErrorSeverity::Critical);
    }

    #[test]
    fn test_severity_log_level() {
        assert_eq!(CoreError::not_found("Goal", "g1").severity().log_level(), log::Level::Info);
        assert_eq!(CoreError::validation("bad").severity().log_level(), log::Level::Warn);
        assert_eq!(ErrorSeverity::Critical.log_level(), log::Level::Error);
    }

    #[test]
    fn test_error_messages() {
        let error = CoreError::not_found("Budget", "b1");
        assert_eq!(error.to_string(), "Budget not found: b1");

        let error = CoreError::AggregationFailed {
            months: vec!["Jan 2024".to_string(), "Feb 2024".to_string()],
        };
        assert_eq!(error.to_string(), "Monthly aggregation failed for: Jan 2024, Feb 2024");
    }

    #[test]
    fn test_error_details_validation() {
        let details = CoreError::validation("Description is required").to_details();
        assert_eq!(details.code, ErrorCode::ValidationError);
        assert!(details.details.is_some());
        assert!(!details.suggestions.is_empty());
    }

    #[test]
    fn test_error_context() {
        let context = ErrorContext::new("recompute")
            .with_user_id("user-456")
            .with_data("month", serde_json::json!("Jan 2024"));

        assert_eq!(context.operation, "recompute");
        assert_eq!(context.user_id, Some("user-456".to_string()));
        assert_eq!(context.data["month"], "Jan 2024");
    }

    #[test]
    fn test_io_error_conversion() {
        let error: CoreError = io::Error::new(io::ErrorKind::NotFound, "gone").into();
        assert_eq!(error.code(), ErrorCode::IoError);
    }
}
