//! Error types for budgetweb-api

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use budgetweb_core::{CoreError, ErrorCode};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{message}")]
    NotFound { message: String },

    #[error("{message}")]
    BadRequest { message: String },

    #[error("{message}")]
    Unauthorized { message: String },

    #[error("{message}")]
    InternalError { message: String },
}

impl ApiError {
    pub fn bad_request(message: &str) -> Self {
        ApiError::BadRequest {
            message: message.to_string(),
        }
    }

    pub fn unauthorized() -> Self {
        ApiError::Unauthorized {
            message: "Not authorized to access this route".to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            ApiError::InternalError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(error: CoreError) -> Self {
        let message = error.to_string();
        match error.code() {
            ErrorCode::NotFound => ApiError::NotFound { message },
            // records owned by another user answer 401
            ErrorCode::Forbidden => ApiError::Unauthorized { message },
            ErrorCode::ValidationError | ErrorCode::DuplicateEntry => ApiError::BadRequest { message },
            _ => ApiError::InternalError { message },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::error!("Request failed: {}", self);
        } else {
            log::debug!("Request rejected ({}): {}", status, self);
        }

        let body = serde_json::json!({
            "success": false,
            "error": self.to_string(),
        });
        (status, Json(body)).into_response()
    }
}
