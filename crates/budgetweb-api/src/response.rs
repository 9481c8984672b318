//! Response envelope shared by every endpoint

use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

/// `{"success": true, "count"?: n, "data": ...}`
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            count: None,
            data,
        })
    }

    pub fn created(data: T) -> (StatusCode, Json<Self>) {
        (StatusCode::CREATED, Self::ok(data))
    }

    pub fn counted(count: usize, data: T) -> Json<Self> {
        Json(Self {
            success: true,
            count: Some(count),
            data,
        })
    }
}

impl<T: Serialize> ApiResponse<Vec<T>> {
    pub fn list(data: Vec<T>) -> Json<Self> {
        Self::counted(data.len(), data)
    }
}

/// Body of a successful delete
pub fn deleted() -> Json<ApiResponse<serde_json::Value>> {
    ApiResponse::ok(serde_json::json!({}))
}
