//! Transactions API endpoints
//!
//! Endpoints:
//! - api_transactions: GET /transactions
//! - api_transaction_detail: GET /transactions/:id
//! - api_transaction_create: POST /transactions
//! - api_transaction_update: PUT /transactions/:id
//! - api_transaction_delete: DELETE /transactions/:id

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use budgetweb_core::{NewTransaction, Pagination, Transaction, TransactionPatch, TransactionQuery};
use serde::Serialize;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::response::{deleted, ApiResponse};
use crate::AppState;

/// List response: the envelope plus paging links
#[derive(Debug, Serialize)]
pub struct TransactionListResponse {
    pub success: bool,
    pub count: usize,
    pub pagination: Pagination,
    pub total: usize,
    pub data: Vec<Transaction>,
}

/// Get one page of transactions, newest first
pub async fn api_transactions(
    state: State<AppState>,
    user: AuthUser,
    params: Query<TransactionQuery>,
) -> Result<Json<TransactionListResponse>, ApiError> {
    let page = state.finance.list_transactions(user.id(), &params).await?;
    Ok(Json(TransactionListResponse {
        success: true,
        count: page.transactions.len(),
        pagination: page.pagination,
        total: page.total,
        data: page.transactions,
    }))
}

pub async fn api_transaction_detail(
    state: State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Transaction>>, ApiError> {
    let tx = state.finance.get_transaction(user.id(), &id).await?;
    Ok(ApiResponse::ok(tx))
}

pub async fn api_transaction_create(
    state: State<AppState>,
    user: AuthUser,
    Json(input): Json<NewTransaction>,
) -> Result<(StatusCode, Json<ApiResponse<Transaction>>), ApiError> {
    let tx = state.finance.add_transaction(user.id(), input).await?;
    Ok(ApiResponse::created(tx))
}

pub async fn api_transaction_update(
    state: State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(patch): Json<TransactionPatch>,
) -> Result<Json<ApiResponse<Transaction>>, ApiError> {
    let tx = state.finance.update_transaction(user.id(), &id, patch).await?;
    Ok(ApiResponse::ok(tx))
}

pub async fn api_transaction_delete(
    state: State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    state.finance.delete_transaction(user.id(), &id).await?;
    Ok(deleted())
}
