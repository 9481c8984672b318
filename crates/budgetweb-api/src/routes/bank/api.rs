//! Bank API endpoints
//!
//! Endpoints:
//! - api_accounts: GET /bank/accounts
//! - api_account_create: POST /bank/accounts (always a manual account)
//! - api_account_update: PUT /bank/accounts/:id
//! - api_account_delete: DELETE /bank/accounts/:id
//! - api_bank_import: POST /bank/import

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use budgetweb_core::{Account, AccountPatch, NewAccount, PreparedImport};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::response::{deleted, ApiResponse};
use crate::AppState;

/// Body of a statement import
#[derive(Debug, Default, Deserialize)]
pub struct ImportRequest {
    /// Pasted statement text
    #[serde(default)]
    pub data: Option<String>,
    /// Balance before the first line; the configured default when absent
    #[serde(default)]
    pub starting_balance: Option<Decimal>,
}

pub async fn api_accounts(state: State<AppState>, user: AuthUser) -> Result<Json<ApiResponse<Vec<Account>>>, ApiError> {
    let accounts = state.finance.accounts(user.id()).await?;
    Ok(ApiResponse::list(accounts))
}

pub async fn api_account_create(
    state: State<AppState>,
    user: AuthUser,
    Json(input): Json<NewAccount>,
) -> Result<(StatusCode, Json<ApiResponse<Account>>), ApiError> {
    let account = state.finance.add_account(user.id(), input).await?;
    Ok(ApiResponse::created(account))
}

pub async fn api_account_update(
    state: State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(patch): Json<AccountPatch>,
) -> Result<Json<ApiResponse<Account>>, ApiError> {
    let account = state.finance.update_account(user.id(), &id, patch).await?;
    Ok(ApiResponse::ok(account))
}

pub async fn api_account_delete(
    state: State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    state.finance.delete_account(user.id(), &id).await?;
    Ok(deleted())
}

/// Parse a pasted statement and store its transactions
pub async fn api_bank_import(
    state: State<AppState>,
    user: AuthUser,
    Json(request): Json<ImportRequest>,
) -> Result<(StatusCode, Json<ApiResponse<PreparedImport>>), ApiError> {
    let data = request
        .data
        .filter(|d| !d.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("Please provide bank statement data"))?;

    let outcome = state
        .finance
        .import_statement(user.id(), &data, request.starting_balance)
        .await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::counted(outcome.transactions.len(), outcome),
    ))
}
