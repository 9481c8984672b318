//! Stats API endpoint

use axum::extract::State;
use axum::Json;
use budgetweb_core::FinancialStats;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::AppState;

/// All-time income and expenses, spending by category, latest savings rate
/// and net worth, and the number of goals still in progress
pub async fn api_stats(state: State<AppState>, user: AuthUser) -> Result<Json<ApiResponse<FinancialStats>>, ApiError> {
    let stats = state.finance.stats(user.id()).await?;
    Ok(ApiResponse::ok(stats))
}
