//! Budgets API endpoints

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use budgetweb_core::{Budget, BudgetPatch, NewBudget};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::response::{deleted, ApiResponse};
use crate::AppState;

pub async fn api_budgets(state: State<AppState>, user: AuthUser) -> Result<Json<ApiResponse<Vec<Budget>>>, ApiError> {
    let budgets = state.finance.budgets(user.id()).await?;
    Ok(ApiResponse::list(budgets))
}

/// Create a budget; a second budget for the same category and period is a 400
pub async fn api_budget_create(
    state: State<AppState>,
    user: AuthUser,
    Json(input): Json<NewBudget>,
) -> Result<(StatusCode, Json<ApiResponse<Budget>>), ApiError> {
    let budget = state.finance.add_budget(user.id(), input).await?;
    Ok(ApiResponse::created(budget))
}

pub async fn api_budget_update(
    state: State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(patch): Json<BudgetPatch>,
) -> Result<Json<ApiResponse<Budget>>, ApiError> {
    let budget = state.finance.update_budget(user.id(), &id, patch).await?;
    Ok(ApiResponse::ok(budget))
}

pub async fn api_budget_delete(
    state: State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    state.finance.delete_budget(user.id(), &id).await?;
    Ok(deleted())
}
