//! Goals API endpoints

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use budgetweb_core::{Goal, GoalPatch, NewGoal};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::response::{deleted, ApiResponse};
use crate::AppState;

pub async fn api_goals(state: State<AppState>, user: AuthUser) -> Result<Json<ApiResponse<Vec<Goal>>>, ApiError> {
    let goals = state.finance.goals(user.id()).await?;
    Ok(ApiResponse::list(goals))
}

pub async fn api_goal_create(
    state: State<AppState>,
    user: AuthUser,
    Json(input): Json<NewGoal>,
) -> Result<(StatusCode, Json<ApiResponse<Goal>>), ApiError> {
    let goal = state.finance.add_goal(user.id(), input).await?;
    Ok(ApiResponse::created(goal))
}

pub async fn api_goal_update(
    state: State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(patch): Json<GoalPatch>,
) -> Result<Json<ApiResponse<Goal>>, ApiError> {
    let goal = state.finance.update_goal(user.id(), &id, patch).await?;
    Ok(ApiResponse::ok(goal))
}

pub async fn api_goal_delete(
    state: State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    state.finance.delete_goal(user.id(), &id).await?;
    Ok(deleted())
}
