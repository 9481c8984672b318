//! Monthly data API endpoints
//!
//! Endpoints:
//! - api_monthly: GET /monthly?year=2024, sorted by year then month
//! - api_monthly_upsert: POST /monthly, manual figures for one month
//! - api_monthly_rebuild: POST /monthly/rebuild, recompute every month

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use budgetweb_core::{MonthlyAggregate, MonthlyAggregateInput, RecomputeReport};
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct MonthlyQuery {
    pub year: Option<i32>,
}

pub async fn api_monthly(
    state: State<AppState>,
    user: AuthUser,
    params: Query<MonthlyQuery>,
) -> Result<Json<ApiResponse<Vec<MonthlyAggregate>>>, ApiError> {
    let months = state.finance.monthly(user.id(), params.year).await?;
    Ok(ApiResponse::list(months))
}

/// Create or overwrite a month; `month: "Jan 2024"` selects it by label
pub async fn api_monthly_upsert(
    state: State<AppState>,
    user: AuthUser,
    Json(input): Json<MonthlyAggregateInput>,
) -> Result<(StatusCode, Json<ApiResponse<MonthlyAggregate>>), ApiError> {
    let aggregate = state.finance.upsert_monthly(user.id(), input).await?;
    Ok(ApiResponse::created(aggregate))
}

pub async fn api_monthly_rebuild(
    state: State<AppState>,
    user: AuthUser,
) -> Result<Json<ApiResponse<RecomputeReport>>, ApiError> {
    let report = state.finance.rebuild_monthly(user.id()).await?;
    Ok(ApiResponse::counted(report.updated.len(), report))
}
