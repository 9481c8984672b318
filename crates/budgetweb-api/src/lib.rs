//! JSON HTTP API server
//!
//! Routes are organized into modules under `/api/v1/finance`:
//! - routes::transactions: Transaction list and CRUD
//! - routes::budgets: Budget CRUD
//! - routes::goals: Goal CRUD
//! - routes::monthly: Monthly aggregates
//! - routes::stats: Financial overview
//! - routes::bank: Accounts and statement import

pub mod auth;
pub mod error;
pub mod response;
pub mod routes;

use axum::{
    routing::{get, post, put},
    Router,
};
use budgetweb_config::Config;
use budgetweb_core::Finance;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

pub use auth::AuthUser;
pub use error::ApiError;
pub use response::ApiResponse;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub finance: Arc<Finance>,
    pub config: Config,
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    use routes::bank::{api_account_create, api_account_delete, api_account_update, api_accounts, api_bank_import};
    use routes::budgets::{api_budget_create, api_budget_delete, api_budget_update, api_budgets};
    use routes::goals::{api_goal_create, api_goal_delete, api_goal_update, api_goals};
    use routes::monthly::{api_monthly, api_monthly_rebuild, api_monthly_upsert};
    use routes::stats::api_stats;
    use routes::transactions::{
        api_transaction_create, api_transaction_delete, api_transaction_detail, api_transaction_update,
        api_transactions,
    };

    let finance = Router::new()
        .route("/transactions", get(api_transactions).post(api_transaction_create))
        .route(
            "/transactions/:id",
            get(api_transaction_detail)
                .put(api_transaction_update)
                .delete(api_transaction_delete),
        )
        .route("/budgets", get(api_budgets).post(api_budget_create))
        .route("/budgets/:id", put(api_budget_update).delete(api_budget_delete))
        .route("/goals", get(api_goals).post(api_goal_create))
        .route("/goals/:id", put(api_goal_update).delete(api_goal_delete))
        .route("/monthly", get(api_monthly).post(api_monthly_upsert))
        .route("/monthly/rebuild", post(api_monthly_rebuild))
        .route("/stats", get(api_stats))
        .route("/bank/accounts", get(api_accounts).post(api_account_create))
        .route("/bank/accounts/:id", put(api_account_update).delete(api_account_delete))
        .route("/bank/import", post(api_bank_import));

    Router::new()
        .route("/api/health", get(health_check))
        .nest("/api/v1/finance", finance)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Start the HTTP server and serve until Ctrl-C
pub async fn start_server(config: Config, finance: Arc<Finance>) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState { finance, config };

    let router = create_router(state);

    let listener = TcpListener::bind(&addr).await?;
    log::info!("Starting budgetweb server on http://{}", addr);
    log::info!("Available routes:");
    log::info!("  - /api/health (Liveness)");
    log::info!("  - /api/v1/finance/transactions (Transactions)");
    log::info!("  - /api/v1/finance/budgets, /goals (Planning)");
    log::info!("  - /api/v1/finance/monthly, /stats (Summaries)");
    log::info!("  - /api/v1/finance/bank/accounts, /bank/import (Bank data)");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    log::info!("Server stopped gracefully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use budgetweb_core::MemoryStore;
    use budgetweb_parser::DefaultStatementParser;
    use rust_decimal::Decimal;
    use serde_json::{json, Value};
    use std::str::FromStr;
    use tower::ServiceExt;

    const USER: &str = "user-1";

    fn app() -> Router {
        let config = Config::default();
        let store = Arc::new(MemoryStore::new());
        let finance = Finance::new(config.clone(), Arc::new(DefaultStatementParser), store.into_stores());
        create_router(AppState {
            finance: Arc::new(finance),
            config,
        })
    }

    async fn send(app: &Router, method: &str, uri: &str, user: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            builder = builder.header("x-user-id", user);
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    fn decimal(value: &Value) -> Decimal {
        match value {
            Value::String(s) => Decimal::from_str(s).unwrap(),
            other => Decimal::from_str(&other.to_string()).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_health_check() {
        let response = app()
            .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_user_header_is_unauthorized() {
        let app = app();
        let (status, body) = send(&app, "GET", "/api/v1/finance/transactions", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], false);

        let (status, _) = send(&app, "GET", "/api/v1/finance/stats", Some("  "), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_transaction_lifecycle() {
        let app = app();
        let (status, created) = send(
            &app,
            "POST",
            "/api/v1/finance/transactions",
            Some(USER),
            Some(json!({"date": "2024-01-15", "description": "Grocery store", "amount": "-42.10"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["data"]["category"], "Food");
        let id = created["data"]["id"].as_str().unwrap().to_string();

        let (status, list) = send(&app, "GET", "/api/v1/finance/transactions?limit=10", Some(USER), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list["count"], 1);
        assert_eq!(list["total"], 1);

        let (_, monthly) = send(&app, "GET", "/api/v1/finance/monthly?year=2024", Some(USER), None).await;
        assert_eq!(monthly["count"], 1);
        assert_eq!(monthly["data"][0]["month"], "Jan 2024");
        assert_eq!(decimal(&monthly["data"][0]["expenses"]), Decimal::from_str("42.10").unwrap());

        let uri = format!("/api/v1/finance/transactions/{}", id);
        let (status, _) = send(&app, "PUT", &uri, Some("intruder"), Some(json!({"amount": "1"}))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, updated) = send(&app, "PUT", &uri, Some(USER), Some(json!({"amount": "-50"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(decimal(&updated["data"]["amount"]), Decimal::from(-50));

        let (status, _) = send(&app, "DELETE", &uri, Some(USER), None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(&app, "DELETE", &uri, Some(USER), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_invalid_transaction_is_bad_request() {
        let app = app();
        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/finance/transactions",
            Some(USER),
            Some(json!({"description": "", "amount": "1"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_duplicate_budget_is_bad_request() {
        let app = app();
        let budget = json!({"category": "Food", "amount": "300", "period": "monthly"});
        let (status, _) = send(&app, "POST", "/api/v1/finance/budgets", Some(USER), Some(budget.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, body) = send(&app, "POST", "/api/v1/finance/budgets", Some(USER), Some(budget)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("Duplicate"));

        let (_, list) = send(&app, "GET", "/api/v1/finance/budgets", Some(USER), None).await;
        assert_eq!(list["count"], 1);
    }

    #[tokio::test]
    async fn test_bank_import() {
        let app = app();
        let (status, body) = send(&app, "POST", "/api/v1/finance/bank/import", Some(USER), Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Please provide bank statement data");

        let data = "Date,Description,Amount\n05/01/2024,Salary,\"$1,500.00\"\n06/01/2024,Uber Eats order,-25.00\nbad line";
        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/finance/bank/import",
            Some(USER),
            Some(json!({"data": data, "starting_balance": "100"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["count"], 2);
        assert_eq!(body["data"]["transactions"][1]["category"], "Food");
        assert_eq!(body["data"]["skipped"].as_array().unwrap().len(), 1);
        assert_eq!(
            decimal(&body["data"]["summary"]["ending_balance"]),
            Decimal::from_str("1575.00").unwrap()
        );

        let (_, stats) = send(&app, "GET", "/api/v1/finance/stats", Some(USER), None).await;
        assert_eq!(decimal(&stats["data"]["total_income"]), Decimal::from(1500));
    }

    #[tokio::test]
    async fn test_manual_monthly_entry() {
        let app = app();
        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/finance/monthly",
            Some(USER),
            Some(json!({"month": "Mar 2024", "income": "4000", "expenses": "3000", "net_worth": "12000"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["year"], 2024);
        assert_eq!(body["data"]["month_num"], 2);
        assert_eq!(body["data"]["is_auto_generated"], false);

        let (_, stats) = send(&app, "GET", "/api/v1/finance/stats", Some(USER), None).await;
        assert_eq!(decimal(&stats["data"]["net_worth"]), Decimal::from(12000));
        assert_eq!(decimal(&stats["data"]["savings_rate"]), Decimal::from(25));

        let (status, _) = send(
            &app,
            "POST",
            "/api/v1/finance/monthly",
            Some(USER),
            Some(json!({"income": "1"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_accounts_and_goals() {
        let app = app();
        let (status, account) = send(
            &app,
            "POST",
            "/api/v1/finance/bank/accounts",
            Some(USER),
            Some(json!({"name": "Everyday", "account_type": "checking", "institution": "First Bank"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(account["data"]["is_manual"], true);
        assert_eq!(account["data"]["currency"], "USD");

        let uri = format!("/api/v1/finance/bank/accounts/{}", account["data"]["id"].as_str().unwrap());
        let (status, updated) = send(&app, "PUT", &uri, Some(USER), Some(json!({"name": "Bills"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["data"]["name"], "Bills");

        let (status, goal) = send(
            &app,
            "POST",
            "/api/v1/finance/goals",
            Some(USER),
            Some(json!({"name": "Holiday", "target_amount": "2000", "target_date": "2025-07-01", "category": "vacation"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(goal["data"]["status"], "in-progress");
        assert_eq!(goal["data"]["icon"], "fa-home");

        let (_, goals) = send(&app, "GET", "/api/v1/finance/goals", Some("someone-else"), None).await;
        assert_eq!(goals["count"], 0);
    }

    #[tokio::test]
    async fn test_rebuild_reports_months() {
        let app = app();
        for date in ["2024-01-03", "2024-02-03"] {
            send(
                &app,
                "POST",
                "/api/v1/finance/transactions",
                Some(USER),
                Some(json!({"date": date, "description": "Payroll", "amount": "100"})),
            )
            .await;
        }

        let (status, body) = send(&app, "POST", "/api/v1/finance/monthly/rebuild", Some(USER), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 2);
    }
}
