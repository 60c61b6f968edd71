//! HTTP routes.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use rust_decimal::Decimal;
use tracing::{debug, error};

use coinledger_common::Transaction;

use crate::dto::{AmountRequest, BalanceQuery, BalanceResponse, HealthResponse, ValidationError};
use crate::errors::ApiError;
use crate::service::LedgerService;

type AppState = Arc<LedgerService>;

/// Build the application router.
pub fn router(service: AppState) -> Router {
    Router::new()
        .nest("/api/ledger", ledger_routes())
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .with_state(service)
}

fn ledger_routes() -> Router<AppState> {
    Router::new()
        .route("/deposit", post(deposit))
        .route("/withdraw", post(withdraw))
        .route("/balance", get(balance))
        .route("/transactions", get(transactions))
}

/// Validate the body of a mutation, counting rejections.
fn read_amount(
    service: &LedgerService,
    payload: Result<Json<AmountRequest>, JsonRejection>,
) -> Result<Decimal, ApiError> {
    let state = service.state();
    if !state.accepts_requests() {
        return Err(ApiError::Unavailable(state));
    }

    let result = match payload {
        Ok(Json(request)) => request.validate(),
        Err(rejection) => {
            debug!(error = %rejection, "Unreadable request body");
            Err(ValidationError::amount_required())
        }
    };
    result.map_err(|e| {
        service.metrics().invalid_amount();
        ApiError::from(e)
    })
}

async fn deposit(
    State(service): State<AppState>,
    payload: Result<Json<AmountRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let amount = read_amount(&service, payload)?;
    service.deposit(amount).await?;
    Ok(StatusCode::OK)
}

async fn withdraw(
    State(service): State<AppState>,
    payload: Result<Json<AmountRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let amount = read_amount(&service, payload)?;
    service.withdraw(amount).await?;
    Ok(StatusCode::OK)
}

async fn balance(
    State(service): State<AppState>,
    Query(query): Query<BalanceQuery>,
) -> Result<Json<BalanceResponse>, ApiError> {
    let as_of = query.cutoff()?;
    let balance = service.balance(as_of).await?;
    Ok(Json(BalanceResponse { balance, as_of }))
}

async fn transactions(
    State(service): State<AppState>,
) -> Result<Json<Vec<Transaction>>, ApiError> {
    Ok(Json(service.transactions().await?))
}

async fn health(State(service): State<AppState>) -> impl IntoResponse {
    let status = service.state();
    let transactions = match service.ledger().transaction_count().await {
        Ok(count) => Some(count),
        Err(e) => {
            error!(error = %e, "Health check could not read the ledger");
            None
        }
    };

    let code = if status.accepts_requests() && transactions.is_some() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    let body = HealthResponse {
        status,
        strategy: service.ledger().strategy(),
        transactions,
    };
    (code, Json(body))
}

async fn metrics(State(service): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        service.metrics().to_prometheus(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request};
    use axum::response::Response;
    use coinledger_common::{LedgerError, Timestamp};
    use coinledger_ledger::{InMemoryLedger, Ledger};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app() -> (Router, AppState) {
        let service = Arc::new(LedgerService::new(Arc::new(InMemoryLedger::new())));
        service.start();
        (router(service.clone()), service)
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<&str>) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if body.is_some() {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
        }
        let request = builder
            .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
            .unwrap();
        app.clone().oneshot(request).await.unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn body_json(response: Response) -> Value {
        serde_json::from_str(&body_text(response).await).unwrap()
    }

    async fn current_balance(app: &Router) -> Decimal {
        let response = send(app, Method::GET, "/api/ledger/balance", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: BalanceResponse = serde_json::from_value(body_json(response).await).unwrap();
        body.balance
    }

    #[tokio::test]
    async fn test_deposit_then_balance() {
        let (app, _) = app();

        let response = send(&app, Method::POST, "/api/ledger/deposit", Some(r#"{"amount": 150}"#)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.is_empty());

        assert_eq!(current_balance(&app).await, Decimal::from(150));
    }

    #[tokio::test]
    async fn test_withdraw_more_than_balance() {
        let (app, _) = app();
        send(&app, Method::POST, "/api/ledger/deposit", Some(r#"{"amount": 100}"#)).await;

        let response = send(&app, Method::POST, "/api/ledger/withdraw", Some(r#"{"amount": 999}"#)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(response).await, "Insufficient balance to withdraw 999");

        assert_eq!(current_balance(&app).await, Decimal::from(100));
    }

    #[tokio::test]
    async fn test_withdraw_exact_balance() {
        let (app, _) = app();
        send(&app, Method::POST, "/api/ledger/deposit", Some(r#"{"amount": "25.50"}"#)).await;

        let response = send(&app, Method::POST, "/api/ledger/withdraw", Some(r#"{"amount": 25.5}"#)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(current_balance(&app).await, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_amount_below_minimum() {
        let (app, service) = app();

        let response = send(&app, Method::POST, "/api/ledger/deposit", Some(r#"{"amount": -5}"#)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({
                "error": "Validation failed",
                "fieldErrors": [{"field": "amount", "messages": ["Amount must be >= 0.01"]}]
            })
        );
        assert_eq!(service.metrics().snapshot().rejected_invalid_amount, 1);
        assert_eq!(current_balance(&app).await, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_amount_missing_or_malformed() {
        let (app, _) = app();

        for body in [r#"{}"#, r#"{"amount": null}"#, r#"{"amount": "abc"}"#, "not json"] {
            let response = send(&app, Method::POST, "/api/ledger/withdraw", Some(body)).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body {body}");
            let json = body_json(response).await;
            assert_eq!(json["error"], "Validation failed");
            assert_eq!(json["fieldErrors"][0]["messages"][0], "Amount is required");
        }

        let response = send(&app, Method::POST, "/api/ledger/deposit", None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_transactions_newest_first() {
        let (app, _) = app();
        send(&app, Method::POST, "/api/ledger/deposit", Some(r#"{"amount": 100}"#)).await;
        send(&app, Method::POST, "/api/ledger/withdraw", Some(r#"{"amount": 30}"#)).await;

        let response = send(&app, Method::GET, "/api/ledger/transactions", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let list = body_json(response).await;
        let list = list.as_array().unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0]["type"], "WITHDRAWAL");
        assert_eq!(list[1]["type"], "DEPOSIT");
        assert!(list[0]["id"].is_string());
        assert!(list[0]["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_balance_as_of() {
        let (app, _) = app();
        send(&app, Method::POST, "/api/ledger/deposit", Some(r#"{"amount": 100}"#)).await;

        let response = send(&app, Method::GET, "/api/ledger/balance?as_of=2000-01-01", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: BalanceResponse = serde_json::from_value(body_json(response).await).unwrap();
        assert_eq!(body.balance, Decimal::from(100));
        assert!(body.as_of.is_some());

        let response = send(&app, Method::GET, "/api/ledger/balance?as_of=2999-01-01", None).await;
        let body: BalanceResponse = serde_json::from_value(body_json(response).await).unwrap();
        assert_eq!(body.balance, Decimal::ZERO);

        let response = send(&app, Method::GET, "/api/ledger/balance?as_of=yesterday", None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["fieldErrors"][0]["field"], "as_of");
    }

    #[tokio::test]
    async fn test_health_and_metrics() {
        let (app, service) = app();
        send(&app, Method::POST, "/api/ledger/deposit", Some(r#"{"amount": 10}"#)).await;

        let response = send(&app, Method::GET, "/health", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let health = body_json(response).await;
        assert_eq!(health["status"], "running");
        assert_eq!(health["strategy"], "memory");
        assert_eq!(health["transactions"], 1);

        let response = send(&app, Method::GET, "/metrics", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("coinledger_deposits_total 1"));

        service.stop();
        let response = send(&app, Method::GET, "/health", None).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let response = send(&app, Method::POST, "/api/ledger/deposit", Some(r#"{"amount": 10}"#)).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_large_amounts_keep_precision() {
        let (app, _) = app();

        let response = send(
            &app,
            Method::POST,
            "/api/ledger/deposit",
            Some(r#"{"amount": 1234567890.123456789}"#),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            current_balance(&app).await,
            Decimal::from_str_exact("1234567890.123456789").unwrap()
        );

        let response = send(&app, Method::GET, "/api/ledger/transactions", None).await;
        assert_eq!(body_json(response).await[0]["amount"], "1234567890.123456789");
    }

    #[tokio::test]
    async fn test_deposit_past_decimal_range() {
        let (app, service) = app();
        let max = format!(r#"{{"amount": "{}"}}"#, Decimal::MAX);

        let response = send(&app, Method::POST, "/api/ledger/deposit", Some(&max)).await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = send(&app, Method::POST, "/api/ledger/deposit", Some(&max)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_text(response).await.starts_with("Balance out of range"));

        assert_eq!(current_balance(&app).await, Decimal::MAX);
        let snapshot = service.metrics().snapshot();
        assert_eq!(snapshot.rejected_other, 1);
        assert_eq!(snapshot.rejected_invalid_amount, 0);
    }

    /// Ledger whose storage is unreachable.
    struct UnreachableLedger;

    #[async_trait::async_trait]
    impl Ledger for UnreachableLedger {
        async fn deposit(&self, _amount: Decimal) -> coinledger_common::Result<Transaction> {
            Err(LedgerError::Storage("connection refused".into()))
        }

        async fn withdraw(&self, _amount: Decimal) -> coinledger_common::Result<Transaction> {
            Err(LedgerError::Storage("connection refused".into()))
        }

        async fn record(&self, _transaction: Transaction) -> coinledger_common::Result<Transaction> {
            Err(LedgerError::Storage("connection refused".into()))
        }

        async fn balance(&self, _as_of: Option<Timestamp>) -> coinledger_common::Result<Decimal> {
            Err(LedgerError::Storage("connection refused".into()))
        }

        async fn transactions(&self) -> coinledger_common::Result<Vec<Transaction>> {
            Err(LedgerError::Storage("connection refused".into()))
        }

        fn strategy(&self) -> &'static str {
            "postgres"
        }
    }

    #[tokio::test]
    async fn test_storage_failure_surfaces() {
        let service = Arc::new(LedgerService::new(Arc::new(UnreachableLedger)));
        service.start();
        let app = router(service.clone());

        let response = send(&app, Method::GET, "/health", None).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let health = body_json(response).await;
        assert_eq!(health["status"], "running");
        assert!(health.get("transactions").is_none());

        let response = send(&app, Method::POST, "/api/ledger/deposit", Some(r#"{"amount": 10}"#)).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_text(response).await, "Storage error: connection refused");
        assert_eq!(service.metrics().snapshot().storage_errors, 1);
    }
}
