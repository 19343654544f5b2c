//! Webhook end-to-end tests
//!
//! Drives the full router with an in-memory terminal behind it.

mod common;

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use common::{mock_gateway, ACCOUNT_ID};
use mtgate::application::handlers::webhook_handler::router;
use mtgate::domain::entities::order::OrderSide;
use mtgate::domain::entities::position::PositionHandle;
use mtgate::infrastructure::mock_terminal::{MockTradingTerminal, TerminalCall};
use serde_json::Value;
use tower::ServiceExt;

async fn post(app: axum::Router, uri: &str, body: impl Into<Body>) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(body.into())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

fn orders(calls: &[TerminalCall]) -> Vec<(String, OrderSide, String)> {
    calls
        .iter()
        .filter_map(|call| match call {
            TerminalCall::SubmitOrder { order, .. } => Some((
                order.symbol.clone(),
                order.side,
                order.volume.to_string(),
            )),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn test_unknown_account_is_forbidden_without_remote_calls() {
    let terminal = Arc::new(MockTradingTerminal::new());
    let app = router(mock_gateway(terminal.clone()), 64 * 1024);

    let (status, body) = post(
        app,
        "/99999",
        r#"[{"symbol":"EURUSD","lot":"0.1","side":"buy"}]"#,
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Invalid account");
    assert!(terminal.calls().await.is_empty());
}

#[tokio::test]
async fn test_batch_is_processed_in_order() {
    let terminal = Arc::new(MockTradingTerminal::new());
    let app = router(mock_gateway(terminal.clone()), 64 * 1024);

    let (status, body) = post(
        app,
        &format!("/{}", ACCOUNT_ID),
        r#"[
            {"symbol":"EURUSD","lot":"0.1","side":"buy"},
            {"symbol":"GBPUSD","lot":0.25,"side":"sell"},
            {"symbol":"USDJPY","lot":"1.015","side":"SHORT"}
        ]"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "orders processed");
    assert_eq!(
        orders(&terminal.calls().await),
        vec![
            ("EURUSD".to_string(), OrderSide::Buy, "0.10".to_string()),
            ("GBPUSD".to_string(), OrderSide::Sell, "0.25".to_string()),
            ("USDJPY".to_string(), OrderSide::Sell, "1.02".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_malformed_entries_are_skipped() {
    let terminal = Arc::new(MockTradingTerminal::new());
    let app = router(mock_gateway(terminal.clone()), 64 * 1024);

    let (status, _) = post(
        app,
        &format!("/{}", ACCOUNT_ID),
        r#"[
            {"lot":"0.1","side":"buy"},
            {"symbol":"EURUSD","lot":"lots","side":"buy"},
            {"symbol":"XAUUSD","lot":"0.5","side":"buy"}
        ]"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        orders(&terminal.calls().await),
        vec![("XAUUSD".to_string(), OrderSide::Buy, "0.50".to_string())]
    );
}

#[tokio::test]
async fn test_close_all_closes_only_matching_symbol() {
    let terminal = Arc::new(MockTradingTerminal::new().with_positions(vec![
        PositionHandle::new(101, "XAUUSD"),
        PositionHandle::new(102, "EURUSD"),
        PositionHandle::new(103, "XAUUSD"),
    ]));
    let app = router(mock_gateway(terminal.clone()), 64 * 1024);

    let (status, _) = post(
        app,
        &format!("/{}", ACCOUNT_ID),
        r#"[{"symbol":"XAUUSD","lot":"0.1","side":"sell","exit":"0"}]"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let calls = terminal.calls().await;
    assert!(orders(&calls).is_empty());
    assert_eq!(
        terminal.open_positions().await,
        vec![PositionHandle::new(102, "EURUSD")]
    );
}

#[tokio::test]
async fn test_undecodable_body_is_server_error() {
    let terminal = Arc::new(MockTradingTerminal::new());
    let app = router(mock_gateway(terminal.clone()), 64 * 1024);

    let (status, body) = post(app, &format!("/{}", ACCOUNT_ID), "not json").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].is_string());
    assert!(orders(&terminal.calls().await).is_empty());
}

#[tokio::test]
async fn test_rejected_login_is_server_error() {
    let terminal = Arc::new(MockTradingTerminal::new().rejecting_connect("Invalid account"));
    let app = router(mock_gateway(terminal.clone()), 64 * 1024);

    let (status, _) = post(
        app,
        &format!("/{}", ACCOUNT_ID),
        r#"[{"symbol":"EURUSD","lot":"0.1","side":"buy"}]"#,
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(orders(&terminal.calls().await).is_empty());
}

#[tokio::test]
async fn test_session_is_reused_across_requests() {
    let terminal = Arc::new(MockTradingTerminal::new());
    let gateway = mock_gateway(terminal.clone());
    let body = r#"[{"symbol":"EURUSD","lot":"0.1","side":"buy"}]"#;

    for _ in 0..3 {
        let (status, _) = post(
            router(gateway.clone(), 64 * 1024),
            &format!("/{}", ACCOUNT_ID),
            body,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    assert_eq!(terminal.connect_count().await, 1);
    assert_eq!(orders(&terminal.calls().await).len(), 3);
}

#[tokio::test]
async fn test_non_numeric_account_is_not_found() {
    let terminal = Arc::new(MockTradingTerminal::new());
    let app = router(mock_gateway(terminal.clone()), 64 * 1024);

    let (status, _) = post(app, "/abc", "[]").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(terminal.calls().await.is_empty());
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let terminal = Arc::new(MockTradingTerminal::new());
    let app = router(mock_gateway(terminal.clone()), 1024);

    let entry = r#"{"symbol":"EURUSD","lot":"0.1","side":"buy"}"#;
    let body = format!("[{}]", vec![entry; 100].join(","));
    let (status, _) = post(app, &format!("/{}", ACCOUNT_ID), body).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(orders(&terminal.calls().await).is_empty());
}

#[tokio::test]
async fn test_health_endpoint() {
    let terminal = Arc::new(MockTradingTerminal::new());
    let app = router(mock_gateway(terminal), 64 * 1024);

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "running");
    assert_eq!(body["accounts"], 1);
    assert_eq!(body["cached_sessions"], 0);
}
