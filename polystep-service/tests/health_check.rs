mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use common::{test_config, TestApp};
use polystep_service::services::providers::mock::MockProvider;
use polystep_service::startup::Application;
use serde_json::json;
use std::sync::Arc;
use tower::util::ServiceExt;

#[tokio::test]
async fn health_check_works() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/api/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok", "message": "Backend is running"}));
    assert_eq!(app.provider.call_count(), 0);
}

#[tokio::test]
async fn responses_carry_request_id_and_security_headers() {
    let app = TestApp::new().await;

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .header("x-request-id", "req-123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.headers()["x-request-id"], "req-123");
    assert_eq!(response.headers()["x-content-type-options"], "nosniff");
    assert_eq!(response.headers()["x-frame-options"], "DENY");
}

#[tokio::test]
async fn cors_allows_any_origin() {
    let app = TestApp::new().await;

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .header("origin", "http://localhost:5173")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.headers()["access-control-allow-origin"], "*");
}

#[tokio::test]
async fn metrics_endpoint_returns_text() {
    let app = TestApp::new().await;

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"],
        "text/plain; charset=utf-8"
    );
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let app = TestApp::new().await;
    let (status, _) = app.get("/api/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn application_serves_over_tcp() {
    let provider = Arc::new(MockProvider::with_text("hi"));
    let app = Application::build_with_provider(test_config(), provider)
        .await
        .expect("Failed to build application");
    let port = app.port();
    assert_ne!(port, 0);

    tokio::spawn(async move {
        app.run_until_stopped().await.ok();
    });

    let response = reqwest::Client::new()
        .get(format!("http://127.0.0.1:{}/api/health", port))
        .send()
        .await
        .expect("Failed to execute request");

    assert!(response.status().is_success());
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["status"], "ok");
}
