#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use polystep_service::config::{DatabaseConfig, GoogleConfig, ModelConfig, PolystepConfig};
use polystep_service::services::providers::mock::MockProvider;
use polystep_service::services::{AiGateway, Database};
use polystep_service::startup::build_router;
use polystep_service::AppState;
use serde_json::Value;
use std::sync::Arc;
use tower::util::ServiceExt;

pub const TEXT_MODEL: &str = "test-text-model";
pub const IMAGE_MODEL: &str = "test-image-model";

pub fn test_config() -> PolystepConfig {
    PolystepConfig {
        common: service_core::config::Config {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        service_name: "polystep-service-test".to_string(),
        log_level: "debug".to_string(),
        otlp_endpoint: None,
        database: DatabaseConfig {
            // Each in-memory connection is its own database.
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        },
        models: ModelConfig {
            text_model: TEXT_MODEL.to_string(),
            image_model: IMAGE_MODEL.to_string(),
        },
        google: GoogleConfig {
            api_key: None,
            api_base_url: "http://127.0.0.1:1".to_string(),
            timeout_seconds: 5,
        },
    }
}

/// Router over a fresh in-memory database and a mock provider.
pub struct TestApp {
    pub router: Router,
    pub provider: Arc<MockProvider>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_provider(MockProvider::with_text("mock response")).await
    }

    pub async fn with_provider(provider: MockProvider) -> Self {
        let config = test_config();
        let db = Database::connect(&config.database.url, config.database.max_connections)
            .await
            .expect("Failed to connect to test database");
        db.run_migrations()
            .await
            .expect("Failed to run migrations");

        let provider = Arc::new(provider);
        let gateway = AiGateway::new(provider.clone(), config.models.clone());
        let router = build_router(AppState::new(config, db, gateway));

        Self { router, provider }
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.post_raw(uri, &body.to_string()).await
    }

    pub async fn post_raw(&self, uri: &str, body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }
}
