//! HTTP handlers for polystep-service.

pub mod ai;
pub mod users;
pub mod vocabulary;

use axum::{http::StatusCode, response::IntoResponse, Json};

use crate::dtos::HealthResponse;

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        message: "Backend is running".to_string(),
    })
}

pub async fn metrics() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        crate::services::metrics::get_metrics(),
    )
}
