//! Prometheus metrics for polystep-service.
//!
//! HTTP request metrics are recorded by `service_core`'s middleware through the
//! `metrics` facade; provider and database metrics live in a `prometheus`
//! registry. `/metrics` renders both.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};
use service_core::error::AppError;
use std::sync::OnceLock;
use std::time::Duration;

pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

// AI-specific metrics
pub static GENAI_REQUESTS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();
pub static GENAI_PROVIDER_LATENCY_SECONDS: OnceLock<HistogramVec> = OnceLock::new();

// Database metrics
pub static DB_QUERY_DURATION_SECONDS: OnceLock<HistogramVec> = OnceLock::new();

fn metric_error(name: &str, err: impl std::fmt::Display) -> AppError {
    AppError::InternalError(anyhow::anyhow!("Failed to set up metric {}: {}", name, err))
}

/// Initialize all metrics. Call once from the binary before serving.
///
/// Not called from `Application::build`, so tests can build many applications
/// in one process; until this runs every `record_*` helper is a no-op.
pub fn init_metrics() -> Result<(), AppError> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| metric_error("recorder", e))?;

    let registry = Registry::new();

    // Capability: generate, translate, grammar_research, visualize, reading_passage
    let genai_requests = IntCounterVec::new(
        Opts::new("genai_requests_total", "Total GenAI requests"),
        &["capability", "model", "outcome"],
    )
    .map_err(|e| metric_error("genai_requests_total", e))?;

    let provider_latency = HistogramVec::new(
        HistogramOpts::new(
            "genai_provider_latency_seconds",
            "AI provider API latency in seconds",
        )
        .buckets(vec![0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0, 120.0]),
        &["capability", "model"],
    )
    .map_err(|e| metric_error("genai_provider_latency_seconds", e))?;

    let db_duration = HistogramVec::new(
        HistogramOpts::new(
            "db_query_duration_seconds",
            "Database query duration in seconds",
        )
        .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]),
        &["operation"],
    )
    .map_err(|e| metric_error("db_query_duration_seconds", e))?;

    registry
        .register(Box::new(genai_requests.clone()))
        .map_err(|e| metric_error("genai_requests_total", e))?;
    registry
        .register(Box::new(provider_latency.clone()))
        .map_err(|e| metric_error("genai_provider_latency_seconds", e))?;
    registry
        .register(Box::new(db_duration.clone()))
        .map_err(|e| metric_error("db_query_duration_seconds", e))?;

    let _ = METRICS_HANDLE.set(handle);
    let _ = REGISTRY.set(registry);
    let _ = GENAI_REQUESTS_TOTAL.set(genai_requests);
    let _ = GENAI_PROVIDER_LATENCY_SECONDS.set(provider_latency);
    let _ = DB_QUERY_DURATION_SECONDS.set(db_duration);

    Ok(())
}

pub fn get_metrics() -> String {
    let mut output = METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized\n".to_string());

    if let Some(registry) = REGISTRY.get() {
        let encoder = TextEncoder::new();
        let metric_families = registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer).ok();
        if let Ok(custom_metrics) = String::from_utf8(buffer) {
            output.push_str(&custom_metrics);
        }
    }

    output
}

/// Record one provider round-trip.
pub fn record_provider_call(capability: &str, model: &str, outcome: &str, elapsed: Duration) {
    if let Some(counter) = GENAI_REQUESTS_TOTAL.get() {
        counter.with_label_values(&[capability, model, outcome]).inc();
    }
    if let Some(histogram) = GENAI_PROVIDER_LATENCY_SECONDS.get() {
        histogram
            .with_label_values(&[capability, model])
            .observe(elapsed.as_secs_f64());
    }
}

pub fn record_db_query(operation: &str, elapsed: Duration) {
    if let Some(histogram) = DB_QUERY_DURATION_SECONDS.get() {
        histogram
            .with_label_values(&[operation])
            .observe(elapsed.as_secs_f64());
    }
}
