//! Router assembly and server lifecycle.

use axum::{
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    metrics::metrics_middleware,
    security_headers::security_headers_middleware,
    tracing::{http_request_span, request_id_middleware},
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::PolystepConfig;
use crate::handlers;
use crate::services::providers::gemini::{GeminiConfig, GeminiProvider};
use crate::services::providers::GenerativeProvider;
use crate::services::{AiGateway, Database};
use crate::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health_check))
        .route("/api/users", post(handlers::users::create_user))
        .route(
            "/api/vocabulary",
            get(handlers::vocabulary::list_vocabulary).post(handlers::vocabulary::add_vocabulary),
        )
        .route("/api/ai/generate", post(handlers::ai::generate))
        .route("/api/ai/translate", post(handlers::ai::translate))
        .route(
            "/api/ai/grammar-research",
            post(handlers::ai::grammar_research),
        )
        .route("/api/ai/visualize", post(handlers::ai::visualize))
        .route(
            "/api/ai/reading-passage",
            post(handlers::ai::reading_passage),
        )
        .route("/metrics", get(handlers::metrics))
        // MatchedPath is only populated for matched routes.
        .route_layer(from_fn(metrics_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(http_request_span))
        // Outside the trace layer so the span sees the request id.
        .layer(from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Connect to the store, run migrations and build the Gemini-backed
    /// gateway from `config`.
    pub async fn build(config: PolystepConfig) -> Result<Self, AppError> {
        let gemini_config = GeminiConfig {
            api_key: config.google.api_key.clone(),
            api_base_url: config.google.api_base_url.clone(),
            timeout: Duration::from_secs(config.google.timeout_seconds),
        };
        let provider = GeminiProvider::new(gemini_config)
            .map_err(|e| AppError::ConfigError(anyhow::anyhow!(e)))?;

        if let Err(e) = provider.health_check().await {
            tracing::warn!(error = %e, "Gemini provider not ready; AI endpoints will fail");
        }
        tracing::info!(
            text_model = %config.models.text_model,
            image_model = %config.models.image_model,
            "Initialized Gemini provider"
        );

        Self::build_with_provider(config, Arc::new(provider)).await
    }

    /// Same as [`Application::build`] with a caller-supplied provider.
    pub async fn build_with_provider(
        config: PolystepConfig,
        provider: Arc<dyn GenerativeProvider>,
    ) -> Result<Self, AppError> {
        let db = Database::connect(&config.database.url, config.database.max_connections)
            .await
            .map_err(|e| {
                tracing::error!("Failed to connect to database: {}", e);
                e
            })?;

        db.run_migrations().await.map_err(|e| {
            tracing::error!("Failed to run database migrations: {}", e);
            e
        })?;

        let gateway = AiGateway::new(provider, config.models.clone());

        let address = format!("{}:{}", config.common.host, config.common.port);
        let listener = TcpListener::bind(&address).await.map_err(|e| {
            tracing::error!("Failed to bind to {}: {}", address, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        let router = build_router(AppState::new(config, db, gateway));

        Ok(Self {
            port,
            listener,
            router,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> Result<(), AppError> {
        tracing::info!("Listening on port {}", self.port);

        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
