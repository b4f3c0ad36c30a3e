//! HTTP server implementation using Axum.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    Router,
    http::{HeaderValue, Method},
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use guidebot_core::config::{GatewayConfig, GuideBotConfig};
use guidebot_engine::{EngineOptions, RagEngine};

/// Shared state for the gateway server.
#[derive(Clone)]
pub struct AppState {
    pub gateway_config: GatewayConfig,
    pub engine: Arc<RagEngine>,
    pub start_time: Instant,
}

/// Build the Axum router with all routes.
pub fn build_router(state: AppState) -> Router {
    let shared = Arc::new(state);

    let cors = {
        let cors = CorsLayer::new()
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
            .max_age(std::time::Duration::from_secs(3600));

        let origins: Vec<HeaderValue> = shared
            .gateway_config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        if origins.is_empty() {
            // Development fallback — allow all origins
            cors.allow_origin(Any)
        } else {
            cors.allow_origin(origins)
        }
    };

    Router::new()
        .route("/ask", post(super::routes::ask))
        .route("/health", get(super::routes::health_check))
        .route("/status", get(super::routes::status))
        .route("/rebuild", post(super::routes::rebuild))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}

/// Wire providers, store, and engine from config and start the HTTP server.
pub async fn start(config: &GuideBotConfig) -> anyhow::Result<()> {
    let embedder = guidebot_providers::create_embedding_provider(config)?;
    let completer = guidebot_providers::create_completion_provider(config)?;
    let store = guidebot_knowledge::create_store(config)?;

    // prime the knowledge base before serving
    match store.load().await {
        Some(status) => tracing::info!(
            "📚 Knowledge base ready: {} chunks ({} backend)",
            status.chunk_count,
            store.name()
        ),
        None => tracing::warn!(
            "ℹ Knowledge base not loaded — run `guidebot ingest` or POST /rebuild"
        ),
    }

    let engine = Arc::new(RagEngine::new(
        embedder,
        completer,
        store,
        EngineOptions::from_config(config),
    ));
    let state = AppState {
        gateway_config: config.gateway.clone(),
        engine,
        start_time: Instant::now(),
    };
    let app = build_router(state);

    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("🌐 Gateway server listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
