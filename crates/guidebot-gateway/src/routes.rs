//! API route handlers for the gateway.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

use guidebot_core::types::Answer;
use guidebot_ingest::PageContent;

use super::server::AppState;

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub question: String,
}

#[derive(Debug, Deserialize)]
pub struct RebuildRequest {
    /// Vision model used by the extractor; recorded in KB metadata.
    #[serde(default)]
    pub vision_model: String,
    pub pages: Vec<PageContent>,
}

type ClientError = (StatusCode, Json<Value>);

fn bad_request(message: &str) -> ClientError {
    (StatusCode::BAD_REQUEST, Json(json!({"error": message})))
}

/// Ask a question, get a grounded answer with sources.
///
/// An empty or whitespace-only question is rejected here, before any
/// embedding or completion call is made.
pub async fn ask(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AskRequest>,
) -> Result<Json<Answer>, ClientError> {
    let question = body.question.trim();
    if question.is_empty() {
        return Err(bad_request("Question is required"));
    }
    Ok(Json(state.engine.ask(question).await))
}

/// Health check endpoint.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    let status = state.engine.status().await;
    Json(json!({
        "status": "ok",
        "service": "guidebot-gateway",
        "version": env!("CARGO_PKG_VERSION"),
        "knowledge_base_loaded": status.is_some(),
        "chunks_count": status.map(|s| s.chunk_count).unwrap_or(0),
    }))
}

/// System status: whether the knowledge base is initialized and how big it is.
pub async fn status(State(state): State<Arc<AppState>>) -> Json<Value> {
    let uptime_secs = state.start_time.elapsed().as_secs();
    match state.engine.status().await {
        Some(s) => Json(json!({
            "initialized": true,
            "chunks_count": s.chunk_count,
            "embedding_model": s.embedding_model,
            "uptime_secs": uptime_secs,
            "message": format!("System ready. {} chunks loaded.", s.chunk_count),
        })),
        None => Json(json!({
            "initialized": false,
            "uptime_secs": uptime_secs,
            "message": "Knowledge base has not been built yet",
        })),
    }
}

/// Rebuild the knowledge base from extracted manual pages.
pub async fn rebuild(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RebuildRequest>,
) -> Result<Json<Value>, ClientError> {
    if body.pages.is_empty() {
        return Err(bad_request("Pages are required"));
    }

    match state
        .engine
        .rebuild_from_pages(&body.pages, &body.vision_model)
        .await
    {
        Ok(s) => Ok(Json(
            json!({"status": "success", "chunks_count": s.chunk_count}),
        )),
        Err(e) => {
            tracing::error!("rebuild failed: {e}");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": e.to_string()})),
            ))
        }
    }
}
