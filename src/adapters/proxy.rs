//! HTTP proxy that keeps the generator API key on the server.
//!
//! `POST /api/generate` takes `{"prompt": "..."}`, forwards it to the
//! generator and returns the upstream JSON body unmodified. A missing, empty
//! or whitespace-only prompt is rejected with 400 before any upstream call.

use crate::adapters::gemini::GeminiClient;
use crate::utils::error::Result;
use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct ProxyState {
    client: Arc<GeminiClient>,
}

impl ProxyState {
    pub fn new(client: GeminiClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub prompt: Option<String>,
}

pub fn router(state: ProxyState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/generate", post(generate))
        // 舊版前端使用的路徑
        .route("/api/generate-brd", post(generate))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, state: ProxyState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("✅ Proxy listening on http://{}", addr);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn health() -> Json<Value> {
    Json(json!({ "ok": true, "message": "docgen proxy is alive" }))
}

async fn generate(
    State(state): State<ProxyState>,
    body: Option<Json<GenerateRequest>>,
) -> (StatusCode, Json<Value>) {
    let prompt = body
        .and_then(|Json(request)| request.prompt)
        .filter(|prompt| !prompt.trim().is_empty());

    let Some(prompt) = prompt else {
        tracing::warn!("⚠️ Rejected request without prompt");
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Prompt is required" })),
        );
    };

    tracing::info!("Forwarding prompt ({} characters)", prompt.len());

    match state.client.generate_raw(&prompt).await {
        Ok(response) => (StatusCode::OK, Json(response)),
        Err(e) => {
            tracing::error!("❌ Upstream request failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Internal Server Error" })),
            )
        }
    }
}
