//! Health check endpoints

use std::sync::Arc;

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use super::ApiState;
use crate::backends::Capabilities;

/// Root greeting
#[derive(Serialize)]
pub struct RootResponse {
    pub message: String,
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    #[serde(flatten)]
    pub capabilities: Capabilities,
}

async fn root(State(state): State<Arc<ApiState>>) -> Json<RootResponse> {
    Json(RootResponse {
        message: format!(
            "🌸 {} companion API is running! 💕",
            state.responder.persona().name
        ),
    })
}

/// Liveness probe with backend availability
async fn health(State(state): State<Arc<ApiState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        capabilities: state.backends.capabilities(),
    })
}

/// Build health router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .with_state(state)
}
