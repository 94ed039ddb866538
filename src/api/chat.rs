//! Chat endpoint

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::post,
};
use serde::Deserialize;

use super::{ApiError, ApiState};
use crate::companion::{ChatTurn, Memory, chat_turn};
use crate::llm::{ChatMessage, Role};

/// Build chat router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/chat", post(chat))
        .with_state(state)
}

/// Chat request
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,

    /// Memory echoed back from the previous turn
    #[serde(default)]
    pub memory: Option<Memory>,

    #[serde(default, alias = "conversationHistory")]
    pub conversation_history: Option<Vec<HistoryEntry>>,
}

/// One prior exchange as sent by the client
#[derive(Debug, Deserialize)]
pub struct HistoryEntry {
    pub role: String,
    #[serde(default)]
    pub content: String,
}

impl HistoryEntry {
    /// Convert to a model message; roles other than user/assistant are dropped
    fn into_message(self) -> Option<ChatMessage> {
        let role = match self.role.to_ascii_lowercase().as_str() {
            "user" => Role::User,
            "assistant" => Role::Assistant,
            _ => return None,
        };
        Some(ChatMessage {
            role,
            content: self.content,
        })
    }
}

/// Run one chat turn
///
/// Backend failures still answer 200 with a fallback reply.
async fn chat(
    State(state): State<Arc<ApiState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatTurn>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let message = request.message.trim();
    if message.is_empty() {
        return Err(ApiError::BadRequest("message must not be empty".to_string()));
    }

    let history: Vec<ChatMessage> = request
        .conversation_history
        .unwrap_or_default()
        .into_iter()
        .filter_map(HistoryEntry::into_message)
        .collect();

    let turn = chat_turn(
        &state.responder,
        message,
        request.memory.unwrap_or_default(),
        &history,
    )
    .await;

    tracing::info!(emotion = %turn.emotion, "chat turn complete");

    Ok(Json(turn))
}
