//! Companion persona: memory, emotion and reply generation
//!
//! One chat turn folds the message into the caller's memory, classifies its
//! emotion and asks the language model for an in-character reply.

pub mod emotion;
pub mod fallback;
pub mod memory;
pub mod names;
pub mod prompt;
mod responder;

use serde::Serialize;

pub use emotion::{Emotion, classify};
pub use fallback::Randomness;
pub use memory::Memory;
pub use names::extract_name;
pub use prompt::{Mood, build_persona_prompt};
pub use responder::{PersonaSettings, Responder};

use crate::llm::ChatMessage;

/// Outcome of one chat turn
#[derive(Debug, Clone, Serialize)]
pub struct ChatTurn {
    pub response: String,
    pub emotion: Emotion,
    pub updated_memory: Memory,
}

/// Run one chat turn
///
/// Memory is updated first so the persona prompt and any fallback reflect the
/// current message.
pub async fn chat_turn(
    responder: &Responder,
    message: &str,
    memory: Memory,
    history: &[ChatMessage],
) -> ChatTurn {
    let updated_memory = memory.update(message);
    let emotion = updated_memory.last_emotion;

    tracing::debug!(
        emotion = %emotion,
        relationship = updated_memory.relationship_level,
        annoyance = updated_memory.annoyance_level,
        "memory updated"
    );

    let response = responder.reply(message, &updated_memory, history).await;

    ChatTurn {
        response,
        emotion,
        updated_memory,
    }
}
