//! Language model backends
//!
//! The companion only needs a single chat completion per turn, so the
//! contract is deliberately narrow: system prompt, recent history, user
//! message and sampling parameters in; completion text out.

mod openai;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use openai::OpenAiChat;

use crate::Result;

/// Speaker of a conversation message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One message in a chat completion request
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Sampling parameters for a completion
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sampling {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for Sampling {
    fn default() -> Self {
        Self {
            temperature: 0.9,
            max_tokens: 150,
        }
    }
}

/// A chat-completion capable language model
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Backend name for logs and diagnostics
    fn name(&self) -> &str;

    /// Produce a single completion for the given messages
    ///
    /// # Errors
    ///
    /// Returns error on transport failure, non-success status or an empty or
    /// malformed completion
    async fn complete(&self, messages: &[ChatMessage], sampling: Sampling) -> Result<String>;
}
