//! Reply generation with in-character fallback

use std::sync::Arc;

use super::fallback::Randomness;
use super::memory::Memory;
use super::prompt::{Mood, build_persona_prompt};
use crate::llm::{ChatBackend, ChatMessage, Role, Sampling};

/// Persona identity settings
#[derive(Debug, Clone)]
pub struct PersonaSettings {
    /// Name the companion goes by
    pub name: String,

    /// How to address a user who never introduced themselves
    pub default_user_name: String,
}

impl Default for PersonaSettings {
    fn default() -> Self {
        Self {
            name: "Yuki".to_string(),
            default_user_name: "amor".to_string(),
        }
    }
}

/// Generates persona replies, falling back to canned lines
pub struct Responder {
    backend: Option<Arc<dyn ChatBackend>>,
    persona: PersonaSettings,
    sampling: Sampling,
    history_limit: usize,
    randomness: Randomness,
}

impl Responder {
    /// Create a responder
    ///
    /// Without a backend every reply comes from the fallback tables.
    #[must_use]
    pub fn new(backend: Option<Arc<dyn ChatBackend>>, persona: PersonaSettings) -> Self {
        Self {
            backend,
            persona,
            sampling: Sampling::default(),
            history_limit: 10,
            randomness: Randomness::default(),
        }
    }

    /// Override sampling parameters
    #[must_use]
    pub fn sampling(mut self, sampling: Sampling) -> Self {
        self.sampling = sampling;
        self
    }

    /// Maximum number of history entries forwarded to the model
    #[must_use]
    pub fn history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    /// Inject the randomness source used for fallback selection
    #[must_use]
    pub fn randomness(mut self, randomness: Randomness) -> Self {
        self.randomness = randomness;
        self
    }

    /// Whether a language model backend is configured
    #[must_use]
    pub fn has_backend(&self) -> bool {
        self.backend.is_some()
    }

    /// Persona settings in use
    #[must_use]
    pub const fn persona(&self) -> &PersonaSettings {
        &self.persona
    }

    /// Shared randomness source
    #[must_use]
    pub const fn rng(&self) -> &Randomness {
        &self.randomness
    }

    /// Produce a reply for `message` given the already-updated memory
    ///
    /// Never fails: backend errors are logged and replaced by a fallback line
    /// chosen for the memory's mood tier.
    pub async fn reply(&self, message: &str, memory: &Memory, history: &[ChatMessage]) -> String {
        let user_name = memory.display_name(&self.persona.default_user_name);

        let Some(backend) = &self.backend else {
            tracing::debug!("no language model configured, using fallback reply");
            return self.randomness.fallback_reply(Mood::of(memory), user_name);
        };

        let messages = self.build_messages(message, memory, history);
        match backend.complete(&messages, self.sampling).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(backend = backend.name(), error = %e, "completion failed, using fallback reply");
                self.randomness.fallback_reply(Mood::of(memory), user_name)
            }
        }
    }

    /// System prompt, trailing history window, then the user message
    fn build_messages(
        &self,
        message: &str,
        memory: &Memory,
        history: &[ChatMessage],
    ) -> Vec<ChatMessage> {
        let prompt = build_persona_prompt(
            &self.persona.name,
            memory,
            &self.persona.default_user_name,
        );

        let recent: Vec<&ChatMessage> = history
            .iter()
            .filter(|m| matches!(m.role, Role::User | Role::Assistant))
            .collect();
        let skip = recent.len().saturating_sub(self.history_limit);

        let mut messages = Vec::with_capacity(self.history_limit + 2);
        messages.push(ChatMessage::system(prompt));
        messages.extend(recent.into_iter().skip(skip).cloned());
        messages.push(ChatMessage::user(message));
        messages
    }
}
