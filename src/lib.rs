//! Companion Gateway - HTTP API for a virtual companion persona
//!
//! This library provides the core functionality for the companion gateway:
//! - Persona memory, emotion classification and prompt assembly
//! - Language model replies with in-character fallbacks
//! - Speech-to-text and text-to-speech with fallbacks
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                    HTTP API                          │
//! │  /speech-to-text  │  /chat  │  /text-to-speech  │ … │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │                 Companion                            │
//! │   Memory  │  Emotion  │  Persona prompt  │ Fallback │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │            Backends (optional)                       │
//! │   LLM  │  STT (API / whisper)  │  TTS (API / Coqui) │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod backends;
pub mod companion;
pub mod config;
pub mod error;
pub mod llm;
pub mod voice;

pub use api::{ApiServer, ApiServerBuilder};
pub use backends::{Backends, Capabilities};
pub use companion::{ChatTurn, Emotion, Memory, Randomness, Responder, chat_turn};
pub use config::Config;
pub use error::{Error, Result};
