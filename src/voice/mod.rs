//! Speech backends
//!
//! Recognition and synthesis are delegated to external engines, either a
//! hosted OpenAI-compatible API or a locally installed command-line tool.

mod process;
mod stt;
mod tts;
mod wav;

use async_trait::async_trait;

pub use stt::{WhisperApi, WhisperCli};
pub use tts::{CoquiCli, OpenAiSpeech};
pub use wav::{SAMPLE_RATE, is_wav, samples_to_wav, silence, silent_clip};

use crate::Result;

/// An uploaded audio clip awaiting transcription
#[derive(Debug, Clone, Copy)]
pub struct AudioClip<'a> {
    /// Raw encoded audio (webm, wav, ...)
    pub data: &'a [u8],

    /// Client-supplied file name, used to infer the container format
    pub file_name: &'a str,
}

impl AudioClip<'_> {
    /// File extension to stage the clip with
    ///
    /// Falls back to `webm`, the format browsers record in.
    #[must_use]
    pub fn extension(&self) -> &str {
        std::path::Path::new(self.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .filter(|e| !e.is_empty() && e.len() <= 5 && e.chars().all(|c| c.is_ascii_alphanumeric()))
            .unwrap_or("webm")
    }
}

/// Speech recognition engine
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Engine name for logs and diagnostics
    fn name(&self) -> &str;

    /// Transcribe a clip in the given language
    ///
    /// # Errors
    ///
    /// Returns error if the engine fails or cannot be reached
    async fn transcribe(&self, clip: AudioClip<'_>, language: &str) -> Result<String>;
}

/// Speech synthesis engine
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Engine name for logs and diagnostics
    fn name(&self) -> &str;

    /// Synthesize text to WAV bytes
    ///
    /// # Errors
    ///
    /// Returns error if the engine fails or cannot be reached
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>>;
}

/// Where synthesized audio came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeechSource {
    Engine,
    Fallback,
}

impl SpeechSource {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Engine => "engine",
            Self::Fallback => "fallback",
        }
    }
}

/// Synthesize with `engine`, substituting the silent clip on any failure
///
/// Output that is not WAV counts as a failure, so the result is always a
/// playable WAV payload.
pub async fn synthesize_or_silence(
    engine: Option<&dyn SpeechSynthesizer>,
    text: &str,
) -> (SpeechSource, Vec<u8>) {
    let Some(engine) = engine else {
        tracing::debug!("no speech synthesizer configured, using silence");
        return (SpeechSource::Fallback, silent_clip().to_vec());
    };

    match engine.synthesize(text).await {
        Ok(audio) if is_wav(&audio) => (SpeechSource::Engine, audio),
        Ok(audio) => {
            tracing::warn!(engine = engine.name(), bytes = audio.len(), "engine output is not WAV, using silence");
            (SpeechSource::Fallback, silent_clip().to_vec())
        }
        Err(e) => {
            tracing::warn!(engine = engine.name(), error = %e, "synthesis failed, using silence");
            (SpeechSource::Fallback, silent_clip().to_vec())
        }
    }
}
