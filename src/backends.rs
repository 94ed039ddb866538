//! External backend handles
//!
//! Backends are constructed once at startup. A backend that cannot be set up
//! (missing key, missing binary, disabled) is logged and left out, and every
//! request that would use it takes the fallback path instead.

use std::sync::Arc;

use secrecy::SecretString;
use serde::Serialize;

use crate::config::{Config, SttEngine, TtsEngine};
use crate::llm::{ChatBackend, OpenAiChat};
use crate::voice::{CoquiCli, OpenAiSpeech, SpeechRecognizer, SpeechSynthesizer, WhisperApi, WhisperCli};
use crate::{Error, Result};

/// Availability of each external backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    pub stt: bool,
    pub tts: bool,
    pub llm: bool,
}

/// Optional handles to the speech and language backends
#[derive(Clone, Default)]
pub struct Backends {
    pub stt: Option<Arc<dyn SpeechRecognizer>>,
    pub tts: Option<Arc<dyn SpeechSynthesizer>>,
    pub llm: Option<Arc<dyn ChatBackend>>,
}

impl Backends {
    /// Set up every backend the configuration allows
    ///
    /// Never fails; unavailable backends are logged and skipped.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let backends = Self {
            stt: report("speech-to-text", build_stt(config)),
            tts: report("text-to-speech", build_tts(config)),
            llm: report("language model", build_llm(config)),
        };

        let caps = backends.capabilities();
        tracing::info!(stt = caps.stt, tts = caps.tts, llm = caps.llm, "backends ready");
        backends
    }

    /// Report which backends are available
    #[must_use]
    pub fn capabilities(&self) -> Capabilities {
        Capabilities {
            stt: self.stt.is_some(),
            tts: self.tts.is_some(),
            llm: self.llm.is_some(),
        }
    }
}

/// Log the outcome of building one backend
fn report<T: ?Sized>(kind: &str, built: Result<Arc<T>>) -> Option<Arc<T>> {
    match built {
        Ok(backend) => {
            tracing::info!(backend = kind, "backend available");
            Some(backend)
        }
        Err(e) => {
            tracing::warn!(backend = kind, error = %e, "backend unavailable, using fallback");
            None
        }
    }
}

fn openai_key(config: &Config) -> Option<SecretString> {
    config.api_keys.openai.clone().map(SecretString::from)
}

fn build_stt(config: &Config) -> Result<Arc<dyn SpeechRecognizer>> {
    let stt = &config.stt;
    let api = |key: SecretString| -> Result<Arc<dyn SpeechRecognizer>> {
        Ok(Arc::new(WhisperApi::new(
            key,
            &config.llm.base_url,
            stt.model.clone(),
            stt.timeout,
        )?))
    };
    let cli = || -> Result<Arc<dyn SpeechRecognizer>> {
        Ok(Arc::new(WhisperCli::new(
            &stt.binary,
            stt.cli_model.clone(),
            stt.timeout,
        )?))
    };

    match stt.engine {
        SttEngine::None => Err(Error::Unavailable("disabled in configuration")),
        SttEngine::OpenAi => api(openai_key(config).ok_or(Error::Unavailable("OPENAI_API_KEY not set"))?),
        SttEngine::WhisperCli => cli(),
        SttEngine::Auto => match openai_key(config) {
            Some(key) => api(key),
            None => cli(),
        },
    }
}

fn build_tts(config: &Config) -> Result<Arc<dyn SpeechSynthesizer>> {
    let tts = &config.tts;
    let api = |key: SecretString| -> Result<Arc<dyn SpeechSynthesizer>> {
        Ok(Arc::new(OpenAiSpeech::new(
            key,
            &config.llm.base_url,
            tts.model.clone(),
            tts.voice.clone(),
            tts.speed,
            tts.timeout,
        )?))
    };
    let cli = || -> Result<Arc<dyn SpeechSynthesizer>> {
        Ok(Arc::new(CoquiCli::new(
            &tts.binary,
            tts.cli_model.clone(),
            tts.timeout,
        )?))
    };

    match tts.engine {
        TtsEngine::None => Err(Error::Unavailable("disabled in configuration")),
        TtsEngine::OpenAi => api(openai_key(config).ok_or(Error::Unavailable("OPENAI_API_KEY not set"))?),
        TtsEngine::CoquiCli => cli(),
        TtsEngine::Auto => match openai_key(config) {
            Some(key) => api(key),
            None => cli(),
        },
    }
}

fn build_llm(config: &Config) -> Result<Arc<dyn ChatBackend>> {
    let key = openai_key(config).ok_or(Error::Unavailable("OPENAI_API_KEY not set"))?;
    Ok(Arc::new(OpenAiChat::new(
        key,
        &config.llm.base_url,
        config.llm.model.clone(),
        config.llm.timeout,
    )?))
}
