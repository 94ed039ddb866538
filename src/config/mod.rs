//! Configuration management for the companion gateway
//!
//! Values resolve env > TOML file > default.

pub mod file;

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::companion::PersonaSettings;
use crate::llm::Sampling;
use crate::{Error, Result};

/// Default OpenAI-compatible API base URL
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Companion gateway configuration
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,

    /// Persona identity
    pub persona: PersonaSettings,

    /// Language model configuration
    pub llm: LlmConfig,

    /// Speech recognition configuration
    pub stt: SttConfig,

    /// Speech synthesis configuration
    pub tts: TtsConfig,

    /// API keys
    pub api_keys: ApiKeys,
}

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,

    /// Origins allowed by CORS
    pub cors_origins: Vec<String>,

    /// Global request budget; `None` disables rate limiting
    pub rate_limit_per_minute: Option<u32>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
            rate_limit_per_minute: None,
        }
    }
}

/// Language model configuration
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// OpenAI-compatible base URL
    pub base_url: String,

    /// Model identifier for chat completions
    pub model: String,

    /// Sampling parameters
    pub sampling: Sampling,

    /// Request timeout
    pub timeout: Duration,

    /// Max history entries forwarded per turn
    pub history_limit: usize,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            model: "gpt-3.5-turbo".to_string(),
            sampling: Sampling::default(),
            timeout: Duration::from_secs(30),
            history_limit: 10,
        }
    }
}

/// Speech recognition engine selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SttEngine {
    /// OpenAI API when a key is set, otherwise local whisper when installed
    #[default]
    Auto,
    #[serde(rename = "openai")]
    OpenAi,
    WhisperCli,
    None,
}

impl FromStr for SttEngine {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "openai" => Ok(Self::OpenAi),
            "whisper-cli" | "whisper" => Ok(Self::WhisperCli),
            "none" | "off" => Ok(Self::None),
            other => Err(Error::Config(format!("unknown STT engine: {other}"))),
        }
    }
}

/// Speech synthesis engine selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TtsEngine {
    /// OpenAI API when a key is set, otherwise local Coqui when installed
    #[default]
    Auto,
    #[serde(rename = "openai")]
    OpenAi,
    CoquiCli,
    None,
}

impl FromStr for TtsEngine {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "openai" => Ok(Self::OpenAi),
            "coqui-cli" | "coqui" | "tts" => Ok(Self::CoquiCli),
            "none" | "off" => Ok(Self::None),
            other => Err(Error::Config(format!("unknown TTS engine: {other}"))),
        }
    }
}

/// Speech recognition configuration
#[derive(Debug, Clone)]
pub struct SttConfig {
    pub engine: SttEngine,

    /// API model (e.g. "whisper-1")
    pub model: String,

    /// Target language code
    pub language: String,

    /// Local whisper binary
    pub binary: String,

    /// Local whisper model size
    pub cli_model: String,

    pub timeout: Duration,
}

impl Default for SttConfig {
    fn default() -> Self {
        Self {
            engine: SttEngine::Auto,
            model: "whisper-1".to_string(),
            language: "es".to_string(),
            binary: "whisper".to_string(),
            cli_model: "tiny".to_string(),
            timeout: Duration::from_secs(60),
        }
    }
}

/// Speech synthesis configuration
#[derive(Debug, Clone)]
pub struct TtsConfig {
    pub engine: TtsEngine,

    /// API model (e.g. "tts-1")
    pub model: String,

    /// API voice identifier
    pub voice: String,

    /// API speed multiplier (0.25 to 4.0)
    pub speed: f32,

    /// Local Coqui tts binary
    pub binary: String,

    /// Local Coqui model name
    pub cli_model: String,

    pub timeout: Duration,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            engine: TtsEngine::Auto,
            model: "tts-1".to_string(),
            voice: "nova".to_string(),
            speed: 1.0,
            binary: "tts".to_string(),
            cli_model: "tts_models/es/css10/vits".to_string(),
            timeout: Duration::from_secs(60),
        }
    }
}

/// API keys for external services
#[derive(Clone, Default)]
pub struct ApiKeys {
    /// `OpenAI` API key (chat, Whisper and TTS)
    pub openai: Option<String>,
}

impl fmt::Debug for ApiKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKeys")
            .field("openai", &self.openai.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Config {
    /// Load configuration from the process environment and config file
    ///
    /// # Errors
    ///
    /// Returns error if an explicit config file is unreadable or an
    /// environment override is invalid
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let fc = file::load_config_file(config_path)?;
        Self::from_sources(fc, |key| std::env::var(key).ok())
    }

    /// Resolve configuration from a parsed file and an environment lookup
    ///
    /// # Errors
    ///
    /// Returns error if an environment override is invalid
    pub fn from_sources(
        fc: file::CompanionConfigFile,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let defaults = Self::default();
        let non_empty = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let server = ServerConfig {
            host: fc.server.host.unwrap_or(defaults.server.host),
            port: fc.server.port.unwrap_or(defaults.server.port),
            cors_origins: fc.server.cors_origins.unwrap_or(defaults.server.cors_origins),
            rate_limit_per_minute: fc.server.rate_limit_per_minute,
        };

        let persona = PersonaSettings {
            name: fc.persona.name.unwrap_or(defaults.persona.name),
            default_user_name: fc
                .persona
                .default_user_name
                .unwrap_or(defaults.persona.default_user_name),
        };

        // OPENAI_BASE_URL applies to every OpenAI-compatible backend
        let base_url = non_empty("OPENAI_BASE_URL")
            .or(fc.llm.base_url)
            .unwrap_or(defaults.llm.base_url);

        let llm = LlmConfig {
            base_url,
            model: non_empty("COMPANION_LLM_MODEL")
                .or(fc.llm.model)
                .unwrap_or(defaults.llm.model),
            sampling: Sampling {
                temperature: fc
                    .llm
                    .temperature
                    .unwrap_or(defaults.llm.sampling.temperature),
                max_tokens: fc.llm.max_tokens.unwrap_or(defaults.llm.sampling.max_tokens),
            },
            timeout: fc
                .llm
                .timeout_secs
                .map_or(defaults.llm.timeout, Duration::from_secs),
            history_limit: fc.llm.history_limit.unwrap_or(defaults.llm.history_limit),
        };

        let stt_engine = match non_empty("COMPANION_STT_ENGINE") {
            Some(v) => v.parse()?,
            None => fc.stt.engine.unwrap_or(defaults.stt.engine),
        };
        let stt = SttConfig {
            engine: stt_engine,
            model: fc.stt.model.unwrap_or(defaults.stt.model),
            language: fc.stt.language.unwrap_or(defaults.stt.language),
            binary: fc.stt.binary.unwrap_or(defaults.stt.binary),
            cli_model: fc.stt.cli_model.unwrap_or(defaults.stt.cli_model),
            timeout: fc
                .stt
                .timeout_secs
                .map_or(defaults.stt.timeout, Duration::from_secs),
        };

        let tts_engine = match non_empty("COMPANION_TTS_ENGINE") {
            Some(v) => v.parse()?,
            None => fc.tts.engine.unwrap_or(defaults.tts.engine),
        };
        let tts = TtsConfig {
            engine: tts_engine,
            model: fc.tts.model.unwrap_or(defaults.tts.model),
            voice: fc.tts.voice.unwrap_or(defaults.tts.voice),
            speed: fc.tts.speed.unwrap_or(defaults.tts.speed).clamp(0.25, 4.0),
            binary: fc.tts.binary.unwrap_or(defaults.tts.binary),
            cli_model: fc.tts.cli_model.unwrap_or(defaults.tts.cli_model),
            timeout: fc
                .tts
                .timeout_secs
                .map_or(defaults.tts.timeout, Duration::from_secs),
        };

        let api_keys = ApiKeys {
            openai: non_empty("OPENAI_API_KEY").or(fc.api_keys.openai.filter(|k| !k.is_empty())),
        };

        Ok(Self {
            server,
            persona,
            llm,
            stt,
            tts,
            api_keys,
        })
    }
}
