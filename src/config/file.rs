//! TOML configuration file loading
//!
//! Supports `~/.config/companion/config.toml` as a persistent config source.
//! All fields are optional; the file is a partial overlay on top of defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::{SttEngine, TtsEngine};
use crate::{Error, Result};

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct CompanionConfigFile {
    /// Server/runtime configuration
    #[serde(default)]
    pub server: ServerFileConfig,

    /// Persona identity
    #[serde(default)]
    pub persona: PersonaFileConfig,

    /// Language model configuration
    #[serde(default)]
    pub llm: LlmFileConfig,

    /// Speech recognition configuration
    #[serde(default)]
    pub stt: SttFileConfig,

    /// Speech synthesis configuration
    #[serde(default)]
    pub tts: TtsFileConfig,

    /// API keys for external services
    #[serde(default)]
    pub api_keys: ApiKeysFileConfig,
}

/// Server/runtime configuration
#[derive(Debug, Default, Deserialize)]
pub struct ServerFileConfig {
    pub host: Option<String>,
    pub port: Option<u16>,

    /// Origins allowed by CORS
    pub cors_origins: Option<Vec<String>>,

    /// Global request budget; unset disables rate limiting
    pub rate_limit_per_minute: Option<u32>,
}

/// Persona identity
#[derive(Debug, Default, Deserialize)]
pub struct PersonaFileConfig {
    pub name: Option<String>,
    pub default_user_name: Option<String>,
}

/// Language model configuration
#[derive(Debug, Default, Deserialize)]
pub struct LlmFileConfig {
    /// OpenAI-compatible base URL (e.g. "https://api.openai.com/v1")
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub timeout_secs: Option<u64>,
    pub history_limit: Option<usize>,
}

/// Speech recognition configuration
#[derive(Debug, Default, Deserialize)]
pub struct SttFileConfig {
    pub engine: Option<SttEngine>,

    /// API model (e.g. "whisper-1")
    pub model: Option<String>,

    /// Target language code (e.g. "es")
    pub language: Option<String>,

    /// Local whisper binary
    pub binary: Option<String>,

    /// Local whisper model size (e.g. "tiny")
    pub cli_model: Option<String>,

    pub timeout_secs: Option<u64>,
}

/// Speech synthesis configuration
#[derive(Debug, Default, Deserialize)]
pub struct TtsFileConfig {
    pub engine: Option<TtsEngine>,

    /// API model (e.g. "tts-1")
    pub model: Option<String>,

    /// API voice (e.g. "nova")
    pub voice: Option<String>,

    pub speed: Option<f32>,

    /// Local Coqui tts binary
    pub binary: Option<String>,

    /// Local Coqui model name
    pub cli_model: Option<String>,

    pub timeout_secs: Option<u64>,
}

/// API keys configuration
#[derive(Debug, Default, Deserialize)]
pub struct ApiKeysFileConfig {
    pub openai: Option<String>,
}

/// Load the TOML config file
///
/// An explicit path must exist and parse. The standard path is optional:
/// returns `CompanionConfigFile::default()` if it doesn't exist or can't be
/// parsed.
///
/// # Errors
///
/// Returns error if an explicitly given file cannot be read or parsed
pub fn load_config_file(explicit: Option<&Path>) -> Result<CompanionConfigFile> {
    if let Some(path) = explicit {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
        let config = toml::from_str(&content)?;
        tracing::info!(path = %path.display(), "loaded config file");
        return Ok(config);
    }

    let Some(path) = config_file_path() else {
        return Ok(CompanionConfigFile::default());
    };

    if !path.exists() {
        return Ok(CompanionConfigFile::default());
    }

    let config = match std::fs::read_to_string(&path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                CompanionConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            CompanionConfigFile::default()
        }
    };

    Ok(config)
}

/// Return the config file path: `~/.config/companion/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("companion").join("config.toml"))
}
