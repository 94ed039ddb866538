//! Text-to-speech (TTS) engines

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use super::{SpeechSynthesizer, process};
use crate::{Error, Result};

/// Synthesizes speech through the OpenAI speech API
pub struct OpenAiSpeech {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    voice: String,
    speed: f32,
    model: String,
}

impl OpenAiSpeech {
    /// Create a new speech client
    ///
    /// # Errors
    ///
    /// Returns error if API key is missing
    pub fn new(
        api_key: SecretString,
        base_url: &str,
        model: String,
        voice: String,
        speed: f32,
        timeout: Duration,
    ) -> Result<Self> {
        if api_key.expose_secret().is_empty() {
            return Err(Error::Config("OpenAI API key required for TTS".to_string()));
        }

        Ok(Self {
            client: reqwest::Client::builder().timeout(timeout).build()?,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            voice,
            speed,
            model,
        })
    }
}

#[async_trait]
impl SpeechSynthesizer for OpenAiSpeech {
    fn name(&self) -> &str {
        "openai-tts"
    }

    async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        #[derive(serde::Serialize)]
        struct TtsRequest<'a> {
            model: &'a str,
            input: &'a str,
            voice: &'a str,
            speed: f32,
            response_format: &'static str,
        }

        let request = TtsRequest {
            model: &self.model,
            input: text,
            voice: &self.voice,
            speed: self.speed,
            response_format: "wav",
        };

        let response = self
            .client
            .post(format!("{}/audio/speech", self.base_url))
            .bearer_auth(self.api_key.expose_secret())
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Tts(format!("OpenAI TTS error {status}: {body}")));
        }

        let audio = response.bytes().await?;
        Ok(audio.to_vec())
    }
}

/// Synthesizes speech with a locally installed Coqui `tts` CLI
pub struct CoquiCli {
    binary: PathBuf,
    model: String,
    timeout: Duration,
}

impl CoquiCli {
    /// Locate the tts binary
    ///
    /// # Errors
    ///
    /// Returns error if the binary is not installed
    pub fn new(binary: &str, model: String, timeout: Duration) -> Result<Self> {
        Ok(Self {
            binary: process::locate(binary)?,
            model,
            timeout,
        })
    }
}

#[async_trait]
impl SpeechSynthesizer for CoquiCli {
    fn name(&self) -> &str {
        "coqui-cli"
    }

    async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        let staging = tempfile::tempdir()?;
        let output = staging.path().join("speech.wav");

        tracing::debug!(chars = text.chars().count(), model = %self.model, "starting local synthesis");

        // Joined with `=` so text starting with `-` is not read as a flag
        let mut cmd = process::command(&self.binary);
        cmd.arg(format!("--text={text}"))
            .args(["--model_name", self.model.as_str()])
            .arg("--out_path")
            .arg(&output);

        process::run(cmd, self.timeout)
            .await
            .map_err(|e| Error::Tts(e.to_string()))?;

        let audio = tokio::fs::read(&output).await?;
        tracing::info!(audio_bytes = audio.len(), "synthesis complete");
        Ok(audio)
    }
}
