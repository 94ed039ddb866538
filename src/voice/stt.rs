//! Speech-to-text (STT) engines

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use super::{AudioClip, SpeechRecognizer, process};
use crate::{Error, Result};

/// Response from OpenAI Whisper transcription API
#[derive(serde::Deserialize)]
struct WhisperResponse {
    text: String,
}

/// Transcribes speech through the OpenAI Whisper API
pub struct WhisperApi {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    model: String,
}

impl WhisperApi {
    /// Create a new Whisper API client
    ///
    /// # Errors
    ///
    /// Returns error if API key is missing
    pub fn new(
        api_key: SecretString,
        base_url: &str,
        model: String,
        timeout: Duration,
    ) -> Result<Self> {
        if api_key.expose_secret().is_empty() {
            return Err(Error::Config(
                "OpenAI API key required for Whisper".to_string(),
            ));
        }

        Ok(Self {
            client: reqwest::Client::builder().timeout(timeout).build()?,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
        })
    }
}

#[async_trait]
impl SpeechRecognizer for WhisperApi {
    fn name(&self) -> &str {
        "whisper-api"
    }

    async fn transcribe(&self, clip: AudioClip<'_>, language: &str) -> Result<String> {
        tracing::debug!(audio_bytes = clip.data.len(), "starting Whisper transcription");

        let form = reqwest::multipart::Form::new()
            .part(
                "file",
                reqwest::multipart::Part::bytes(clip.data.to_vec())
                    .file_name(format!("audio.{}", clip.extension())),
            )
            .text("model", self.model.clone())
            .text("language", language.to_string());

        let response = self
            .client
            .post(format!("{}/audio/transcriptions", self.base_url))
            .bearer_auth(self.api_key.expose_secret())
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Whisper request failed");
                e
            })?;

        let status = response.status();
        tracing::debug!(status = %status, "received response");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Whisper API error");
            return Err(Error::Stt(format!("Whisper API error {status}: {body}")));
        }

        let result: WhisperResponse = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "failed to parse response");
            e
        })?;

        let text = result.text.trim().to_string();
        tracing::info!(transcript = %text, "transcription complete");
        Ok(text)
    }
}

/// Transcribes speech with a locally installed `whisper` CLI
pub struct WhisperCli {
    binary: PathBuf,
    model: String,
    timeout: Duration,
}

impl WhisperCli {
    /// Locate the whisper binary
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
impl SpeechRecognizer for WhisperCli {
    fn name(&self) -> &str {
        "whisper-cli"
    }

    async fn transcribe(&self, clip: AudioClip<'_>, language: &str) -> Result<String> {
        // Removed on drop, whichever way this function returns
        let staging = tempfile::tempdir()?;
        let input = staging.path().join(format!("input.{}", clip.extension()));
        tokio::fs::write(&input, clip.data).await?;

        tracing::debug!(
            audio_bytes = clip.data.len(),
            path = %input.display(),
            "starting local whisper transcription"
        );

        let mut cmd = process::command(&self.binary);
        cmd.arg(&input)
            .args(["--model", self.model.as_str()])
            .args(["--language", language])
            .args(["--output_format", "txt"])
            .arg("--output_dir")
            .arg(staging.path());

        process::run(cmd, self.timeout)
            .await
            .map_err(|e| Error::Stt(e.to_string()))?;

        let transcript = tokio::fs::read_to_string(input.with_extension("txt"))
            .await
            .map_err(|e| Error::Stt(format!("whisper produced no transcript: {e}")))?;

        let text = transcript.trim().to_string();
        tracing::info!(transcript = %text, "transcription complete");
        Ok(text)
    }
}
