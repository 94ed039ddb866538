//! Shared test utilities

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::Request;
use companion_gateway::llm::{ChatBackend, ChatMessage, Sampling};
use companion_gateway::voice::{AudioClip, SpeechRecognizer, SpeechSynthesizer, silence};
use companion_gateway::{ApiServerBuilder, Backends, Config, Error, Randomness, Result};

/// Language model that always answers with a fixed reply
pub struct FixedChat(pub &'static str);

#[async_trait]
impl ChatBackend for FixedChat {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn complete(&self, _messages: &[ChatMessage], _sampling: Sampling) -> Result<String> {
        Ok(self.0.to_string())
    }
}

/// Language model whose connection always fails
pub struct UnreachableChat;

#[async_trait]
impl ChatBackend for UnreachableChat {
    fn name(&self) -> &str {
        "unreachable"
    }

    async fn complete(&self, _messages: &[ChatMessage], _sampling: Sampling) -> Result<String> {
        Err(Error::Llm("connection refused".to_string()))
    }
}

/// Recognizer returning a fixed transcript
pub struct FixedRecognizer(pub &'static str);

#[async_trait]
impl SpeechRecognizer for FixedRecognizer {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn transcribe(&self, _clip: AudioClip<'_>, _language: &str) -> Result<String> {
        Ok(self.0.to_string())
    }
}

/// Recognizer that always fails
pub struct BrokenRecognizer;

#[async_trait]
impl SpeechRecognizer for BrokenRecognizer {
    fn name(&self) -> &str {
        "broken"
    }

    async fn transcribe(&self, _clip: AudioClip<'_>, _language: &str) -> Result<String> {
        Err(Error::Stt("model crashed".to_string()))
    }
}

/// Synthesizer producing a short valid WAV
pub struct ToneSynthesizer;

#[async_trait]
impl SpeechSynthesizer for ToneSynthesizer {
    fn name(&self) -> &str {
        "tone"
    }

    async fn synthesize(&self, _text: &str) -> Result<Vec<u8>> {
        silence(500, 22_050)
    }
}

/// Synthesizer returning bytes that are not WAV
pub struct Mp3Synthesizer;

#[async_trait]
impl SpeechSynthesizer for Mp3Synthesizer {
    fn name(&self) -> &str {
        "mp3"
    }

    async fn synthesize(&self, _text: &str) -> Result<Vec<u8>> {
        Ok(b"ID3\x04\x00\x00\x00\x00\x00\x00not really audio".to_vec())
    }
}

/// Build a test API router over the given backends with seeded fallbacks
pub fn build_test_router(backends: Backends) -> axum::Router {
    ApiServerBuilder::new(&Config::default(), backends)
        .randomness(Randomness::seeded(7))
        .build()
        .router()
}

/// Backends with nothing configured
pub fn no_backends() -> Backends {
    Backends::default()
}

/// Backends with a language model only
pub fn chat_backends(llm: Arc<dyn ChatBackend>) -> Backends {
    Backends {
        llm: Some(llm),
        ..Backends::default()
    }
}

/// POST a JSON body
pub fn json_request(uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("failed to build request")
}

/// POST a multipart body with a single file field
pub fn multipart_request(uri: &str, field: &str, file_name: &str, data: &[u8]) -> Request<Body> {
    const BOUNDARY: &str = "companion-test-boundary";

    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .expect("failed to build request")
}

/// Collect a response body as JSON
pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read body");
    serde_json::from_slice(&body).expect("body is not JSON")
}
