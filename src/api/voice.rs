//! Voice API endpoints for speech-to-text and text-to-speech

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{
        Multipart, State,
        multipart::MultipartRejection,
        rejection::JsonRejection,
    },
    http::{HeaderName, StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use serde::{Deserialize, Serialize};

use super::{ApiError, ApiState};
use crate::voice::{AudioClip, synthesize_or_silence};

/// Header naming where returned audio came from
pub const SPEECH_SOURCE_HEADER: HeaderName = HeaderName::from_static("x-speech-source");

/// Multipart field carrying the uploaded audio
const AUDIO_FIELD: &str = "audio";

/// Build voice router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/speech-to-text", post(speech_to_text))
        .route("/text-to-speech", post(text_to_speech))
        .with_state(state)
}

/// Transcription response
#[derive(Debug, Serialize)]
pub struct TranscribeResponse {
    pub ok: bool,
    pub text: String,

    /// Set when the text is canned rather than recognized
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<bool>,
}

/// Uploaded audio pulled out of the multipart body
struct Upload {
    data: Bytes,
    file_name: String,
}

/// Find the audio field in a multipart body
async fn read_upload(mut multipart: Multipart) -> Result<Upload, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.body_text()))?
    {
        if field.name() != Some(AUDIO_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or("recording.webm").to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;

        return Ok(Upload { data, file_name });
    }

    Err(ApiError::BadRequest(format!(
        "missing multipart field `{AUDIO_FIELD}`"
    )))
}

/// Transcribe uploaded audio
///
/// Engine failures and empty transcripts are answered with a canned
/// transcript flagged as fallback.
async fn speech_to_text(
    State(state): State<Arc<ApiState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<TranscribeResponse>, ApiError> {
    let multipart = multipart.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let upload = read_upload(multipart).await?;

    if upload.data.is_empty() {
        return Err(ApiError::BadRequest("empty audio data".to_string()));
    }

    tracing::debug!(bytes = upload.data.len(), file = %upload.file_name, "audio received");

    let clip = AudioClip {
        data: &upload.data,
        file_name: &upload.file_name,
    };

    let recognized = match &state.backends.stt {
        Some(engine) => match engine.transcribe(clip, &state.stt_language).await {
            Ok(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
            Ok(_) => {
                tracing::warn!(engine = engine.name(), "empty transcript, using fallback");
                None
            }
            Err(e) => {
                tracing::warn!(engine = engine.name(), error = %e, "transcription failed, using fallback");
                None
            }
        },
        None => {
            tracing::debug!("no speech recognizer configured, using fallback");
            None
        }
    };

    let response = match recognized {
        Some(text) => TranscribeResponse {
            ok: true,
            text,
            fallback: None,
        },
        None => TranscribeResponse {
            ok: true,
            text: state.responder.rng().fallback_transcript().to_string(),
            fallback: Some(true),
        },
    };

    Ok(Json(response))
}

/// Synthesis request
#[derive(Debug, Deserialize)]
pub struct SynthesizeRequest {
    pub text: String,
}

/// Synthesize text to speech
///
/// Always returns WAV; silence is substituted when no engine output is usable.
async fn text_to_speech(
    State(state): State<Arc<ApiState>>,
    payload: Result<Json<SynthesizeRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let text = request.text.trim();
    if text.is_empty() {
        return Err(ApiError::BadRequest("text must not be empty".to_string()));
    }

    let (source, audio) = synthesize_or_silence(state.backends.tts.as_deref(), text).await;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "audio/wav"),
            (header::CACHE_CONTROL, "no-cache"),
            (SPEECH_SOURCE_HEADER, source.as_str()),
        ],
        Bytes::from(audio),
    )
        .into_response())
}
