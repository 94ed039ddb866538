//! API error responses

use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Errors surfaced to API clients
///
/// Backend failures never end up here; they degrade to fallback content.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    TooManyRequests { retry_after_secs: u64 },
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, retry_after) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            Self::TooManyRequests { retry_after_secs } => (
                StatusCode::TOO_MANY_REQUESTS,
                "rate_limited",
                format!("too many requests, retry in {retry_after_secs}s"),
                Some(retry_after_secs),
            ),
        };

        tracing::debug!(code, message = %message, "rejecting request");

        let body = Json(ErrorResponse {
            error: ErrorBody { code, message },
        });

        match retry_after {
            Some(secs) => (status, [(header::RETRY_AFTER, secs.to_string())], body).into_response(),
            None => (status, body).into_response(),
        }
    }
}
