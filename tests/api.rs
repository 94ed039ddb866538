//! API endpoint integration tests

use std::io::Cursor;
use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use companion_gateway::companion::Mood;
use companion_gateway::companion::fallback::{FALLBACK_TRANSCRIPTS, render_reply, reply_table};
use companion_gateway::voice::silence;
use companion_gateway::Backends;
use serde_json::json;
use tower::ServiceExt;

mod common;
use common::{
    BrokenRecognizer, FixedChat, FixedRecognizer, Mp3Synthesizer, ToneSynthesizer,
    UnreachableChat, body_json, build_test_router, chat_backends, json_request,
    multipart_request, no_backends,
};

fn fallback_replies(mood: Mood, name: &str) -> Vec<String> {
    reply_table(mood)
        .iter()
        .map(|t| render_reply(t, name))
        .collect()
}

#[tokio::test]
async fn test_root_endpoint() {
    let app = build_test_router(no_backends());

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["message"].as_str().unwrap().contains("Yuki"));
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = build_test_router(no_backends());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(json["stt"], false);
    assert_eq!(json["tts"], false);
    assert_eq!(json["llm"], false);
}

#[tokio::test]
async fn test_health_reports_configured_backends() {
    let backends = Backends {
        stt: Some(Arc::new(FixedRecognizer("hola"))),
        tts: None,
        llm: Some(Arc::new(FixedChat("hola"))),
    };
    let app = build_test_router(backends);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let json = body_json(response).await;
    assert_eq!(json["stt"], true);
    assert_eq!(json["tts"], false);
    assert_eq!(json["llm"], true);
}

#[tokio::test]
async fn test_chat_returns_model_reply() {
    let app = build_test_router(chat_backends(Arc::new(FixedChat("¡Hola, cariño! 💕"))));

    let response = app
        .oneshot(json_request("/chat", &json!({"message": "hola, te quiero"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["response"], "¡Hola, cariño! 💕");
    assert_eq!(json["emotion"], "love");
    assert_eq!(json["updated_memory"]["relationshipLevel"], 5);
}

#[tokio::test]
async fn test_chat_learns_user_name() {
    let app = build_test_router(chat_backends(Arc::new(FixedChat("¡Encantada!"))));

    let response = app
        .oneshot(json_request(
            "/chat",
            &json!({"message": "me llamo Carlos", "memory": {}}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["updated_memory"]["userName"], "Carlos");
    assert_eq!(json["updated_memory"]["relationshipLevel"], 10);
}

#[tokio::test]
async fn test_chat_insult_raises_annoyance() {
    let app = build_test_router(no_backends());

    let response = app
        .oneshot(json_request(
            "/chat",
            &json!({
                "message": "eres una idiota",
                "memory": {"annoyanceLevel": 60, "relationshipLevel": 20}
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["emotion"], "angry");
    assert_eq!(json["updated_memory"]["annoyanceLevel"], 80);

    let reply = json["response"].as_str().unwrap().to_string();
    assert!(fallback_replies(Mood::Furious, "amor").contains(&reply));
}

#[tokio::test]
async fn test_chat_backend_failure_falls_back() {
    let app = build_test_router(chat_backends(Arc::new(UnreachableChat)));

    let response = app
        .oneshot(json_request(
            "/chat",
            &json!({
                "message": "¿qué tal tu día?",
                "memory": {"userName": "Ana", "relationshipLevel": 90}
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let reply = json["response"].as_str().unwrap().to_string();
    assert!(!reply.is_empty());
    assert!(fallback_replies(Mood::Smitten, "Ana").contains(&reply));
}

#[tokio::test]
async fn test_chat_tolerates_stale_memory_fields() {
    let app = build_test_router(no_backends());

    let response = app
        .clone()
        .oneshot(json_request(
            "/chat",
            &json!({
                "message": "hola",
                "memory": {"relationshipLevel": 20, "lastEmotion": "sad"}
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["updated_memory"]["relationshipLevel"], 20);
    assert_eq!(json["updated_memory"]["lastEmotion"], "neutral");

    let response = app
        .oneshot(json_request(
            "/chat",
            &json!({
                "message": "hablemos de anime",
                "memory": {"userName": null, "topics": null}
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["updated_memory"]["topics"], json!(["anime"]));
    assert!(json["updated_memory"]["userName"].is_null());
}

#[tokio::test]
async fn test_chat_accepts_history() {
    let app = build_test_router(chat_backends(Arc::new(FixedChat("sí"))));

    let response = app
        .oneshot(json_request(
            "/chat",
            &json!({
                "message": "¿te acuerdas?",
                "conversation_history": [
                    {"role": "user", "content": "me gusta el anime"},
                    {"role": "assistant", "content": "¡A mí también!"},
                    {"role": "narrator", "content": "ignored"}
                ]
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_chat_rejects_empty_message() {
    let app = build_test_router(no_backends());

    let response = app
        .oneshot(json_request("/chat", &json!({"message": "   "})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "bad_request");
}

#[tokio::test]
async fn test_chat_rejects_malformed_body() {
    let app = build_test_router(no_backends());

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/chat")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_speech_to_text_uses_engine() {
    let backends = Backends {
        stt: Some(Arc::new(FixedRecognizer("  hola Yuki  "))),
        ..Backends::default()
    };
    let app = build_test_router(backends);

    let response = app
        .oneshot(multipart_request(
            "/speech-to-text",
            "audio",
            "clip.webm",
            b"fake webm bytes",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["ok"], true);
    assert_eq!(json["text"], "hola Yuki");
    assert!(json.get("fallback").is_none());
}

#[tokio::test]
async fn test_speech_to_text_engine_failure_falls_back() {
    let backends = Backends {
        stt: Some(Arc::new(BrokenRecognizer)),
        ..Backends::default()
    };
    let app = build_test_router(backends);

    let response = app
        .oneshot(multipart_request(
            "/speech-to-text",
            "audio",
            "clip.webm",
            b"fake webm bytes",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["ok"], true);
    assert_eq!(json["fallback"], true);
    let text = json["text"].as_str().unwrap();
    assert!(FALLBACK_TRANSCRIPTS.contains(&text));
}

#[tokio::test]
async fn test_speech_to_text_empty_transcript_falls_back() {
    let backends = Backends {
        stt: Some(Arc::new(FixedRecognizer("   "))),
        ..Backends::default()
    };
    let app = build_test_router(backends);

    let response = app
        .oneshot(multipart_request(
            "/speech-to-text",
            "audio",
            "clip.wav",
            b"fake wav bytes",
        ))
        .await
        .unwrap();

    let json = body_json(response).await;
    assert_eq!(json["fallback"], true);
    assert!(!json["text"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_speech_to_text_rejects_empty_audio() {
    let app = build_test_router(no_backends());

    let response = app
        .oneshot(multipart_request("/speech-to-text", "audio", "clip.webm", b""))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_speech_to_text_requires_audio_field() {
    let app = build_test_router(no_backends());

    let response = app
        .oneshot(multipart_request("/speech-to-text", "file", "clip.webm", b"data"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_text_to_speech_uses_engine() {
    let backends = Backends {
        tts: Some(Arc::new(ToneSynthesizer)),
        ..Backends::default()
    };
    let app = build_test_router(backends);

    let response = app
        .oneshot(json_request("/text-to-speech", &json!({"text": "¡Hola!"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "audio/wav");
    assert_eq!(response.headers()["x-speech-source"], "engine");

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(body.as_ref(), silence(500, 22_050).unwrap().as_slice());
}

#[tokio::test]
async fn test_text_to_speech_without_engine_returns_silence() {
    let app = build_test_router(no_backends());

    let response = app
        .oneshot(json_request("/text-to-speech", &json!({"text": "¡Hola!"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-speech-source"], "fallback");
    assert_eq!(response.headers()["cache-control"], "no-cache");

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert!(!body.is_empty());

    let reader = hound::WavReader::new(Cursor::new(body.to_vec())).unwrap();
    assert_eq!(reader.spec().channels, 1);
}

#[tokio::test]
async fn test_text_to_speech_replaces_non_wav_output() {
    let backends = Backends {
        tts: Some(Arc::new(Mp3Synthesizer)),
        ..Backends::default()
    };
    let app = build_test_router(backends);

    let response = app
        .oneshot(json_request("/text-to-speech", &json!({"text": "hola"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-speech-source"], "fallback");

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert!(hound::WavReader::new(Cursor::new(body.to_vec())).is_ok());
}

#[tokio::test]
async fn test_text_to_speech_rejects_empty_text() {
    let app = build_test_router(no_backends());

    let response = app
        .oneshot(json_request("/text-to-speech", &json!({"text": ""})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_cors_allows_frontend_origin() {
    let app = build_test_router(no_backends());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("origin", "http://localhost:3000")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "http://localhost:3000"
    );
}

#[tokio::test]
async fn test_rate_limit_rejects_burst() {
    let mut config = companion_gateway::Config::default();
    config.server.rate_limit_per_minute = Some(1);
    let app = companion_gateway::ApiServerBuilder::new(&config, no_backends())
        .build()
        .router();

    let health = || Request::builder().uri("/health").body(Body::empty()).unwrap();

    let first = app.clone().oneshot(health()).await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let second = app.oneshot(health()).await.unwrap();
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(second.headers()["retry-after"], "60");

    let json = body_json(second).await;
    assert_eq!(json["error"]["code"], "rate_limited");
    assert!(json["error"]["message"].as_str().unwrap().contains("60s"));
}
