//! HTTP API server for the companion gateway

pub mod chat;
mod error;
pub mod health;
pub mod rate_limit;
pub mod voice;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use error::ApiError;

use crate::backends::Backends;
use crate::companion::{PersonaSettings, Randomness, Responder};
use crate::config::Config;
use crate::Result;

/// Largest accepted request body (audio uploads)
pub const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Shared state for API handlers
pub struct ApiState {
    pub backends: Backends,
    pub responder: Responder,
    /// Language passed to speech recognition
    pub stt_language: String,
    pub request_budget: Option<rate_limit::RequestBudget>,
}

/// Configuration for building an API server
pub struct ApiServerBuilder {
    backends: Backends,
    persona: PersonaSettings,
    sampling: crate::llm::Sampling,
    history_limit: usize,
    stt_language: String,
    host: String,
    port: u16,
    cors_origins: Vec<String>,
    rate_limit_per_minute: Option<u32>,
    randomness: Randomness,
}

impl ApiServerBuilder {
    /// Create a builder from configuration and constructed backends
    #[must_use]
    pub fn new(config: &Config, backends: Backends) -> Self {
        Self {
            backends,
            persona: config.persona.clone(),
            sampling: config.llm.sampling,
            history_limit: config.llm.history_limit,
            stt_language: config.stt.language.clone(),
            host: config.server.host.clone(),
            port: config.server.port,
            cors_origins: config.server.cors_origins.clone(),
            rate_limit_per_minute: config.server.rate_limit_per_minute,
            randomness: Randomness::default(),
        }
    }

    /// Inject the randomness source used for fallbacks
    #[must_use]
    pub fn randomness(mut self, randomness: Randomness) -> Self {
        self.randomness = randomness;
        self
    }

    /// Build the API server
    #[must_use]
    pub fn build(self) -> ApiServer {
        let responder = Responder::new(self.backends.llm.clone(), self.persona)
            .sampling(self.sampling)
            .history_limit(self.history_limit)
            .randomness(self.randomness);

        let request_budget = self
            .rate_limit_per_minute
            .map(rate_limit::RequestBudget::per_minute);

        let state = Arc::new(ApiState {
            backends: self.backends,
            responder,
            stt_language: self.stt_language,
            request_budget,
        });

        ApiServer {
            state,
            host: self.host,
            port: self.port,
            cors_origins: self.cors_origins,
        }
    }
}

/// API server
pub struct ApiServer {
    state: Arc<ApiState>,
    host: String,
    port: u16,
    cors_origins: Vec<String>,
}

impl ApiServer {
    /// Shared handler state
    #[must_use]
    pub fn state(&self) -> Arc<ApiState> {
        self.state.clone()
    }

    /// Build the router with all routes
    #[must_use]
    pub fn router(&self) -> Router {
        let router = Router::new()
            .merge(health::router(self.state.clone()))
            .merge(chat::router(self.state.clone()))
            .merge(voice::router(self.state.clone()))
            .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES));

        let router = router.layer(axum::middleware::from_fn_with_state(
            self.state.clone(),
            rate_limit::enforce,
        ));

        router.layer(self.cors()).layer(TraceLayer::new_for_http())
    }

    /// CORS layer for the configured frontend origins
    fn cors(&self) -> CorsLayer {
        let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);

        if self.cors_origins.iter().any(|o| o == "*") {
            return cors.allow_origin(Any);
        }

        let origins: Vec<HeaderValue> = self
            .cors_origins
            .iter()
            .filter_map(|o| match HeaderValue::from_str(o) {
                Ok(v) => Some(v),
                Err(e) => {
                    tracing::warn!(origin = %o, error = %e, "ignoring invalid CORS origin");
                    None
                }
            })
            .collect();

        cors.allow_origin(AllowOrigin::list(origins))
    }

    /// Run the API server
    ///
    /// # Errors
    ///
    /// Returns error if server fails to bind or run
    pub async fn run(self) -> Result<()> {
        let addr = format!("{}:{}", self.host, self.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| crate::Error::Config(format!("failed to bind API server: {e}")))?;

        tracing::info!(addr = %addr, "API server listening");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| crate::Error::Config(format!("API server error: {e}")))?;

        tracing::info!("API server stopped");
        Ok(())
    }
}

/// Resolve on Ctrl-C
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
