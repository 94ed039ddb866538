//! Optional global request budget

use std::num::NonZeroU32;
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use governor::{Quota, RateLimiter, clock::DefaultClock, state::InMemoryState, state::NotKeyed};

use super::{ApiError, ApiState};

/// Requests allowed per minute across all clients
pub struct RequestBudget {
    limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
    retry_after_secs: u64,
}

impl RequestBudget {
    /// Budget of `requests` per minute, refilled evenly; zero is treated as one
    #[must_use]
    pub fn per_minute(requests: u32) -> Self {
        let rpm = NonZeroU32::new(requests).unwrap_or(NonZeroU32::MIN);
        Self {
            limiter: RateLimiter::direct(Quota::per_minute(rpm)),
            retry_after_secs: 60u64.div_ceil(u64::from(rpm.get())),
        }
    }

    /// Take one request from the budget
    ///
    /// # Errors
    ///
    /// Returns `ApiError::TooManyRequests` when the budget is spent
    pub fn try_acquire(&self) -> Result<(), ApiError> {
        self.limiter
            .check()
            .map_err(|_| ApiError::TooManyRequests {
                retry_after_secs: self.retry_after_secs,
            })
    }
}

/// Reject requests beyond the configured budget
pub async fn enforce(
    State(state): State<Arc<ApiState>>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if let Some(budget) = &state.request_budget {
        if let Err(e) = budget.try_acquire() {
            tracing::warn!(path = %req.uri().path(), "request budget exhausted");
            return Err(e);
        }
    }
    Ok(next.run(req).await)
}
