//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! It holds the database pool (the repository handle every store operation
//! takes), the optional LLM client, and the in-memory rate limiter.

use std::sync::Arc;

use sqlx::PgPool;

use crate::llm::LlmChat;
use crate::rate_limit::RateLimiter;

/// Clone is required by Axum; every field is cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    /// `None` if LLM env vars are not configured.
    pub llm: Option<Arc<dyn LlmChat>>,
    pub rate_limiter: RateLimiter,
}

impl AppState {
    #[must_use]
    pub fn new(pool: PgPool, llm: Option<Arc<dyn LlmChat>>) -> Self {
        Self { pool, llm, rate_limiter: RateLimiter::new() }
    }

    #[must_use]
    pub fn with_rate_limiter(mut self, rate_limiter: RateLimiter) -> Self {
        self.rate_limiter = rate_limiter;
        self
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
