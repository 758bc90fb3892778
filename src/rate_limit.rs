//! In-memory rate limiting for assistant requests.
//!
//! DESIGN
//! ======
//! Sliding-window counters backed by `HashMap<Uuid, VecDeque<Instant>>`.
//! Three limits are enforced:
//! - Per-user: 10 AI requests/min
//! - Global: 30 LLM calls/min
//! - Token budget: 50k tokens/user/hour
//!
//! TRADE-OFFS
//! ==========
//! The token budget reserves an estimate before each call so concurrent
//! requests see each other's in-flight usage. Reservations are settled
//! against reported usage (or released) as soon as the call returns.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use uuid::Uuid;

const DEFAULT_PER_USER_LIMIT: usize = 10;
const DEFAULT_PER_USER_WINDOW_SECS: u64 = 60;

const DEFAULT_GLOBAL_LIMIT: usize = 30;
const DEFAULT_GLOBAL_WINDOW_SECS: u64 = 60;

const DEFAULT_TOKEN_BUDGET: u64 = 50_000;
const DEFAULT_TOKEN_WINDOW_SECS: u64 = 3600;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub per_user_limit: usize,
    pub per_user_window: Duration,
    pub global_limit: usize,
    pub global_window: Duration,
    pub token_budget: u64,
    pub token_window: Duration,
}

impl RateLimitConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            per_user_limit: env_parse("RATE_LIMIT_PER_USER", DEFAULT_PER_USER_LIMIT),
            per_user_window: Duration::from_secs(env_parse(
                "RATE_LIMIT_PER_USER_WINDOW_SECS",
                DEFAULT_PER_USER_WINDOW_SECS,
            )),
            global_limit: env_parse("RATE_LIMIT_GLOBAL", DEFAULT_GLOBAL_LIMIT),
            global_window: Duration::from_secs(env_parse("RATE_LIMIT_GLOBAL_WINDOW_SECS", DEFAULT_GLOBAL_WINDOW_SECS)),
            token_budget: env_parse("RATE_LIMIT_TOKEN_BUDGET", DEFAULT_TOKEN_BUDGET),
            token_window: Duration::from_secs(env_parse("RATE_LIMIT_TOKEN_WINDOW_SECS", DEFAULT_TOKEN_WINDOW_SECS)),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            per_user_limit: DEFAULT_PER_USER_LIMIT,
            per_user_window: Duration::from_secs(DEFAULT_PER_USER_WINDOW_SECS),
            global_limit: DEFAULT_GLOBAL_LIMIT,
            global_window: Duration::from_secs(DEFAULT_GLOBAL_WINDOW_SECS),
            token_budget: DEFAULT_TOKEN_BUDGET,
            token_window: Duration::from_secs(DEFAULT_TOKEN_WINDOW_SECS),
        }
    }
}

fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

// =============================================================================
// ERROR TYPE
// =============================================================================

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[allow(clippy::enum_variant_names)]
pub enum RateLimitError {
    #[error("per-user rate limit exceeded (max {limit} requests/{window_secs}s)")]
    PerUserExceeded { limit: usize, window_secs: u64 },
    #[error("global rate limit exceeded (max {limit} requests/{window_secs}s)")]
    GlobalExceeded { limit: usize, window_secs: u64 },
    #[error("token budget exceeded (max {budget} tokens/{window_secs}s)")]
    TokenBudgetExceeded { budget: u64, window_secs: u64 },
}

// =============================================================================
// RATE LIMITER
// =============================================================================

#[derive(Clone)]
pub struct RateLimiter {
    inner: Arc<Mutex<RateLimiterInner>>,
    config: RateLimitConfig,
}

#[derive(Default)]
struct RateLimiterInner {
    user_requests: HashMap<Uuid, VecDeque<Instant>>,
    global_requests: VecDeque<Instant>,
    /// Settled usage: (timestamp, tokens).
    user_tokens: HashMap<Uuid, VecDeque<(Instant, u64)>>,
    /// In-flight reservations: (timestamp, tokens).
    user_reservations: HashMap<Uuid, VecDeque<(Instant, u64)>>,
}

impl RateLimiter {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(RateLimitConfig::from_env())
    }

    #[must_use]
    pub fn with_config(config: RateLimitConfig) -> Self {
        Self { inner: Arc::new(Mutex::new(RateLimiterInner::default())), config }
    }

    #[must_use]
    pub fn config(&self) -> RateLimitConfig {
        self.config
    }

    /// Check both per-user and global request limits, then record the request.
    ///
    /// # Errors
    ///
    /// Returns the first limit that would be exceeded. Nothing is recorded
    /// on error.
    pub fn check_and_record(&self, user_id: Uuid) -> Result<(), RateLimitError> {
        self.check_and_record_at(user_id, Instant::now())
    }

    fn check_and_record_at(&self, user_id: Uuid, now: Instant) -> Result<(), RateLimitError> {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let cfg = self.config;

        prune_window(&mut inner.global_requests, now, cfg.global_window);
        if inner.global_requests.len() >= cfg.global_limit {
            return Err(RateLimitError::GlobalExceeded {
                limit: cfg.global_limit,
                window_secs: cfg.global_window.as_secs(),
            });
        }

        let user_deque = inner.user_requests.entry(user_id).or_default();
        prune_window(user_deque, now, cfg.per_user_window);
        if user_deque.len() >= cfg.per_user_limit {
            return Err(RateLimitError::PerUserExceeded {
                limit: cfg.per_user_limit,
                window_secs: cfg.per_user_window.as_secs(),
            });
        }

        user_deque.push_back(now);
        inner.global_requests.push_back(now);
        Ok(())
    }

    /// Reserve token budget before issuing an LLM call.
    ///
    /// # Errors
    ///
    /// Returns [`RateLimitError::TokenBudgetExceeded`] when settled usage plus
    /// outstanding reservations plus `tokens` would exceed the budget.
    pub fn reserve_tokens(&self, user_id: Uuid, tokens: u64) -> Result<(), RateLimitError> {
        self.reserve_tokens_at(user_id, tokens, Instant::now())
    }

    fn reserve_tokens_at(&self, user_id: Uuid, tokens: u64, now: Instant) -> Result<(), RateLimitError> {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let cfg = self.config;
        let exceeded = RateLimitError::TokenBudgetExceeded {
            budget: cfg.token_budget,
            window_secs: cfg.token_window.as_secs(),
        };

        let used = window_total(inner.user_tokens.entry(user_id).or_default(), now, cfg.token_window);
        let reserved = window_total(inner.user_reservations.entry(user_id).or_default(), now, cfg.token_window);
        let Some(projected) = used.checked_add(reserved).and_then(|n| n.checked_add(tokens)) else {
            return Err(exceeded);
        };
        // A zero reservation is a pure check: an exhausted budget still fails.
        let over = if tokens == 0 { projected >= cfg.token_budget } else { projected > cfg.token_budget };
        if over {
            return Err(exceeded);
        }
        if tokens > 0 {
            inner
                .user_reservations
                .entry(user_id)
                .or_default()
                .push_back((now, tokens));
        }
        Ok(())
    }

    /// Settle a reservation against the usage the provider reported.
    pub fn record_tokens(&self, user_id: Uuid, used: u64, reserved: u64) {
        self.record_tokens_at(user_id, used, reserved, Instant::now());
    }

    fn record_tokens_at(&self, user_id: Uuid, used: u64, reserved: u64, now: Instant) {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let window = self.config.token_window;
        let reservations = inner.user_reservations.entry(user_id).or_default();
        prune_token_window(reservations, now, window);
        consume_reserved_tokens(reservations, reserved);

        let usage = inner.user_tokens.entry(user_id).or_default();
        prune_token_window(usage, now, window);
        usage.push_back((now, used));
    }

    /// Release a reservation for a failed LLM call.
    pub fn release_tokens(&self, user_id: Uuid, reserved: u64) {
        self.release_tokens_at(user_id, reserved, Instant::now());
    }

    fn release_tokens_at(&self, user_id: Uuid, reserved: u64, now: Instant) {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let window = self.config.token_window;
        let reservations = inner.user_reservations.entry(user_id).or_default();
        prune_token_window(reservations, now, window);
        consume_reserved_tokens(reservations, reserved);
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// HELPERS
// =============================================================================

fn prune_window(deque: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    while let Some(&front) = deque.front() {
        if now.duration_since(front) > window {
            deque.pop_front();
        } else {
            break;
        }
    }
}

fn prune_token_window(deque: &mut VecDeque<(Instant, u64)>, now: Instant, window: Duration) {
    while let Some(&(front, _)) = deque.front() {
        if now.duration_since(front) > window {
            deque.pop_front();
        } else {
            break;
        }
    }
}

fn window_total(deque: &mut VecDeque<(Instant, u64)>, now: Instant, window: Duration) -> u64 {
    prune_token_window(deque, now, window);
    deque.iter().map(|(_, t)| t).sum()
}

fn consume_reserved_tokens(deque: &mut VecDeque<(Instant, u64)>, mut amount: u64) {
    while amount > 0 {
        let Some((_, front_tokens)) = deque.front_mut() else {
            break;
        };
        if *front_tokens <= amount {
            amount -= *front_tokens;
            deque.pop_front();
        } else {
            *front_tokens -= amount;
            break;
        }
    }
}

#[cfg(test)]
#[path = "rate_limit_test.rs"]
mod tests;
