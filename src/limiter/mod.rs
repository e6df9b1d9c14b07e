//! Request-rate limiters.
//!
//! # Data Flow
//! ```text
//! AdmissionGuard
//!     → RateLimiter::limit("<prefix>:<client address>")
//!         → memory.rs (per-process sliding window, DashMap)
//!         → redis.rs  (shared sliding window, atomic Lua script)
//!     ← limited: bool | LimiterError
//! ```
//!
//! # Design Decisions
//! - The limiter owns all windowing state; callers only ask "is this key over
//!   budget", the ask itself counts as a request
//! - One backend round trip per call, no retries here
//! - Implementations are shared behind `Arc<dyn RateLimiter>` and must be
//!   safe for concurrent calls on the same key

pub mod memory;
pub mod redis;

use async_trait::async_trait;

pub use self::memory::SlidingWindowLimiter;
pub use self::redis::RedisSlidingWindowLimiter;

/// Failure of the rate-limit backend itself (not a limit decision).
#[derive(Debug, thiserror::Error)]
pub enum LimiterError {
    #[error("rate limit backend unreachable: {0}")]
    Backend(#[from] ::redis::RedisError),
    #[error("rate limit backend returned an unexpected reply: {0}")]
    Protocol(String),
}

/// Decides whether a client key has exceeded its request budget.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Record one request for `key` and report whether it is over budget.
    ///
    /// Returns `Ok(true)` when the request must be rejected.
    async fn limit(&self, key: &str) -> Result<bool, LimiterError>;
}
