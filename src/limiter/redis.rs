//! Redis-backed sliding window limiter for multi-instance deployments.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{Client, Script};
use uuid::Uuid;

use super::{LimiterError, RateLimiter};

/// Sliding window over a Redis sorted set, one member per admitted request.
///
/// Trim, count and insert run inside one Lua script so concurrent gateways
/// see a consistent window.
pub struct RedisSlidingWindowLimiter {
    conn: ConnectionManager,
    script: Script,
    window: Duration,
    max_requests: u32,
}

impl RedisSlidingWindowLimiter {
    /// Connect to Redis and prepare the window script.
    pub async fn connect(url: &str, window: Duration, max_requests: u32) -> Result<Self, LimiterError> {
        let client = Client::open(url)?;
        let conn = client.get_connection_manager().await?;
        tracing::info!(url = %url, window_ms = window.as_millis() as u64, max_requests, "Redis rate limiter connected");
        Ok(Self::with_connection(conn, window, max_requests))
    }

    pub fn with_connection(conn: ConnectionManager, window: Duration, max_requests: u32) -> Self {
        Self {
            conn,
            script: window_script(),
            window,
            max_requests,
        }
    }
}

fn window_script() -> Script {
    Script::new(include_str!("slide_window.lua"))
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

fn decode_reply(reply: i64) -> Result<bool, LimiterError> {
    match reply {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(LimiterError::Protocol(format!("window script returned {}", other))),
    }
}

#[async_trait]
impl RateLimiter for RedisSlidingWindowLimiter {
    async fn limit(&self, key: &str) -> Result<bool, LimiterError> {
        let mut conn = self.conn.clone();
        let member = format!("{}-{}", now_millis(), Uuid::new_v4().simple());
        let reply: i64 = self
            .script
            .key(key)
            .arg(self.window.as_millis() as u64)
            .arg(self.max_requests)
            .arg(now_millis())
            .arg(member)
            .invoke_async(&mut conn)
            .await?;
        decode_reply(reply)
    }
}
