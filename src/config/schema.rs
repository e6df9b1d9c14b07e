//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Which authenticator guards the pipeline, and which paths skip it.
    pub auth: AuthConfig,

    /// Signed bearer token settings.
    pub token: TokenConfig,

    /// Server-side session settings.
    pub session: SessionConfig,

    /// Rate limiting configuration.
    pub rate_limit: RateLimitConfig,

    /// User account glue.
    pub users: UsersConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8081").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8081".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// The credential flavour a deployment runs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    /// Cookie-held session id resolved against a server-side store.
    Session,
    /// Self-contained signed token in the `Authorization` header.
    Token,
}

/// Authentication configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Active authenticator. Exactly one runs per deployment.
    pub mode: AuthMode,

    /// Paths reachable without any credential (exact match).
    pub allowlist: Vec<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            mode: AuthMode::Token,
            allowlist: vec!["/user/login".to_string(), "/user/signup".to_string()],
        }
    }
}

/// Signed token configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TokenConfig {
    /// HMAC signing key material. Empty by default; token mode refuses to
    /// start until one is configured.
    pub signing_key: String,

    /// Tokens with less validity than this left are reissued.
    pub refresh_threshold_secs: u64,

    /// Lifetime of a freshly issued or reissued token.
    pub extension_secs: u64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            signing_key: String::new(),
            refresh_threshold_secs: 300,
            extension_secs: 1800,
        }
    }
}

impl TokenConfig {
    pub fn refresh_threshold(&self) -> Duration {
        Duration::from_secs(self.refresh_threshold_secs)
    }

    pub fn extension(&self) -> Duration {
        Duration::from_secs(self.extension_secs)
    }
}

/// Session configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Name of the cookie carrying the session id.
    pub cookie_name: String,

    /// Minimum spacing between last-activity writes for one session.
    pub refresh_threshold_secs: u64,

    /// Idle lifetime of a session in the store and of its cookie.
    pub max_age_secs: u64,

    /// How often expired sessions are swept from the in-memory store.
    pub sweep_interval_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "ssid".to_string(),
            refresh_threshold_secs: 60,
            max_age_secs: 15 * 60,
            sweep_interval_secs: 60,
        }
    }
}

impl SessionConfig {
    pub fn refresh_threshold(&self) -> Duration {
        Duration::from_secs(self.refresh_threshold_secs)
    }

    pub fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age_secs)
    }
}

/// Rate limit backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RateLimitBackend {
    /// Per-process sliding window. Only correct for a single instance.
    Memory,
    /// Shared sliding window in Redis.
    Redis,
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Enable rate limiting.
    pub enabled: bool,

    /// Backing store for request windows.
    pub backend: RateLimitBackend,

    /// Redis connection URL (used when `backend = "redis"`).
    pub redis_url: String,

    /// Length of the trailing window in milliseconds.
    pub window_ms: u64,

    /// Requests admitted per client within one window.
    pub max_requests: u32,

    /// Namespace prepended to the client address in limiter keys.
    pub prefix: String,

    /// Take the client address from `X-Forwarded-For` instead of the socket.
    pub trust_forwarded_for: bool,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            backend: RateLimitBackend::Memory,
            redis_url: "redis://127.0.0.1:6379".to_string(),
            window_ms: 1000,
            max_requests: 100,
            prefix: "ip-limiter".to_string(),
            trust_forwarded_for: false,
        }
    }
}

impl RateLimitConfig {
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }
}

/// User account glue configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UsersConfig {
    /// bcrypt work factor for stored password hashes.
    pub bcrypt_cost: u32,
}

impl Default for UsersConfig {
    fn default() -> Self {
        Self {
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
