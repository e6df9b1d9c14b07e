//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (windows > 0, thresholds below lifetimes)
//! - Reject unusable credential material
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use crate::config::loader::SIGNING_KEY_ENV;
use crate::config::schema::{AuthMode, GatewayConfig, RateLimitBackend};

/// Upper bound for any configured duration, in seconds (one year).
const MAX_DURATION_SECS: u64 = 365 * 24 * 60 * 60;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Check a parsed configuration for semantic errors.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be > 0"));
    }

    for path in &config.auth.allowlist {
        if !path.starts_with('/') {
            errors.push(ValidationError::new(
                "auth.allowlist",
                format!("'{}' must start with '/'", path),
            ));
        }
    }

    if config.auth.mode == AuthMode::Token {
        let key = config.token.signing_key.trim();
        if key.is_empty() {
            errors.push(ValidationError::new(
                "token.signing_key",
                format!("must be set in token mode (config or {})", SIGNING_KEY_ENV),
            ));
        } else if key.to_ascii_uppercase().starts_with("CHANGE_ME") {
            errors.push(ValidationError::new("token.signing_key", "placeholder key is not allowed"));
        }
    }
    if config.token.extension_secs == 0 || config.token.extension_secs > MAX_DURATION_SECS {
        errors.push(ValidationError::new(
            "token.extension_secs",
            format!("must be within 1..={}", MAX_DURATION_SECS),
        ));
    }
    if config.token.refresh_threshold_secs >= config.token.extension_secs {
        errors.push(ValidationError::new(
            "token.refresh_threshold_secs",
            "must be below token.extension_secs",
        ));
    }

    if config.session.cookie_name.is_empty() {
        errors.push(ValidationError::new("session.cookie_name", "must not be empty"));
    }
    if config.session.max_age_secs == 0 || config.session.max_age_secs > MAX_DURATION_SECS {
        errors.push(ValidationError::new(
            "session.max_age_secs",
            format!("must be within 1..={}", MAX_DURATION_SECS),
        ));
    }
    if config.session.refresh_threshold_secs > MAX_DURATION_SECS {
        errors.push(ValidationError::new(
            "session.refresh_threshold_secs",
            format!("must be at most {}", MAX_DURATION_SECS),
        ));
    }
    if config.session.sweep_interval_secs == 0 {
        errors.push(ValidationError::new("session.sweep_interval_secs", "must be > 0"));
    }

    if config.rate_limit.enabled {
        if config.rate_limit.window_ms == 0 {
            errors.push(ValidationError::new("rate_limit.window_ms", "must be > 0"));
        }
        if config.rate_limit.max_requests == 0 {
            errors.push(ValidationError::new("rate_limit.max_requests", "must be > 0"));
        }
        if config.rate_limit.prefix.is_empty() {
            errors.push(ValidationError::new("rate_limit.prefix", "must not be empty"));
        }
        if config.rate_limit.backend == RateLimitBackend::Redis
            && !config.rate_limit.redis_url.starts_with("redis")
        {
            errors.push(ValidationError::new(
                "rate_limit.redis_url",
                "must be a redis:// or rediss:// URL",
            ));
        }
    }

    if !(4..=31).contains(&config.users.bcrypt_cost) {
        errors.push(ValidationError::new("users.bcrypt_cost", "must be within 4..=31"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
