//! Structured logging.
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - `RUST_LOG` wins over the configured level when set

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when neither `RUST_LOG` nor a config level applies.
pub const DEFAULT_FILTER: &str = "gatekeeper=debug,tower_http=debug";

/// Build the env filter: `RUST_LOG`, else `log_level` for this crate, else the default.
pub fn env_filter(log_level: Option<&str>) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| match log_level {
        Some(level) => format!("gatekeeper={level},tower_http={level}").into(),
        None => DEFAULT_FILTER.into(),
    })
}

/// Install the global tracing subscriber.
pub fn init_tracing(log_level: Option<&str>) {
    tracing_subscriber::registry()
        .with(env_filter(log_level))
        .with(tracing_subscriber::fmt::layer())
        .init();
}
