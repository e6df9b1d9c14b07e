//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → HttpServer::new builds every subsystem from it
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no hot reload, the signing
//!   key and allowlist never change under a running pipeline
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_or_default, ConfigError, SIGNING_KEY_ENV};
pub use schema::AuthConfig;
pub use schema::AuthMode;
pub use schema::GatewayConfig;
pub use schema::ObservabilityConfig;
pub use schema::RateLimitBackend;
pub use schema::RateLimitConfig;
pub use schema::SessionConfig;
pub use schema::TokenConfig;
