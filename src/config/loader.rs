//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Environment variable that overrides `token.signing_key`.
pub const SIGNING_KEY_ENV: &str = "GATEKEEPER_SIGNING_KEY";

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Load `path` if given, else start from defaults. Either way the
/// environment overrides are applied and the result is validated.
pub fn load_or_default(path: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    let config = match path {
        Some(path) => toml::from_str(&fs::read_to_string(path)?)?,
        None => GatewayConfig::default(),
    };
    finish(config, std::env::var(SIGNING_KEY_ENV).ok())
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<GatewayConfig, ConfigError> {
    let config: GatewayConfig = toml::from_str(content)?;
    finish(config, std::env::var(SIGNING_KEY_ENV).ok())
}

fn finish(mut config: GatewayConfig, signing_key: Option<String>) -> Result<GatewayConfig, ConfigError> {
    if let Some(key) = signing_key.filter(|k| !k.is_empty()) {
        config.token.signing_key = key;
    }

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}
