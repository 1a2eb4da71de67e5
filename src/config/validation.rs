//! Configuration error types and validation helpers.

use std::net::IpAddr;

use thiserror::Error;

/// Configuration error types.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse YAML configuration.
    #[error("failed to parse YAML config: {0}")]
    ParseError(#[from] serde_yaml::Error),

    /// Configuration validation failed.
    #[error("config validation error: {0}")]
    ValidationError(String),
}

/// Validate a server bind address.
pub(crate) fn validate_bind_addr(bind: &str) -> Result<(), ConfigError> {
    bind.parse::<IpAddr>().map_err(|_| {
        ConfigError::ValidationError(format!("invalid server bind address: '{bind}'"))
    })?;
    Ok(())
}
