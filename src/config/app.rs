//! Application configuration structures.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::probe::ProbeConfig;

use super::validation::{ConfigError, validate_bind_addr};

/// Web server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server bind address (default: "0.0.0.0").
    pub bind: String,

    /// Server port (default: 8080).
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Web server configuration.
    pub server: ServerConfig,

    /// Default probe parameters applied to validation requests.
    pub probe: ProbeConfig,

    /// Path to the infrastructure metadata JSON file.
    pub infrastructure_file: Option<String>,
}

impl AppConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    /// Returns `ConfigError` if the file cannot be read, parsed, or validated.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration, falling back to defaults when the file is absent.
    ///
    /// The service runs without a config file; a missing path is logged and
    /// the built-in defaults apply.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            tracing::warn!(path = %path.display(), "Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Validate configuration values.
    ///
    /// # Errors
    /// Returns `ConfigError::ValidationError` if any field is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_bind_addr(&self.server.bind)?;

        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "server port must be non-zero".to_string(),
            ));
        }

        if self.probe.count == 0 {
            return Err(ConfigError::ValidationError(
                "probe count must be positive".to_string(),
            ));
        }

        if self.probe.timeout == Duration::ZERO {
            return Err(ConfigError::ValidationError(
                "probe timeout must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_server_config_default() {
        let config = ServerConfig::default();
        assert_eq!(config.bind, "0.0.0.0");
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_app_config_default_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.probe.count, 3);
        assert_eq!(config.probe.timeout, Duration::from_secs(5));
        assert!(config.infrastructure_file.is_none());
    }

    #[test]
    fn test_config_validation_invalid_port() {
        let config = AppConfig {
            server: ServerConfig {
                bind: "0.0.0.0".to_string(),
                port: 0,
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_invalid_bind_address() {
        let config = AppConfig {
            server: ServerConfig {
                bind: "not-an-ip".to_string(),
                port: 8080,
            },
            ..Default::default()
        };

        let result = config.validate();
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("invalid server bind address")
        );
    }

    #[test]
    fn test_config_validation_zero_count() {
        let config = AppConfig {
            probe: ProbeConfig::default().with_count(0),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("probe count"));
    }

    #[test]
    fn test_config_validation_zero_timeout() {
        let config = AppConfig {
            probe: ProbeConfig::default().with_timeout(Duration::ZERO),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("probe timeout"));
    }

    #[test]
    fn test_load_from_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "server:\n  bind: \"127.0.0.1\"\n  port: 9090\nprobe:\n  count: 2\n  timeout: 3s\ninfrastructure_file: \"/opt/envprobe/infrastructure.json\"\n"
        )
        .unwrap();

        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.server.bind, "127.0.0.1");
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.probe.count, 2);
        assert_eq!(config.probe.timeout, Duration::from_secs(3));
        assert_eq!(
            config.infrastructure_file.as_deref(),
            Some("/opt/envprobe/infrastructure.json")
        );
    }

    #[test]
    fn test_yaml_round_trip() {
        let config = AppConfig {
            server: ServerConfig {
                bind: "127.0.0.1".to_string(),
                port: 9090,
            },
            probe: ProbeConfig::default()
                .with_count(2)
                .with_timeout(Duration::from_secs(3))
                .with_grace(Duration::from_secs(1)),
            infrastructure_file: Some("/opt/envprobe/infrastructure.json".to_string()),
        };

        let yaml = serde_yaml::to_string(&config).unwrap();
        let reparsed: AppConfig = serde_yaml::from_str(&yaml).unwrap();

        assert_eq!(reparsed.server.bind, config.server.bind);
        assert_eq!(reparsed.server.port, config.server.port);
        assert_eq!(reparsed.probe.count, config.probe.count);
        assert_eq!(reparsed.probe.timeout, config.probe.timeout);
        assert_eq!(reparsed.probe.grace, config.probe.grace);
        assert_eq!(reparsed.infrastructure_file, config.infrastructure_file);
    }

    #[test]
    fn test_load_missing_file_errors() {
        assert!(matches!(
            AppConfig::load("/nonexistent/config.yaml"),
            Err(ConfigError::IoError(_))
        ));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = AppConfig::load_or_default("/nonexistent/config.yaml").unwrap();
        assert_eq!(config.server.port, 8080);
    }
}
