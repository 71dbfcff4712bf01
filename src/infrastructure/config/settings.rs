//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all settings.
//! Configuration is loaded from a TOML file; the platform service key comes
//! from the `PLATFORM_SERVICE_KEY` environment variable only.
//!
//! # Example
//!
//! ```no_run
//! use dualstore::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::path::Path;

use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use super::logging::{LoggingConfig, FORMATS};
use super::resilience::{BreakerConfig, CoordinatorConfig};
use super::storage::RelationalConfig;
use crate::adapter::outbound::platform::{PlatformConfig, SERVICE_KEY_ENV};
use crate::application::{BreakerPolicy, CoordinatorOptions, DEFAULT_SERVICE};
use crate::error::{ConfigError, Result};

/// Main application configuration.
///
/// Every section is optional; an empty file yields the defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Logical service name; selects the breaker pair used by the CLI.
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Logging and tracing configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Circuit breaker thresholds shared by every breaker.
    #[serde(default)]
    pub breaker: BreakerConfig,

    /// Coordinator timeouts.
    #[serde(default)]
    pub coordinator: CoordinatorConfig,

    /// Relational store (SQLite) settings.
    #[serde(default)]
    pub relational: RelationalConfig,

    /// Platform store settings.
    #[serde(default)]
    pub platform: PlatformConfig,

    /// Platform service key, loaded from the environment.
    #[serde(skip)]
    pub platform_service_key: Option<String>,
}

fn default_service_name() -> String {
    DEFAULT_SERVICE.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            logging: LoggingConfig::default(),
            breaker: BreakerConfig::default(),
            coordinator: CoordinatorConfig::default(),
            relational: RelationalConfig::default(),
            platform: PlatformConfig::default(),
            platform_service_key: None,
        }
    }
}

impl Config {
    /// Parse configuration from TOML content.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or validation fails.
    #[allow(clippy::result_large_err)]
    pub fn parse_toml(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;

        // Never from the config file.
        config.platform_service_key = std::env::var(SERVICE_KEY_ENV)
            .ok()
            .filter(|key| !key.trim().is_empty());

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsing fails.
    #[allow(clippy::result_large_err)]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Validate configuration values.
    #[allow(clippy::result_large_err)]
    pub fn validate(&self) -> Result<()> {
        if self.service_name.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "service_name",
            }
            .into());
        }
        if !FORMATS.contains(&self.logging.format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "format",
                reason: format!("must be one of {}", FORMATS.join(", ")),
            }
            .into());
        }
        if let Err(err) = EnvFilter::try_new(&self.logging.level) {
            return Err(ConfigError::InvalidValue {
                field: "level",
                reason: err.to_string(),
            }
            .into());
        }

        if self.breaker.failure_threshold == 0 {
            return Err(ConfigError::InvalidValue {
                field: "failure_threshold",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.breaker.open_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "open_timeout_ms",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.coordinator.write_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "write_timeout_ms",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }

        if self.relational.database.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "database" }.into());
        }

        if self.platform.enabled {
            let url = url::Url::parse(&self.platform.url).map_err(|e| {
                ConfigError::InvalidValue {
                    field: "url",
                    reason: e.to_string(),
                }
            })?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(ConfigError::InvalidValue {
                    field: "url",
                    reason: "must be an http or https URL".to_string(),
                }
                .into());
            }
            if self.platform.timeout_ms == 0 {
                return Err(ConfigError::InvalidValue {
                    field: "timeout_ms",
                    reason: "must be greater than 0".to_string(),
                }
                .into());
            }
        }

        Ok(())
    }

    /// Initialize the tracing subscriber from `[logging]`.
    pub fn init_logging(&self) {
        self.logging.init();
    }

    #[must_use]
    pub fn breaker_policy(&self) -> BreakerPolicy {
        self.breaker.into()
    }

    #[must_use]
    pub fn coordinator_options(&self) -> CoordinatorOptions {
        self.coordinator.options(self.platform.enabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn empty_config_uses_defaults() {
        let config = Config::parse_toml("").unwrap();
        assert_eq!(config.service_name, "default");
        assert_eq!(config.logging.format, "pretty");
        assert_eq!(config.breaker_policy(), BreakerPolicy::default());
        assert_eq!(config.coordinator_options().write_timeout, Duration::from_secs(10));
        assert_eq!(config.relational.database, "dualstore.db");
        assert!(config.platform.enabled);
    }

    #[test]
    fn disabled_platform_skips_url_checks() {
        let config = Config::parse_toml(
            r#"
[platform]
enabled = false
url = "not a url"
"#,
        )
        .unwrap();
        assert!(!config.coordinator_options().platform_enabled);
    }

    #[test]
    fn rejects_unknown_log_format() {
        let err = Config::parse_toml("[logging]\nformat = \"xml\"").unwrap_err();
        assert!(err.to_string().contains("format"));
    }
}
