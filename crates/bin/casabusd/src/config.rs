//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `casabusd.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use serde::Deserialize;

use casabus_adapter_bus_tcp::BusConfig;
use casabus_domain::catalog::{Catalog, CatalogError};

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Controller connection and timing settings.
    pub bus: BusConfig,
    /// Event pipeline settings.
    pub pipeline: PipelineConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// The device catalog.
    pub catalog: Catalog,
}

/// Event pipeline configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Bounded queue capacity. Producers suspend when full.
    pub capacity: usize,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from `casabusd.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if
    /// the resulting configuration fails validation.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("casabusd.toml")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("CASABUS_HOST") {
            self.bus.host = val;
        }
        if let Ok(val) = std::env::var("CASABUS_PORT") {
            if let Ok(port) = val.parse() {
                self.bus.port = port;
            }
        }
        if let Ok(val) = std::env::var("CASABUS_CONTROLLER") {
            if let Some((host, port)) = val.rsplit_once(':') {
                self.bus.host = host.to_string();
                if let Ok(port) = port.parse() {
                    self.bus.port = port;
                }
            }
        }
        if let Ok(val) = std::env::var("CASABUS_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.bus.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.bus.host.is_empty() {
            return Err(ConfigError::Validation("host must not be empty".to_string()));
        }
        if self.pipeline.capacity == 0 {
            return Err(ConfigError::Validation(
                "pipeline capacity must be non-zero".to_string(),
            ));
        }
        self.catalog.validate()?;
        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { capacity: 10 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "casabusd=info,casabus=info".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Catalog invariant failure.
    #[error("invalid catalog")]
    Catalog(#[from] CatalogError),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_produce_sensible_defaults() {
        let config = Config::default();
        assert_eq!(config.bus.host, "192.168.0.103");
        assert_eq!(config.bus.port, 20_000);
        assert_eq!(config.pipeline.capacity, 10);
        assert!(config.catalog.is_empty());
    }

    #[test]
    fn should_parse_minimal_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.bus.port, 20_000);
    }

    #[test]
    fn should_parse_full_toml() {
        let toml = "
            [bus]
            host = '10.1.2.3'
            port = 20001
            drain_attempts = 5
            drain_delay_ms = 25

            [pipeline]
            capacity = 32

            [logging]
            filter = 'debug'

            [[catalog.lights]]
            id = 31
            name = 'Bureau Centraal'

            [[catalog.shutters]]
            id = 82
            name = 'Bureau Zij'
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.bus.host, "10.1.2.3");
        assert_eq!(config.bus.port, 20_001);
        assert_eq!(config.bus.drain_attempts, 5);
        assert_eq!(config.bus.drain_delay_ms, 25);
        assert_eq!(config.pipeline.capacity, 32);
        assert_eq!(config.logging.filter, "debug");
        assert_eq!(config.catalog.lights.len(), 1);
        assert_eq!(config.catalog.shutters.len(), 1);
    }

    #[test]
    fn should_parse_partial_toml_with_defaults() {
        let toml = "
            [bus]
            port = 20002
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.bus.port, 20_002);
        assert_eq!(config.bus.host, "192.168.0.103");
        assert_eq!(config.pipeline.capacity, 10);
    }

    #[test]
    fn should_return_default_when_file_not_found() {
        let config = Config::from_file("nonexistent.toml").unwrap();
        assert_eq!(config.bus.port, 20_000);
    }

    #[test]
    fn should_reject_zero_port() {
        let mut config = Config::default();
        config.bus.port = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn should_reject_empty_host() {
        let mut config = Config::default();
        config.bus.host = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_zero_pipeline_capacity() {
        let mut config = Config::default();
        config.pipeline.capacity = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_duplicate_catalog_ids() {
        let toml = "
            [[catalog.lights]]
            id = 31
            name = 'A'

            [[catalog.lights]]
            id = 31
            name = 'B'
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Catalog(_))));
    }

    #[test]
    fn should_report_parse_error_for_invalid_toml() {
        let result: Result<Config, _> = toml::from_str("invalid {{{");
        assert!(result.is_err());
    }
}
