//! Configuration management for Tidepool
//!
//! File-based configuration with environment overrides. The store section
//! controls durability, the logging section feeds the logging subsystem.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

mod error;

pub use error::ConfigError;

use crate::logging::{LogConfig, LogLevel};

/// Main configuration for a Tidepool device
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Store configuration
    pub store: StoreConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Data directory for the durable operation log
    pub data_dir: PathBuf,

    /// Write every committed operation to the on-disk log
    pub durable: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Minimum level to emit ("trace" .. "error")
    pub level: String,

    /// Emit JSON-formatted log lines
    pub json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            store: StoreConfig { data_dir: PathBuf::from("./data"), durable: true },
            logging: LoggingConfig { level: "info".to_string(), json: false },
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        let config: Config =
            toml::from_str(&raw).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load defaults, then apply `TIDEPOOL_*` environment overrides
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Config::default();

        if let Ok(dir) = env::var("TIDEPOOL_DATA_DIR") {
            config.store.data_dir = PathBuf::from(dir);
        }
        if let Ok(durable) = env::var("TIDEPOOL_DURABLE") {
            config.store.durable = durable
                .parse()
                .map_err(|_| ConfigError::InvalidValue(format!("TIDEPOOL_DURABLE={}", durable)))?;
        }
        if let Ok(level) = env::var("TIDEPOOL_LOG_LEVEL") {
            config.logging.level = level;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store.data_dir.as_os_str().is_empty() {
            return Err(ConfigError::ValidationFailed("store.data_dir is empty".to_string()));
        }
        if LogLevel::parse(&self.logging.level).is_none() {
            return Err(ConfigError::InvalidValue(format!(
                "unknown log level: {}",
                self.logging.level
            )));
        }
        Ok(())
    }

    /// Build a [`LogConfig`] for the logging subsystem
    pub fn log_config(&self) -> LogConfig {
        let level = LogLevel::parse(&self.logging.level).unwrap_or_default();
        LogConfig::new(level).json_format(self.logging.json)
    }
}
