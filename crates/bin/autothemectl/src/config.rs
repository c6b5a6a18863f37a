//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `autotheme.toml` in the working directory unless `--config`
//! points elsewhere. Every field has a sensible default so the file is
//! optional. Environment variables take precedence over file values.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use autotheme_adapter_ipc::channel::DEFAULT_ADDR;
use autotheme_adapter_virtual::ScriptedPermission;
use autotheme_app::services::location_poller::PollPolicy;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Background service connection.
    pub service: ServiceConfig,
    /// Where the switch configuration and the location cache live.
    pub storage: StorageConfig,
    /// Device-location lookup.
    pub location: LocationConfig,
    pub power: PowerConfig,
    pub logging: LoggingConfig,
}

/// Background service connection.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// `host:port` of the service's command socket.
    pub address: String,
    /// Reply timeout for `Switch`.
    pub switch_timeout_secs: u64,
    /// Reply timeout for every other command.
    pub command_timeout_secs: u64,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// TOML file holding the persisted switch configuration.
    pub config_path: PathBuf,
    /// JSON location cache written by the service.
    pub location_path: PathBuf,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    /// Cache reads before giving up on a fix.
    pub max_attempts: u32,
    /// Delay between cache reads.
    pub poll_interval_ms: u64,
    /// Answer given to geolocation permission requests.
    pub permission: ScriptedPermission,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PowerConfig {
    /// Report the energy saver as active.
    pub energy_saver: bool,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from `path` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting values are unusable.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::from_file(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("AUTOTHEME_SERVICE_ADDR") {
            self.service.address = val;
        }
        if let Ok(val) = std::env::var("AUTOTHEME_CONFIG_PATH") {
            self.storage.config_path = PathBuf::from(val);
        }
        if let Ok(val) = std::env::var("AUTOTHEME_LOCATION_PATH") {
            self.storage.location_path = PathBuf::from(val);
        }
        if let Ok(val) = std::env::var("AUTOTHEME_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.service.address.trim().is_empty() {
            return Err(ConfigError::Validation(
                "service address must not be empty".to_string(),
            ));
        }
        if self.service.switch_timeout_secs == 0 || self.service.command_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "service timeouts must be non-zero".to_string(),
            ));
        }
        if self.location.max_attempts == 0 {
            return Err(ConfigError::Validation(
                "location.max_attempts must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn switch_timeout(&self) -> Duration {
        Duration::from_secs(self.service.switch_timeout_secs)
    }

    #[must_use]
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.service.command_timeout_secs)
    }

    #[must_use]
    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            max_attempts: self.location.max_attempts,
            interval: Duration::from_millis(self.location.poll_interval_ms),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDR.to_string(),
            switch_timeout_secs: 15,
            command_timeout_secs: 5,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            config_path: PathBuf::from("settings.toml"),
            location_path: PathBuf::from("location_data.json"),
        }
    }
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            poll_interval_ms: 1000,
            permission: ScriptedPermission::Allowed,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "autothemectl=info,autotheme=info".to_string(),
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
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
