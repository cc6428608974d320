//! OctLib Configuration System
//!
//! TOML configuration for the site tools, split into sections that each
//! implement the `ConfigSection` trait.
//!
//! # Architecture
//!
//! - **Trait-based**: Each section defines its config as a type implementing `ConfigSection`
//! - **Graceful degradation**: Invalid configs fall back to defaults with warnings
//! - **Atomic writes**: Config files are never left in a corrupted state
//! - **Override chain**: defaults < file < `OCTLIB_*` environment variables
//!
//! # Example
//!
//! ```rust,no_run
//! use octlib_config::{Config, ConfigManager};
//!
//! let manager = ConfigManager::new().expect("Failed to initialize config");
//! let config = manager.load().unwrap_or_else(|e| {
//!     eprintln!("Config error: {}, using defaults", e);
//!     Config::default()
//! });
//!
//! println!("Store file: {}", manager.resolve_path(&config.store.data_file).display());
//! ```

mod error;
mod manager;
mod persistence;
mod validation;

// Config sections
pub mod app_config;
mod device_config;
mod store_config;

pub use error::{ConfigError, ConfigResult, ValidationError};
pub use manager::{
    apply_overrides, ConfigManager, ENV_APP_LOG_LEVEL, ENV_DEVICE_PREFERENCES_FILE,
    ENV_STORE_DATA_FILE, ENV_STORE_OFFLINE,
};
pub use validation::{ConfigSection, Validator};

// Re-export config sections
pub use app_config::{AppConfig, LogLevel};
pub use device_config::DeviceConfig;
pub use store_config::StoreConfig;

use serde::{Deserialize, Serialize};

/// Current config file format version
pub const CONFIG_VERSION: u32 = 1;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Config file format version
    pub version: u32,

    /// Application-level settings
    pub app: AppConfig,

    /// Document store settings
    pub store: StoreConfig,

    /// Device-local settings
    pub device: DeviceConfig,
}

impl Config {
    /// Creates a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates the entire configuration
    ///
    /// Returns all validation errors found across all sections.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(mut e) = self.app.validate() {
            errors.append(&mut e);
        }

        if let Err(mut e) = self.store.validate() {
            errors.append(&mut e);
        }

        if let Err(mut e) = self.device.validate() {
            errors.append(&mut e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Merges this config with another, preferring values from `other`
    pub fn merge(&mut self, other: Config) {
        self.app.merge(other.app);
        self.store.merge(other.store);
        self.device.merge(other.device);
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            app: AppConfig::default(),
            store: StoreConfig::default(),
            device: DeviceConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_version_is_set() {
        let config = Config::default();
        assert_eq!(config.version, CONFIG_VERSION);
    }

    #[test]
    fn test_config_merge() {
        let mut base = Config::default();
        let mut override_config = Config::default();
        override_config.store.offline = true;

        base.merge(override_config);
        assert!(base.store.offline);
    }

    #[test]
    fn test_errors_collected_across_sections() {
        let mut config = Config::default();
        config.store.watch_interval_ms = 0;
        config.device.preferences_file = std::path::PathBuf::new();

        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 2);
    }
}
