//! Configuration manager - main API for config operations

use crate::persistence::ConfigPersistence;
use crate::{Config, ConfigError, ConfigResult, LogLevel};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Environment variables read by [`ConfigManager::load_with_env_overrides`]
pub const ENV_STORE_DATA_FILE: &str = "OCTLIB_STORE_DATA_FILE";
pub const ENV_STORE_OFFLINE: &str = "OCTLIB_STORE_OFFLINE";
pub const ENV_APP_LOG_LEVEL: &str = "OCTLIB_APP_LOG_LEVEL";
pub const ENV_DEVICE_PREFERENCES_FILE: &str = "OCTLIB_DEVICE_PREFERENCES_FILE";

/// Main configuration manager
///
/// This is the primary interface for loading, saving, and managing configuration.
/// It handles file paths, defaults, and validation.
pub struct ConfigManager {
    persistence: ConfigPersistence,
    config_dir: PathBuf,
}

impl ConfigManager {
    /// Creates a new config manager using the default config directory
    ///
    /// The default directory follows XDG base directory specification:
    /// - Linux: `~/.config/octlib/`
    /// - macOS: `~/Library/Application Support/octlib/`
    /// - Windows: `%APPDATA%\octlib\`
    pub fn new() -> ConfigResult<Self> {
        let config_dir = Self::default_config_dir()?;
        Self::with_directory(config_dir)
    }

    /// Creates a config manager with a custom config directory
    pub fn with_directory(config_dir: PathBuf) -> ConfigResult<Self> {
        let config_path = config_dir.join("config.toml");
        let persistence = ConfigPersistence::new(config_path);

        Ok(Self {
            persistence,
            config_dir,
        })
    }

    /// Returns the default config directory based on the platform
    fn default_config_dir() -> ConfigResult<PathBuf> {
        ProjectDirs::from("", "", "octlib")
            .map(|proj_dirs| proj_dirs.config_dir().to_path_buf())
            .ok_or_else(|| ConfigError::PathResolutionError {
                reason: "Could not determine user config directory".to_string(),
            })
    }

    /// Returns the config directory path
    pub fn config_dir(&self) -> &PathBuf {
        &self.config_dir
    }

    /// Returns the full config file path
    pub fn config_path(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    /// Resolves a configured path: absolute paths are kept, relative ones
    /// are taken from the config directory
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.config_dir.join(path)
        }
    }

    /// Loads the configuration from file
    ///
    /// If the file doesn't exist, returns default configuration.
    /// If the file is corrupted, returns an error.
    pub fn load(&self) -> ConfigResult<Config> {
        self.persistence.load()
    }

    /// Loads the configuration, falling back to defaults on any error
    ///
    /// This is a convenience method that never returns an error.
    /// Errors are logged but the function always returns a valid config.
    pub fn load_or_default(&self) -> Config {
        match self.load() {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Failed to load config: {}, using defaults", e);
                Config::default()
            }
        }
    }

    /// Saves the configuration to file
    ///
    /// This performs validation before saving and uses atomic writes
    /// to prevent corruption.
    pub fn save(&self, config: &Config) -> ConfigResult<()> {
        self.persistence.save(config)
    }

    /// Updates the configuration using a closure
    ///
    /// This loads the current config, applies the update function,
    /// and saves the result atomically.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// # use octlib_config::ConfigManager;
    /// # let manager = ConfigManager::new().unwrap();
    /// manager.update(|config| {
    ///     config.store.offline = true;
    /// }).expect("Failed to update config");
    /// ```
    pub fn update<F>(&self, update_fn: F) -> ConfigResult<()>
    where
        F: FnOnce(&mut Config),
    {
        let mut config = self.load()?;
        update_fn(&mut config);
        self.save(&config)
    }

    /// Generates a default config file if one doesn't exist
    ///
    /// Returns Ok(true) if a new file was created, Ok(false) if one already exists.
    pub fn initialize(&self) -> ConfigResult<bool> {
        if self.config_path().exists() {
            log::info!(
                "Config file already exists at {}",
                self.config_path().display()
            );
            return Ok(false);
        }

        self.persistence.generate_default()?;
        Ok(true)
    }

    /// Resets the configuration to defaults
    ///
    /// This overwrites the existing config file with default values.
    pub fn reset(&self) -> ConfigResult<()> {
        let default_config = Config::default();
        self.save(&default_config)
    }

    /// Validates the current configuration file
    ///
    /// Returns all validation errors found, or Ok if valid.
    pub fn validate(&self) -> ConfigResult<Vec<String>> {
        let config = self.load()?;

        match config.validate() {
            Ok(()) => Ok(Vec::new()),
            Err(errors) => Ok(errors.iter().map(|e| e.to_string()).collect()),
        }
    }

    /// Loads the config file, then applies environment variable overrides
    ///
    /// Variables follow the pattern `OCTLIB_SECTION_FIELD`, e.g.
    /// `OCTLIB_STORE_OFFLINE=true`. A variable holding an unusable value is
    /// an error rather than being silently ignored.
    pub fn load_with_env_overrides(&self) -> ConfigResult<Config> {
        let mut config = self.load()?;
        apply_overrides(&mut config, |name| std::env::var(name).ok())?;

        // Validate after applying overrides
        if let Err(errors) = config.validate() {
            log::warn!(
                "Config validation warnings after env overrides: {:?}",
                errors
            );
        }

        Ok(config)
    }
}

/// Applies overrides looked up by variable name
pub fn apply_overrides<F>(config: &mut Config, lookup: F) -> ConfigResult<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(path) = lookup(ENV_STORE_DATA_FILE) {
        log::debug!("{} overrides store.data_file", ENV_STORE_DATA_FILE);
        config.store.data_file = PathBuf::from(path);
    }

    if let Some(raw) = lookup(ENV_STORE_OFFLINE) {
        config.store.offline = parse_bool(&raw).ok_or_else(|| ConfigError::EnvOverride {
            variable: ENV_STORE_OFFLINE.to_string(),
            reason: format!("expected a boolean, got '{}'", raw),
        })?;
    }

    if let Some(raw) = lookup(ENV_APP_LOG_LEVEL) {
        config.app.log_level =
            raw.parse::<LogLevel>()
                .map_err(|e| ConfigError::EnvOverride {
                    variable: ENV_APP_LOG_LEVEL.to_string(),
                    reason: e.to_string(),
                })?;
    }

    if let Some(path) = lookup(ENV_DEVICE_PREFERENCES_FILE) {
        log::debug!(
            "{} overrides device.preferences_file",
            ENV_DEVICE_PREFERENCES_FILE
        );
        config.device.preferences_file = PathBuf::from(path);
    }

    Ok(())
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
