//! Reading and writing `config.toml`
//!
//! The file tells the CLI where the shared store file lives, how often to
//! poll it, and where this device keeps its preferences. A broken file must
//! never be replaced silently: it stops the load with an error, and every
//! save keeps the previous file as `config.toml.backup`.

use crate::{Config, ConfigError, ConfigResult, CONFIG_VERSION};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Loads and saves one config file
pub struct ConfigPersistence {
    config_path: PathBuf,
}

impl ConfigPersistence {
    pub fn new(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    /// Reads the config file.
    ///
    /// A missing file means a fresh install and yields the defaults. An empty
    /// or unparseable file is an error. Out-of-range values only warn, so a
    /// hand-edited file still opens and can be fixed with `octlib init`.
    pub fn load(&self) -> ConfigResult<Config> {
        if !self.config_path.exists() {
            log::info!(
                "No config at {}, using defaults",
                self.config_path.display()
            );
            return Ok(Config::default());
        }

        let raw = fs::read_to_string(&self.config_path).map_err(|source| {
            ConfigError::ReadError {
                path: self.config_path.clone(),
                source,
            }
        })?;

        if raw.trim().is_empty() {
            return Err(ConfigError::ReadError {
                path: self.config_path.clone(),
                source: io::Error::new(io::ErrorKind::InvalidData, "config file is blank"),
            });
        }

        let config: Config = toml::from_str(&raw).map_err(|source| ConfigError::ParseError {
            path: self.config_path.clone(),
            source,
        })?;

        if config.version > CONFIG_VERSION {
            log::warn!(
                "Config written by a newer release (version {}, this build reads {}); unknown keys are ignored",
                config.version,
                CONFIG_VERSION
            );
        }

        if let Err(errors) = config.validate() {
            log::warn!("Config has invalid values: {}", describe(&errors));
        }

        Ok(config)
    }

    /// Validates `config`, backs up the current file and replaces it through
    /// a temp file in the same directory.
    pub fn save(&self, config: &Config) -> ConfigResult<()> {
        config
            .validate()
            .map_err(|errors| ConfigError::ValidationError(describe(&errors)))?;

        let dir = self
            .config_path
            .parent()
            .ok_or_else(|| ConfigError::PathResolutionError {
                reason: "Config path has no parent directory".to_string(),
            })?;
        create_dir(dir)?;

        if self.config_path.exists() {
            let backup = self.config_path.with_extension("toml.backup");
            fs::copy(&self.config_path, &backup)
                .map_err(|source| ConfigError::BackupError { source })?;
            log::debug!("Previous config kept at {}", backup.display());
        }

        let body = toml::to_string_pretty(config).map_err(ConfigError::SerializeError)?;
        self.replace_with(dir, &body)?;

        log::info!("Config saved to {}", self.config_path.display());
        Ok(())
    }

    fn replace_with(&self, dir: &Path, body: &str) -> ConfigResult<()> {
        let mut temp = NamedTempFile::new_in(dir).map_err(ConfigError::IoError)?;
        temp.write_all(body.as_bytes())
            .and_then(|_| temp.flush())
            .map_err(ConfigError::IoError)?;
        temp.persist(&self.config_path)
            .map_err(|e| ConfigError::WriteError {
                path: self.config_path.clone(),
                source: e.error,
            })?;
        Ok(())
    }

    /// Writes the defaults, used by `octlib init`
    pub fn generate_default(&self) -> ConfigResult<()> {
        self.save(&Config::default())?;
        log::info!("Wrote default config to {}", self.config_path.display());
        Ok(())
    }
}

fn create_dir(dir: &Path) -> ConfigResult<()> {
    if dir.exists() {
        return Ok(());
    }
    fs::create_dir_all(dir).map_err(|source| ConfigError::DirectoryCreationError {
        path: dir.to_path_buf(),
        source,
    })?;
    log::info!("Created config directory {}", dir.display());
    Ok(())
}

fn describe(errors: &[crate::ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
