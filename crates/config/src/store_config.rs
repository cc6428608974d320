//! Document store configuration section

use crate::validation::{ConfigSection, ValidationError, Validator};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where site content lives and how it is watched
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StoreConfig {
    /// Shared document store file (relative to config dir if not absolute)
    pub data_file: PathBuf,

    /// Start disconnected: never open the store, show built-in content
    pub offline: bool,

    /// Poll interval for `watch`, in milliseconds
    pub watch_interval_ms: u64,

    /// Write the built-in content into collections found empty on first run
    pub seed_on_empty: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from("library-store.json"),
            offline: false,
            watch_interval_ms: 1000,
            seed_on_empty: true,
        }
    }
}

impl ConfigSection for StoreConfig {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut results = vec![Validator::in_range(
            self.watch_interval_ms,
            100,
            60_000,
            "store.watch_interval_ms",
        )];

        results.push(Validator::not_empty(
            &self.data_file.to_string_lossy(),
            "store.data_file",
        ));

        Validator::collect_errors(results)
    }

    fn merge(&mut self, other: Self) {
        self.data_file = other.data_file;
        self.offline = other.offline;
        self.watch_interval_ms = other.watch_interval_ms;
        self.seed_on_empty = other.seed_on_empty;
    }

    fn section_name(&self) -> &'static str {
        "store"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = StoreConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_data_file() {
        let config = StoreConfig {
            data_file: PathBuf::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_watch_interval_bounds() {
        let mut config = StoreConfig {
            watch_interval_ms: 50,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        config.watch_interval_ms = 120_000;
        assert!(config.validate().is_err());

        config.watch_interval_ms = 100;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_merge() {
        let mut base = StoreConfig::default();
        let other = StoreConfig {
            data_file: PathBuf::from("/srv/octlib/store.json"),
            offline: true,
            watch_interval_ms: 250,
            seed_on_empty: false,
        };

        base.merge(other.clone());
        assert_eq!(base, other);
    }
}
