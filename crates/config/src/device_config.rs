//! Device-local configuration section

use crate::validation::{ConfigSection, ValidationError, Validator};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Settings for state that never leaves this device
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DeviceConfig {
    /// Reservation and wish-list file (relative to config dir if not absolute)
    pub preferences_file: PathBuf,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            preferences_file: PathBuf::from("preferences.json"),
        }
    }
}

impl ConfigSection for DeviceConfig {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        Validator::collect_errors(vec![Validator::not_empty(
            &self.preferences_file.to_string_lossy(),
            "device.preferences_file",
        )])
    }

    fn merge(&mut self, other: Self) {
        self.preferences_file = other.preferences_file;
    }

    fn section_name(&self) -> &'static str {
        "device"
    }
}
