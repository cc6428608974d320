//! Error types for device-local preferences

use std::path::PathBuf;
use thiserror::Error;

/// Result type for preference operations
pub type PreferenceResult<T> = Result<T, PreferenceError>;

/// Errors that can occur while persisting preferences
#[derive(Debug, Error)]
pub enum PreferenceError {
    /// Failed to write the preferences file
    #[error("Failed to write preferences at {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to create the directory holding the preferences file
    #[error("Failed to create preferences directory at {path}: {source}")]
    DirectoryCreationError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to serialize a value
    #[error("Failed to serialize preferences: {0}")]
    SerializeError(#[from] serde_json::Error),

    /// A lock guarding the entries was poisoned by a panicking writer
    #[error("Preference store lock poisoned")]
    LockPoisoned,

    /// Generic I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_error_display() {
        let err = PreferenceError::WriteError {
            path: PathBuf::from("/tmp/preferences.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let message = err.to_string();
        assert!(message.contains("/tmp/preferences.json"));
        assert!(message.contains("denied"));
    }
}
