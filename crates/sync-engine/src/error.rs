// crates/sync-engine/src/error.rs
//! Error types for store and sync operations

use octlib_core::{AppError, Collection};
use thiserror::Error;

/// Result type for sync operations
pub type SyncResult<T> = Result<T, SyncError>;

/// Message shown inline when a mutation is attempted without a store
pub const DISCONNECTED_MESSAGE: &str = "Database not connected: check the configuration file.";

/// Errors that can occur while talking to the document store
#[derive(Debug, Error)]
pub enum SyncError {
    /// No store connection; nothing was sent
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// The store refused or failed a write
    #[error("Write rejected: {operation} on {collection}: {reason}")]
    WriteRejected {
        operation: &'static str,
        collection: Collection,
        reason: String,
    },

    /// The addressed document does not exist
    #[error("Document not found: {collection}/{id}")]
    NotFound { collection: Collection, id: String },

    /// A typed update failed validation before dispatch
    #[error("Invalid update: {}", .0.join("; "))]
    InvalidPatch(Vec<String>),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A lock was poisoned by a panicking holder
    #[error("Lock poisoned: {0}")]
    LockPoisoned(&'static str),

    /// Store file I/O error
    #[error("Store file error: {0}")]
    Io(#[from] std::io::Error),
}

impl SyncError {
    pub(crate) fn disconnected() -> Self {
        SyncError::StoreUnavailable(DISCONNECTED_MESSAGE.to_string())
    }
}

impl From<SyncError> for AppError {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::StoreUnavailable(reason) => AppError::StoreUnavailable { reason },
            SyncError::WriteRejected {
                operation,
                collection,
                reason,
            } => AppError::write_rejected(operation, collection.as_str(), reason),
            SyncError::NotFound { collection, id } => AppError::RecordNotFound {
                entity: collection.to_string(),
                identifier: id,
            },
            SyncError::InvalidPatch(reasons) => AppError::InvalidInput {
                entity: "update".to_string(),
                reasons: reasons.join("; "),
            },
            SyncError::Serialization(e) => AppError::InternalError {
                message: format!("serialization failed: {}", e),
            },
            SyncError::LockPoisoned(what) => AppError::InternalError {
                message: format!("lock poisoned: {}", what),
            },
            SyncError::Io(source) => AppError::IoError {
                message: "store file".to_string(),
                source,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use octlib_core::ErrorSeverity;

    #[test]
    fn test_disconnected_message() {
        let app = AppError::from(SyncError::disconnected());
        assert_eq!(app.user_message(), DISCONNECTED_MESSAGE);
        assert_eq!(app.severity(), ErrorSeverity::Degraded);
    }

    #[test]
    fn test_write_rejected_maps_to_recoverable() {
        let err = SyncError::WriteRejected {
            operation: "update",
            collection: Collection::Books,
            reason: "permission denied".to_string(),
        };
        assert!(err.to_string().contains("update on books"));
        let app: AppError = err.into();
        assert_eq!(app.severity(), ErrorSeverity::Recoverable);
    }

    #[test]
    fn test_invalid_patch_display() {
        let err = SyncError::InvalidPatch(vec![
            "Title cannot be empty".to_string(),
            "Date must be YYYY-MM-DD".to_string(),
        ]);
        assert_eq!(
            err.to_string(),
            "Invalid update: Title cannot be empty; Date must be YYYY-MM-DD"
        );
    }
}
