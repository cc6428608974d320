//! Error types and recovery strategies for OctLib
//!
//! Errors are classified in two severity tiers:
//! - **Recoverable**: the operation failed once but the app state is intact
//!   (a rejected write); the user may try again
//! - **Degraded**: a subsystem is unavailable and the app runs on fallbacks
//!   (no store connection, a failing store file)
//!
//! No error here is retried automatically. A failed write fails once and is
//! reported; the recovery action only tells the caller what to show.
//! Unparseable device preferences never surface here: they are replaced by
//! their defaults where they are read.

use std::fmt;
use std::io;
use thiserror::Error;

/// Recovery actions that can be taken when an error occurs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryAction {
    /// Keep running on the built-in fallback content
    UseFallback,
    /// Surface the failure next to the action that caused it
    UserIntervention,
}

impl fmt::Display for RecoveryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UseFallback => write!(f, "Using fallback content"),
            Self::UserIntervention => write!(f, "User intervention required"),
        }
    }
}

/// Error severity classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Operation failed but state is intact
    Recoverable,
    /// Subsystem unavailable, app continues on fallbacks
    Degraded,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Recoverable => write!(f, "Recoverable"),
            Self::Degraded => write!(f, "Degraded"),
        }
    }
}

/// Main error type for OctLib
#[derive(Error, Debug)]
pub enum AppError {
    // ===== Store Errors =====
    /// The document store could not be initialized or reached
    #[error("Store unavailable: {reason}")]
    StoreUnavailable { reason: String },

    /// A well-formed write was refused by the store
    #[error("Write rejected: {operation} on {collection}: {reason}")]
    WriteRejected {
        operation: String,
        collection: String,
        reason: String,
    },

    /// Document not found in the store
    #[error("Record not found: {entity} with {identifier}")]
    RecordNotFound { entity: String, identifier: String },

    // ===== Input Errors =====
    /// An update payload failed validation before dispatch
    #[error("Invalid input for {entity}: {reasons}")]
    InvalidInput { entity: String, reasons: String },

    // ===== Device Errors =====
    /// Reading or writing the store file failed
    #[error("I/O error: {message}")]
    IoError {
        message: String,
        #[source]
        source: io::Error,
    },

    // ===== Other =====
    /// Unexpected internal failure
    #[error("Internal error: {message}")]
    InternalError { message: String },
}

impl AppError {
    /// Returns the severity level of this error
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::WriteRejected { .. }
            | Self::RecordNotFound { .. }
            | Self::InvalidInput { .. } => ErrorSeverity::Recoverable,

            Self::StoreUnavailable { .. }
            | Self::IoError { .. }
            | Self::InternalError { .. } => ErrorSeverity::Degraded,
        }
    }

    /// Returns the recommended recovery action for this error
    pub fn recovery_action(&self) -> RecoveryAction {
        match self {
            Self::StoreUnavailable { .. } => RecoveryAction::UseFallback,
            _ => RecoveryAction::UserIntervention,
        }
    }

    /// Returns a user-friendly error message suitable for display next to the failed action
    pub fn user_message(&self) -> String {
        match self {
            Self::StoreUnavailable { .. } => {
                "Database not connected: check the configuration file.".to_string()
            }
            Self::WriteRejected { operation, .. } => {
                format!("The {} could not be saved. Please try again.", operation)
            }
            Self::RecordNotFound { .. } => "The requested item was not found.".to_string(),
            Self::InvalidInput { reasons, .. } => format!("Please check your input: {}", reasons),
            Self::IoError { .. } => "A file operation failed. Please try again.".to_string(),
            Self::InternalError { .. } => {
                "An unexpected error occurred. Please try again.".to_string()
            }
        }
    }

    /// Helper to create a store-unavailable error
    pub fn store_unavailable(reason: impl Into<String>) -> Self {
        Self::StoreUnavailable {
            reason: reason.into(),
        }
    }

    /// Helper to create a write-rejected error
    pub fn write_rejected(
        operation: impl Into<String>,
        collection: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::WriteRejected {
            operation: operation.into(),
            collection: collection.into(),
            reason: reason.into(),
        }
    }
}

/// Convenience type alias for Results using AppError
pub type Result<T> = std::result::Result<T, AppError>;
