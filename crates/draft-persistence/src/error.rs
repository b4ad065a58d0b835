//! Persistence error types.
//!
//! All storage operations return structured errors that provide
//! user-friendly messages and optional remediation hints. Inside the draft
//! store most of these are recovered locally and only logged.

use std::path::PathBuf;

use draft_model::{InvalidPathError, ModelError};
use thiserror::Error;

/// Persistence operation error.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// File I/O error.
    #[error("Failed to {operation} file: {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Key cannot be used with this store.
    #[error("Invalid draft key `{key}`: {reason}")]
    InvalidKey { key: String, reason: &'static str },

    /// Store refused the write because it is full.
    #[error("Storage quota exceeded while saving `{key}` ({needed} bytes, limit {limit})")]
    QuotaExceeded {
        key: String,
        needed: usize,
        limit: usize,
    },

    /// Draft state could not be converted to JSON.
    #[error("Failed to serialize draft `{key}`")]
    Serialization {
        key: String,
        #[source]
        source: ModelError,
    },

    /// Stored content is not a valid draft.
    #[error("Failed to deserialize draft `{key}`")]
    Deserialization {
        key: String,
        #[source]
        source: ModelError,
    },

    /// Atomic write failed (temp file couldn't be renamed).
    #[error("Failed to complete save operation")]
    AtomicWriteFailed {
        temp_path: PathBuf,
        target_path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed field path passed to a store update.
    #[error(transparent)]
    Path(#[from] InvalidPathError),

    /// Background save task panicked or was cancelled.
    #[error("Background save task failed")]
    TaskFailed {
        #[source]
        source: tokio::task::JoinError,
    },
}

impl PersistenceError {
    /// Get a user-friendly message for this error.
    pub fn user_message(&self) -> String {
        match self {
            Self::Io {
                operation, path, ..
            } => {
                format!("Could not {} the file at {}", operation, path.display())
            }
            Self::InvalidKey { key, reason } => {
                format!("The draft name '{}' cannot be used: {}", key, reason)
            }
            Self::QuotaExceeded { key, .. } => {
                format!("There is no room left to save the draft '{}'.", key)
            }
            Self::Serialization { key, .. } => {
                format!("An error occurred while saving the draft '{}'.", key)
            }
            Self::Deserialization { key, .. } => {
                format!(
                    "The saved draft '{}' could not be read. It may be corrupted.",
                    key
                )
            }
            Self::AtomicWriteFailed { target_path, .. } => {
                format!(
                    "Could not save the file to {}. Please check disk space and permissions.",
                    target_path.display()
                )
            }
            Self::Path(error) => format!("The field '{}' does not exist in this form.", error.path),
            Self::TaskFailed { .. } => "The background save was interrupted.".to_string(),
        }
    }

    /// Get a suggestion for how to resolve this error.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::Io { operation, .. } => {
                if *operation == "read" {
                    Some("Check that the file exists and you have permission to read it.".into())
                } else {
                    Some("Check that you have permission to write to this location.".into())
                }
            }
            Self::InvalidKey { .. } => Some("Use a shorter, non-empty draft name.".into()),
            Self::QuotaExceeded { .. } => {
                Some("Clear drafts you no longer need and try again.".into())
            }
            Self::Serialization { .. } | Self::Path(_) | Self::TaskFailed { .. } => None,
            Self::Deserialization { .. } => {
                Some("Clear the draft to start again from the default form.".into())
            }
            Self::AtomicWriteFailed { .. } => {
                Some("Free up disk space or try saving to a different location.".into())
            }
        }
    }
}

/// Result type alias for persistence operations.
pub type Result<T> = std::result::Result<T, PersistenceError>;
