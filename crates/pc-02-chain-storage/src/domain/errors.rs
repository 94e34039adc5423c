//! # Domain Errors
//!
//! Error types for the chain storage subsystem. Persistence failures are
//! reported to the caller and never touch in-memory ledger state.

use thiserror::Error;

/// Errors that can occur while saving or loading the chain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("I/O error on {path}: {message}")]
    Io {
        /// File involved.
        path: String,
        /// Underlying error text.
        message: String,
    },

    /// Chain image could not be encoded.
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// Stored bytes do not decode to a chain image.
    #[error("Corrupt chain file: {0}")]
    Corrupt(String),

    /// Stored image was written by an incompatible format.
    #[error("Unsupported chain file format {found} (expected {expected})")]
    UnsupportedFormat {
        /// Format version read from the file.
        found: u16,
        /// Format version this build writes.
        expected: u16,
    },
}

impl StorageError {
    pub(crate) fn io(path: &std::path::Path, e: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        }
    }
}
