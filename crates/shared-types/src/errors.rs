//! # Error Types
//!
//! Defines error types shared across subsystems.

use thiserror::Error;

/// Errors raised by the wire codec.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Nothing to decode.
    #[error("Empty message")]
    Empty,

    /// Serialization failed.
    #[error("Encode failed: {0}")]
    Encode(String),

    /// Bytes did not form a known message.
    #[error("Decode failed: {0}")]
    Decode(String),
}
