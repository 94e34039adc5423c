//! Transport error types.
//!
//! None of these ever stop the worker; each one drops a single datagram or
//! message and is logged.

use shared_types::CodecError;
use thiserror::Error;

/// Errors raised while moving messages over datagrams.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Datagram budget leaves no room for payload.
    #[error("Datagram budget {0} too small (minimum 2)")]
    BudgetTooSmall(usize),

    /// Zero-length datagram.
    #[error("Empty datagram")]
    EmptyDatagram,

    /// First byte is not a known control byte.
    #[error("Unknown control byte {0:#04x}")]
    UnknownControl(u8),

    /// `middle` or `end` without a preceding `start`.
    #[error("Fragment without start")]
    OrphanFragment,

    /// Reassembled message would exceed the size limit.
    #[error("Reassembled message exceeds {limit} bytes")]
    Oversize {
        /// Size limit in bytes.
        limit: u64,
    },

    /// Reassembled bytes did not decode.
    #[error("Codec: {0}")]
    Codec(#[from] CodecError),

    /// Socket failure.
    #[error("Socket: {0}")]
    Io(String),
}

impl From<std::io::Error> for TransportError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}
