//! Domain Errors for the Peer Directory

use std::fmt;

/// Errors that can occur during peer directory operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeerDirectoryError {
    /// Attempted to add one of the node's own addresses
    SelfAddress,
    /// Bootstrap line is not a `host port` pair
    MalformedLine(String),
    /// Port outside 0..=65535
    InvalidPort(String),
    /// Host did not resolve to an address
    UnresolvableHost(String),
    /// Bootstrap file could not be read or created
    Io {
        /// File path
        path: String,
        /// Underlying error text
        error: String,
    },
}

impl fmt::Display for PeerDirectoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SelfAddress => write!(f, "Cannot add the local node as a peer"),
            Self::MalformedLine(line) => write!(f, "Malformed peer line: {line:?}"),
            Self::InvalidPort(port) => write!(f, "Invalid port: {port}"),
            Self::UnresolvableHost(host) => write!(f, "Unresolvable host: {host}"),
            Self::Io { path, error } => write!(f, "Peer file {path}: {error}"),
        }
    }
}

impl std::error::Error for PeerDirectoryError {}
