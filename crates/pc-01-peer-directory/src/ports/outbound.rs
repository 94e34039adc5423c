//! # Driven Ports (Outbound SPI)
//!
//! These are the interfaces this subsystem **requires** the host application to implement.

use crate::domain::{PeerDirectoryError, Timestamp};
use std::net::SocketAddr;

/// Abstract interface for time-related operations.
///
/// Enables deterministic testing by injecting controllable time sources.
/// Production implementations use system time; tests use fixed timestamps.
pub trait TimeSource: Send + Sync {
    /// Get the current timestamp.
    fn now(&self) -> Timestamp;
}

/// Source of the initial peer set.
pub trait BootstrapProvider: Send + Sync {
    /// Addresses to seed the directory with.
    fn bootstrap_peers(&self) -> Result<Vec<SocketAddr>, PeerDirectoryError>;
}
