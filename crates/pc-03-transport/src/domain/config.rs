//! Transport configuration.

use std::time::Duration;

/// Datagram and worker timing parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    /// Maximum bytes per datagram, control byte included.
    pub datagram_budget: usize,
    /// How often the worker runs liveness demotion.
    pub liveness_interval: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            datagram_budget: 1024,
            liveness_interval: Duration::from_secs(5),
        }
    }
}

impl TransportConfig {
    /// Create a config suitable for testing (small datagrams, fast ticks)
    pub fn for_testing() -> Self {
        Self {
            datagram_budget: 64,
            liveness_interval: Duration::from_millis(50),
        }
    }
}
