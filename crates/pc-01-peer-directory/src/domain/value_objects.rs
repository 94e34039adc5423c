//! Configuration values for the peer directory.

/// Liveness parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LivenessConfig {
    /// Seconds of silence after which a peer is demoted to inactive.
    pub liveness_window_secs: u64,
    /// Maximum addresses returned in one peer-list answer.
    pub max_gossip_peers: usize,
}

impl Default for LivenessConfig {
    fn default() -> Self {
        Self {
            liveness_window_secs: 60,
            max_gossip_peers: 64,
        }
    }
}

impl LivenessConfig {
    /// Create a config suitable for testing (short window)
    pub fn for_testing() -> Self {
        Self {
            liveness_window_secs: 5,
            max_gossip_peers: 4,
        }
    }
}
