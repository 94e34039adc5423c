//! Core domain entities for the peer directory.

use std::net::SocketAddr;

/// Unix timestamp in seconds
///
/// Timestamps are clamped to a reasonable maximum so arithmetic on
/// liveness windows never overflows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(u64);

impl Timestamp {
    /// Maximum reasonable timestamp (year 9999).
    pub const MAX_REASONABLE: u64 = 253_402_300_799;

    /// Create a new timestamp, clamping to MAX_REASONABLE.
    pub fn new(secs: u64) -> Self {
        Self(secs.min(Self::MAX_REASONABLE))
    }

    /// Get the underlying seconds value.
    pub fn as_secs(&self) -> u64 {
        self.0
    }

    /// Add seconds to timestamp (saturating at MAX_REASONABLE).
    pub fn add_secs(&self, secs: u64) -> Self {
        Self(self.0.saturating_add(secs).min(Self::MAX_REASONABLE))
    }

    /// Seconds elapsed since `earlier` (0 if `earlier` is in the future).
    pub fn secs_since(&self, earlier: Timestamp) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

/// Liveness state of a known peer.
///
/// ```text
/// (gossip) --> Inferred --(reply)--> Active --(window elapsed)--> Inactive
///                 |                    ^                              |
///                 +--(window elapsed)--+--------(reply)---------------+
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PeerState {
    /// Learned through gossip or bootstrap, never heard from.
    Inferred,
    /// Heard from within the liveness window.
    Active,
    /// Silent for longer than the liveness window.
    Inactive,
}

/// A known peer. Records are never deleted, only migrate between states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerRecord {
    /// The peer's datagram address.
    pub address: SocketAddr,
    /// Current liveness state.
    pub state: PeerState,
    /// When the peer was last heard from, if ever.
    pub last_seen: Option<Timestamp>,
    /// When the peer entered its current state.
    pub since: Timestamp,
}

impl PeerRecord {
    /// A peer learned by gossip at `now`.
    pub fn inferred(address: SocketAddr, now: Timestamp) -> Self {
        Self {
            address,
            state: PeerState::Inferred,
            last_seen: None,
            since: now,
        }
    }

    /// A peer heard from at `now`.
    pub fn active(address: SocketAddr, now: Timestamp) -> Self {
        Self {
            address,
            state: PeerState::Active,
            last_seen: Some(now),
            since: now,
        }
    }

    /// True if the peer has been silent for longer than `window_secs`.
    pub fn is_stale(&self, now: Timestamp, window_secs: u64) -> bool {
        let reference = self.last_seen.unwrap_or(self.since);
        now.secs_since(reference) > window_secs
    }
}

/// A follow-up the directory asks the transport to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PeerAction {
    /// Send a liveness probe.
    Ping(SocketAddr),
    /// Ask the peer for its known peers.
    RequestPeers(SocketAddr),
}
