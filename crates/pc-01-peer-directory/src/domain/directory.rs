//! # Peer Directory State Machine
//!
//! Tracks every peer the node has ever learned about and decides which
//! liveness probes and peer-list requests to issue. All transitions take the
//! current time explicitly so the machine is fully deterministic.
//!
//! ## Rules
//!
//! - A gossip-learned address enters `Inferred` and is pinged once.
//! - Any inbound traffic marks the sender `Active`. Entering `Active` from any
//!   other state (or from unknown) asks the peer for its own peer list.
//! - A `tick` demotes peers silent for longer than the window to `Inactive`
//!   and pings them again.
//! - The node's own addresses are never recorded.

use super::entities::{PeerAction, PeerRecord, PeerState, Timestamp};
use super::errors::PeerDirectoryError;
use super::value_objects::LivenessConfig;
use std::collections::{BTreeMap, HashSet};
use std::net::SocketAddr;

/// The set of known peers and their liveness.
#[derive(Debug, Clone)]
pub struct PeerDirectory {
    peers: BTreeMap<SocketAddr, PeerRecord>,
    own_addresses: HashSet<SocketAddr>,
    config: LivenessConfig,
}

impl PeerDirectory {
    /// Create an empty directory that ignores `own_addresses`.
    pub fn new(own_addresses: impl IntoIterator<Item = SocketAddr>, config: LivenessConfig) -> Self {
        Self {
            peers: BTreeMap::new(),
            own_addresses: own_addresses.into_iter().collect(),
            config,
        }
    }

    /// Liveness parameters in use.
    pub fn config(&self) -> &LivenessConfig {
        &self.config
    }

    /// Register another address of this node (e.g. once the socket is bound).
    pub fn add_own_address(&mut self, addr: SocketAddr) {
        self.peers.remove(&addr);
        self.own_addresses.insert(addr);
    }

    /// True if `addr` designates this node.
    pub fn is_own(&self, addr: &SocketAddr) -> bool {
        addr.ip().is_unspecified() || addr.port() == 0 || self.own_addresses.contains(addr)
    }

    /// Record a gossip-learned address.
    ///
    /// Returns a ping for a previously unknown peer, `None` if the peer is
    /// already known.
    pub fn learn(
        &mut self,
        addr: SocketAddr,
        now: Timestamp,
    ) -> Result<Option<PeerAction>, PeerDirectoryError> {
        if self.is_own(&addr) {
            return Err(PeerDirectoryError::SelfAddress);
        }
        if self.peers.contains_key(&addr) {
            return Ok(None);
        }
        self.peers.insert(addr, PeerRecord::inferred(addr, now));
        Ok(Some(PeerAction::Ping(addr)))
    }

    /// Learn many addresses, skipping own and already-known ones.
    pub fn learn_all(
        &mut self,
        addrs: impl IntoIterator<Item = SocketAddr>,
        now: Timestamp,
    ) -> Vec<PeerAction> {
        addrs
            .into_iter()
            .filter_map(|addr| self.learn(addr, now).ok().flatten())
            .collect()
    }

    /// Record inbound traffic from `addr`.
    ///
    /// Returns a peer-list request when the sender becomes active.
    pub fn observe(&mut self, addr: SocketAddr, now: Timestamp) -> Option<PeerAction> {
        if self.is_own(&addr) {
            return None;
        }
        match self.peers.get_mut(&addr) {
            Some(record) if record.state == PeerState::Active => {
                record.last_seen = Some(now);
                None
            }
            Some(record) => {
                record.state = PeerState::Active;
                record.last_seen = Some(now);
                record.since = now;
                Some(PeerAction::RequestPeers(addr))
            }
            None => {
                self.peers.insert(addr, PeerRecord::active(addr, now));
                Some(PeerAction::RequestPeers(addr))
            }
        }
    }

    /// Demote peers silent for longer than the liveness window.
    ///
    /// Every demoted peer is pinged again.
    pub fn tick(&mut self, now: Timestamp) -> Vec<PeerAction> {
        let window = self.config.liveness_window_secs;
        self.peers
            .values_mut()
            .filter(|record| record.state != PeerState::Inactive && record.is_stale(now, window))
            .map(|record| {
                record.state = PeerState::Inactive;
                record.since = now;
                PeerAction::Ping(record.address)
            })
            .collect()
    }

    /// The broadcast fan-out set: active peers, or every known peer if none
    /// is active.
    pub fn broadcast_peers(&self) -> Vec<SocketAddr> {
        let active = self.active();
        if active.is_empty() {
            self.known()
        } else {
            active
        }
    }

    /// Addresses to hand to `requester` in a peer-list answer.
    pub fn gossip_for(&self, requester: &SocketAddr) -> Vec<SocketAddr> {
        let mut peers: Vec<&PeerRecord> = self
            .peers
            .values()
            .filter(|record| record.address != *requester)
            .collect();
        peers.sort_by_key(|record| record.state != PeerState::Active);
        peers
            .into_iter()
            .take(self.config.max_gossip_peers)
            .map(|record| record.address)
            .collect()
    }

    /// Every known peer.
    pub fn known(&self) -> Vec<SocketAddr> {
        self.peers.keys().copied().collect()
    }

    /// Peers heard from within the window.
    pub fn active(&self) -> Vec<SocketAddr> {
        self.with_state(|state| state == PeerState::Active)
    }

    /// Known peers that are not active (inferred or inactive).
    pub fn inactive(&self) -> Vec<SocketAddr> {
        self.with_state(|state| state != PeerState::Active)
    }

    /// State of a peer, if known.
    pub fn state(&self, addr: &SocketAddr) -> Option<PeerState> {
        self.peers.get(addr).map(|record| record.state)
    }

    /// Record for a peer, if known.
    pub fn get(&self, addr: &SocketAddr) -> Option<&PeerRecord> {
        self.peers.get(addr)
    }

    /// Number of known peers.
    pub fn len(&self) -> usize {
        self.peers.len()
    }

    /// True if no peer is known.
    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    fn with_state(&self, pred: impl Fn(PeerState) -> bool) -> Vec<SocketAddr> {
        self.peers
            .values()
            .filter(|record| pred(record.state))
            .map(|record| record.address)
            .collect()
    }
}
