//! # Peer Directory Service
//!
//! Wires the pure [`PeerDirectory`] to a [`TimeSource`] and logs transitions.
//! The transport router owns one of these and turns the returned
//! [`PeerAction`]s into datagrams.

use crate::domain::{LivenessConfig, PeerAction, PeerDirectory, PeerState};
use crate::ports::{BootstrapProvider, TimeSource};
use std::net::SocketAddr;
use tracing::{debug, info, warn};

/// Peer directory with an injected clock.
pub struct PeerDirectoryService {
    directory: PeerDirectory,
    time_source: Box<dyn TimeSource>,
}

impl PeerDirectoryService {
    /// Create a new service.
    pub fn new(
        own_addresses: impl IntoIterator<Item = SocketAddr>,
        config: LivenessConfig,
        time_source: Box<dyn TimeSource>,
    ) -> Self {
        Self {
            directory: PeerDirectory::new(own_addresses, config),
            time_source,
        }
    }

    /// Register another address of this node.
    pub fn add_own_address(&mut self, addr: SocketAddr) {
        self.directory.add_own_address(addr);
    }

    /// Seed the directory from a bootstrap source.
    ///
    /// A failing source is logged and leaves the directory empty.
    pub fn seed(&mut self, source: &dyn BootstrapProvider) -> Vec<PeerAction> {
        match source.bootstrap_peers() {
            Ok(peers) => {
                let actions = self.learn_all(peers);
                info!("[pc-01] Seeded {} bootstrap peers", actions.len());
                actions
            }
            Err(e) => {
                warn!("[pc-01] Bootstrap failed: {}", e);
                Vec::new()
            }
        }
    }

    /// Record gossip-learned addresses.
    pub fn learn_all(&mut self, addrs: impl IntoIterator<Item = SocketAddr>) -> Vec<PeerAction> {
        let now = self.time_source.now();
        let actions = self.directory.learn_all(addrs, now);
        for action in &actions {
            if let PeerAction::Ping(addr) = action {
                debug!("[pc-01] Inferred peer {}", addr);
            }
        }
        actions
    }

    /// Record inbound traffic from `addr`.
    pub fn observe(&mut self, addr: SocketAddr) -> Option<PeerAction> {
        let now = self.time_source.now();
        let action = self.directory.observe(addr, now);
        if action.is_some() {
            debug!("[pc-01] Peer {} is active", addr);
        }
        action
    }

    /// Run liveness demotion at the current time.
    pub fn tick(&mut self) -> Vec<PeerAction> {
        let now = self.time_source.now();
        let actions = self.directory.tick(now);
        for action in &actions {
            if let PeerAction::Ping(addr) = action {
                debug!("[pc-01] Peer {} went inactive", addr);
            }
        }
        actions
    }

    /// Broadcast fan-out set.
    pub fn broadcast_peers(&self) -> Vec<SocketAddr> {
        self.directory.broadcast_peers()
    }

    /// Addresses for a peer-list answer to `requester`.
    pub fn gossip_for(&self, requester: &SocketAddr) -> Vec<SocketAddr> {
        self.directory.gossip_for(requester)
    }

    /// Active peers.
    pub fn active(&self) -> Vec<SocketAddr> {
        self.directory.active()
    }

    /// Known peers that are not active.
    pub fn inactive(&self) -> Vec<SocketAddr> {
        self.directory.inactive()
    }

    /// State of a peer, if known.
    pub fn state(&self, addr: &SocketAddr) -> Option<PeerState> {
        self.directory.state(addr)
    }
}
