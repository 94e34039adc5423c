//! # Simulated Network
//!
//! Nodes made of a real [`Router`] and a real [`Ledger`], connected by an
//! in-memory FIFO wire instead of UDP. Datagrams keep their fragmentation,
//! so every message crosses the codec and the reassembler exactly as it
//! would on a socket.

use pc_01_peer_directory::test_utils::ManualTimeSource;
use pc_01_peer_directory::{LivenessConfig, PeerDirectoryService, PeerState, StaticBootstrap};
use pc_02_chain_storage::MemoryChainStore;
use pc_03_transport::{Reassembler, Routed, Router, TransportConfig};
use pc_04_ledger::test_utils::StepClock;
use pc_04_ledger::{LeadingZeroHex, Ledger, LedgerConfig, LedgerDependencies, PlainTransfers};
use shared_types::{decode, Envelope, Inbound, Message, PublicKey};
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::Arc;

/// Ledger clock start for every node.
pub const START: f64 = 1_600_000_000.0;

/// Upper bound on delivered datagrams per `run`, against routing loops.
const MAX_DELIVERIES: usize = 100_000;

pub fn addr(port: u16) -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], port))
}

/// One datagram in flight.
#[derive(Debug, Clone)]
pub struct Datagram {
    pub from: SocketAddr,
    pub to: SocketAddr,
    pub bytes: Vec<u8>,
}

/// A router and ledger pair with the UI messages it produced.
pub struct SimNode {
    pub addr: SocketAddr,
    pub router: Router,
    pub ledger: Ledger,
    pub ui: Vec<Message>,
}

impl SimNode {
    fn new(addr: SocketAddr, miner: PublicKey, peer_clock: &ManualTimeSource) -> Self {
        let peers = PeerDirectoryService::new(
            [addr],
            LivenessConfig::for_testing(),
            Box::new(peer_clock.clone()),
        );
        let ledger = Ledger::new(
            LedgerDependencies {
                config: LedgerConfig::for_testing(),
                store: Box::new(MemoryChainStore::new()),
                pow: Arc::new(LeadingZeroHex),
                policy: Box::new(PlainTransfers),
            },
            miner,
        )
        .with_clock(Arc::new(StepClock::new(START)));

        Self {
            addr,
            router: Router::new(peers, TransportConfig::for_testing()),
            ledger,
            ui: Vec::new(),
        }
    }

    /// Directory state of `peer` as seen by this node.
    pub fn peer_state(&self, peer: SocketAddr) -> Option<PeerState> {
        self.router.peers().state(&peer)
    }

    /// Route ledger output through this node's router.
    fn route(&mut self, envelopes: Vec<Envelope>, wire: &mut VecDeque<Datagram>) {
        for envelope in envelopes {
            let routed = self.router.outbound(envelope);
            self.apply(routed, wire);
        }
    }

    /// Perform router side effects; local deliveries run the ledger.
    fn apply(&mut self, routed: Vec<Routed>, wire: &mut VecDeque<Datagram>) {
        for item in routed {
            match item {
                Routed::Send { to, datagram } => wire.push_back(Datagram {
                    from: self.addr,
                    to,
                    bytes: datagram,
                }),
                Routed::Deliver(inbound) => {
                    let out = self.ledger.handle(inbound);
                    self.route(out, wire);
                }
                Routed::Notify(message) => self.ui.push(message),
            }
        }
    }
}

/// A set of nodes and the wire between them.
pub struct SimNet {
    pub nodes: Vec<SimNode>,
    pub peer_clock: ManualTimeSource,
    wire: VecDeque<Datagram>,
    /// Addresses whose traffic is dropped in both directions.
    cut: Vec<SocketAddr>,
}

impl SimNet {
    /// One node per miner key, on consecutive ports from 7000.
    pub fn new(miners: &[PublicKey]) -> Self {
        let peer_clock = ManualTimeSource::new(1_000);
        let nodes = miners
            .iter()
            .enumerate()
            .map(|(i, miner)| SimNode::new(addr(7000 + i as u16), *miner, &peer_clock))
            .collect();
        Self {
            nodes,
            peer_clock,
            wire: VecDeque::new(),
            cut: Vec::new(),
        }
    }

    pub fn node(&self, i: usize) -> &SimNode {
        &self.nodes[i]
    }

    pub fn node_mut(&mut self, i: usize) -> &mut SimNode {
        &mut self.nodes[i]
    }

    /// Seed node `i` with the addresses of `peers` and deliver everything.
    pub fn connect(&mut self, i: usize, peers: &[usize]) {
        self.seed(i, peers);
        self.run();
    }

    /// Seed node `i` with the addresses of `peers`, leaving its pings on
    /// the wire.
    pub fn seed(&mut self, i: usize, peers: &[usize]) {
        let addrs = peers.iter().map(|&p| self.nodes[p].addr).collect();
        let node = &mut self.nodes[i];
        let routed = node.router.seed(&StaticBootstrap::new(addrs));
        node.apply(routed, &mut self.wire);
    }

    /// Route an envelope through node `i`'s router and deliver everything.
    pub fn outbound(&mut self, i: usize, envelope: Envelope) {
        let node = &mut self.nodes[i];
        node.route(vec![envelope], &mut self.wire);
        self.run();
    }

    /// Hand a local intent to node `i`'s ledger and deliver everything.
    pub fn local(&mut self, i: usize, message: Message) {
        let node = &mut self.nodes[i];
        let out = node.ledger.handle(Inbound::local(message));
        node.route(out, &mut self.wire);
        self.run();
    }

    /// Run node `i`'s startup sync and deliver everything.
    pub fn startup(&mut self, i: usize) {
        let node = &mut self.nodes[i];
        let out = node.ledger.startup();
        node.route(out, &mut self.wire);
        self.run();
    }

    /// Run liveness demotion on node `i`; returns the messages it sent
    /// without delivering them.
    pub fn tick(&mut self, i: usize) -> Vec<(SocketAddr, Message)> {
        let node = &mut self.nodes[i];
        let routed = node.router.tick();
        let before = self.wire.len();
        node.apply(routed, &mut self.wire);
        decode_all(self.wire.iter().skip(before))
    }

    /// Drop all traffic to and from node `i` until [`SimNet::heal`].
    pub fn isolate(&mut self, i: usize) {
        self.cut.push(self.nodes[i].addr);
    }

    pub fn heal(&mut self) {
        self.cut.clear();
    }

    /// Deliver one datagram. Returns false when the wire is empty.
    pub fn step(&mut self) -> bool {
        let Some(datagram) = self.wire.pop_front() else {
            return false;
        };
        if self.cut.contains(&datagram.from) || self.cut.contains(&datagram.to) {
            return true;
        }
        if let Some(node) = self.nodes.iter_mut().find(|n| n.addr == datagram.to) {
            let routed = node.router.inbound(datagram.from, &datagram.bytes);
            node.apply(routed, &mut self.wire);
        }
        true
    }

    /// Deliver until the wire is empty.
    pub fn run(&mut self) {
        let mut delivered = 0;
        while self.step() {
            delivered += 1;
            assert!(delivered < MAX_DELIVERIES, "network did not settle");
        }
    }

    /// Deliver until `done` holds. Returns false if the wire drained first.
    pub fn run_until(&mut self, done: impl Fn(&SimNet) -> bool) -> bool {
        while !done(self) {
            if !self.step() {
                return false;
            }
        }
        true
    }
}

/// Reassemble datagrams back into `(recipient, message)` pairs.
pub fn decode_all<'a>(datagrams: impl Iterator<Item = &'a Datagram>) -> Vec<(SocketAddr, Message)> {
    let mut reassembler = Reassembler::new();
    datagrams
        .filter_map(|d| match reassembler.push(d.to, &d.bytes) {
            Ok(Some(bytes)) => decode(&bytes).ok().map(|message| (d.to, message)),
            _ => None,
        })
        .collect()
}
