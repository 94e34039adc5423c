//! # Message Router
//!
//! Synchronous core of the transport worker. Turns outbound envelopes into
//! datagrams and inbound datagrams into ledger deliveries, answering network
//! control traffic itself. Owning no socket keeps it fully testable.

use crate::domain::{fragment, Reassembler, TransportConfig, TransportError};
use pc_01_peer_directory::{BootstrapProvider, PeerAction, PeerDirectoryService};
use shared_types::{
    decode, encode, Destination, Envelope, Inbound, Message, NetworkMessage, Notice,
};
use std::net::SocketAddr;
use tracing::{debug, trace, warn};

/// A side effect the worker must perform.
#[derive(Debug, Clone, PartialEq)]
pub enum Routed {
    /// Write one datagram.
    Send {
        /// Target peer.
        to: SocketAddr,
        /// Datagram bytes, control byte first.
        datagram: Vec<u8>,
    },
    /// Hand a message to the ledger inbound queue.
    Deliver(Inbound),
    /// Hand a message to the UI sink.
    Notify(Message),
}

/// Outbound/inbound classification and peer bookkeeping.
pub struct Router {
    peers: PeerDirectoryService,
    reassembler: Reassembler,
    config: TransportConfig,
}

impl Router {
    /// Create a router over a peer directory.
    pub fn new(peers: PeerDirectoryService, config: TransportConfig) -> Self {
        Self {
            peers,
            reassembler: Reassembler::new(),
            config,
        }
    }

    /// The peer directory.
    pub fn peers(&self) -> &PeerDirectoryService {
        &self.peers
    }

    /// Register another address of this node.
    pub fn add_own_address(&mut self, addr: SocketAddr) {
        self.peers.add_own_address(addr);
    }

    /// Seed peers from a bootstrap source; returns the resulting pings.
    pub fn seed(&mut self, source: &dyn BootstrapProvider) -> Vec<Routed> {
        let actions = self.peers.seed(source);
        self.perform(actions)
    }

    /// Route one envelope from the outbound queue.
    pub fn outbound(&mut self, envelope: Envelope) -> Vec<Routed> {
        let Envelope {
            message,
            destination,
        } = envelope;

        if let Message::Network(NetworkMessage::ListPeers) = message {
            return vec![Routed::Notify(Message::Notice(Notice::Peers {
                active: self.peers.active(),
                inactive: self.peers.inactive(),
            }))];
        }

        match destination {
            Destination::Peer(addr) => self.send(&[addr], &message),
            Destination::Broadcast => {
                let targets = self.peers.broadcast_peers();
                if targets.is_empty() {
                    debug!("[pc-03] No peers for broadcast of {}", message.tag());
                }
                self.send(&targets, &message)
            }
            Destination::Local => vec![Routed::Deliver(Inbound::local(message))],
            Destination::Gui => vec![Routed::Notify(message)],
        }
    }

    /// Route one datagram received from `from`.
    ///
    /// Malformed or incomplete input yields nothing.
    pub fn inbound(&mut self, from: SocketAddr, datagram: &[u8]) -> Vec<Routed> {
        let bytes = match self.reassembler.push(from, datagram) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return Vec::new(),
            Err(e) => {
                debug!("[pc-03] Dropping datagram from {}: {}", from, e);
                return Vec::new();
            }
        };

        let message = match decode(&bytes) {
            Ok(message) => message,
            Err(e) => {
                debug!("[pc-03] Dropping message from {}: {}", from, e);
                return Vec::new();
            }
        };
        trace!("[pc-03] {} from {}", message.tag(), from);

        let observed: Vec<PeerAction> = self.peers.observe(from).into_iter().collect();
        let mut out = self.perform(observed);
        match message {
            Message::Network(control) => out.extend(self.control(from, control)),
            message if message.is_peer_consensus() => {
                out.push(Routed::Deliver(Inbound::from_peer(message, from)))
            }
            message => debug!("[pc-03] Ignoring {} from peer {}", message.tag(), from),
        }
        out
    }

    /// Run liveness demotion.
    pub fn tick(&mut self) -> Vec<Routed> {
        let actions = self.peers.tick();
        self.perform(actions)
    }

    fn control(&mut self, from: SocketAddr, control: NetworkMessage) -> Vec<Routed> {
        match control {
            NetworkMessage::Ping => self.send(&[from], &Message::Network(NetworkMessage::Pong)),
            NetworkMessage::Pong => Vec::new(),
            NetworkMessage::GetPeers => {
                let peers = self.peers.gossip_for(&from);
                self.send(&[from], &Message::Network(NetworkMessage::NewPeers(peers)))
            }
            NetworkMessage::NewPeers(addrs) => {
                let actions = self.peers.learn_all(addrs);
                self.perform(actions)
            }
            NetworkMessage::ListPeers => Vec::new(),
        }
    }

    fn perform(&self, actions: Vec<PeerAction>) -> Vec<Routed> {
        actions
            .into_iter()
            .flat_map(|action| match action {
                PeerAction::Ping(addr) => self.send(&[addr], &Message::Network(NetworkMessage::Ping)),
                PeerAction::RequestPeers(addr) => {
                    self.send(&[addr], &Message::Network(NetworkMessage::GetPeers))
                }
            })
            .collect()
    }

    fn send(&self, targets: &[SocketAddr], message: &Message) -> Vec<Routed> {
        let datagrams = match encode(message)
            .map_err(TransportError::from)
            .and_then(|bytes| fragment(&bytes, self.config.datagram_budget))
        {
            Ok(datagrams) => datagrams,
            Err(e) => {
                warn!("[pc-03] Cannot send {}: {}", message.tag(), e);
                return Vec::new();
            }
        };

        targets
            .iter()
            .flat_map(|to| {
                datagrams.iter().map(move |datagram| Routed::Send {
                    to: *to,
                    datagram: datagram.clone(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pc_01_peer_directory::test_utils::ManualTimeSource;
    use pc_01_peer_directory::{LivenessConfig, PeerState, StaticBootstrap};
    use shared_types::{Header, Party, Transaction};

    fn addr(port: u16) -> SocketAddr {
        SocketAddr::from(([127, 0, 0, 1], port))
    }

    fn router(clock: &ManualTimeSource) -> Router {
        let peers = PeerDirectoryService::new(
            [addr(6666)],
            LivenessConfig::for_testing(),
            Box::new(clock.clone()),
        );
        Router::new(peers, TransportConfig::for_testing())
    }

    /// Datagrams for `message` as a peer would send them.
    fn wire(message: &Message) -> Vec<Vec<u8>> {
        fragment(&encode(message).unwrap(), TransportConfig::for_testing().datagram_budget).unwrap()
    }

    /// Reassemble every `Send` to `to` back into messages.
    fn sent_to(out: &[Routed], to: SocketAddr) -> Vec<Message> {
        let mut reassembler = Reassembler::new();
        out.iter()
            .filter_map(|routed| match routed {
                Routed::Send { to: t, datagram } if *t == to => {
                    reassembler.push(*t, datagram).unwrap()
                }
                _ => None,
            })
            .map(|bytes| decode(&bytes).unwrap())
            .collect()
    }

    fn receive(router: &mut Router, from: SocketAddr, message: &Message) -> Vec<Routed> {
        wire(message)
            .iter()
            .flat_map(|datagram| router.inbound(from, datagram))
            .collect()
    }

    fn big_transaction() -> Transaction {
        Transaction {
            sender: Party::Key([1; 32]),
            recipient: Party::Key([2; 32]),
            amount: 10,
            fee: 1,
            timestamp: 1_600_000_000.0,
            payload: vec![0x5a; 300],
            signature: [3; 64],
        }
    }

    #[test]
    fn test_ping_answered_with_pong_and_peer_request() {
        let clock = ManualTimeSource::new(1000);
        let mut router = router(&clock);

        let out = receive(&mut router, addr(1), &Message::Network(NetworkMessage::Ping));

        assert_eq!(
            sent_to(&out, addr(1)),
            vec![
                Message::Network(NetworkMessage::GetPeers),
                Message::Network(NetworkMessage::Pong),
            ]
        );
        assert_eq!(router.peers().state(&addr(1)), Some(PeerState::Active));
    }

    #[test]
    fn test_get_peers_answered_with_known_peers() {
        let clock = ManualTimeSource::new(1000);
        let mut router = router(&clock);
        router.seed(&StaticBootstrap::new(vec![addr(2), addr(3)]));

        let out = receive(&mut router, addr(1), &Message::Network(NetworkMessage::GetPeers));

        let replies = sent_to(&out, addr(1));
        assert!(replies.contains(&Message::Network(NetworkMessage::NewPeers(vec![addr(2), addr(3)]))));
    }

    #[test]
    fn test_new_peers_are_pinged_except_self() {
        let clock = ManualTimeSource::new(1000);
        let mut router = router(&clock);

        let gossip = Message::Network(NetworkMessage::NewPeers(vec![addr(4), addr(6666)]));
        let out = receive(&mut router, addr(1), &gossip);

        assert_eq!(sent_to(&out, addr(4)), vec![Message::Network(NetworkMessage::Ping)]);
        assert!(sent_to(&out, addr(6666)).is_empty());
        assert_eq!(router.peers().state(&addr(4)), Some(PeerState::Inferred));
    }

    #[test]
    fn test_large_consensus_message_delivered_once_complete() {
        let clock = ManualTimeSource::new(1000);
        let mut router = router(&clock);
        let message = Message::NewTransaction(big_transaction());
        let datagrams = wire(&message);
        assert!(datagrams.len() > 2);

        let mut delivered = Vec::new();
        for datagram in &datagrams {
            delivered.extend(router.inbound(addr(1), datagram).into_iter().filter_map(|r| match r {
                Routed::Deliver(inbound) => Some(inbound),
                _ => None,
            }));
        }

        assert_eq!(delivered, vec![Inbound::from_peer(message, addr(1))]);
    }

    #[test]
    fn test_local_intents_from_peer_dropped() {
        let clock = ManualTimeSource::new(1000);
        let mut router = router(&clock);

        for message in [Message::Mine, Message::Save, Message::Exit] {
            let out = receive(&mut router, addr(1), &message);
            assert!(!out.iter().any(|r| matches!(r, Routed::Deliver(_))));
        }
    }

    #[test]
    fn test_garbage_datagram_dropped() {
        let clock = ManualTimeSource::new(1000);
        let mut router = router(&clock);

        assert!(router.inbound(addr(1), &[0, 0xff, 0xff, 0xff, 0xff]).is_empty());
        assert!(router.inbound(addr(1), &[7]).is_empty());
        assert_eq!(router.peers().state(&addr(1)), None);
    }

    #[test]
    fn test_broadcast_fans_out_to_known_peers() {
        let clock = ManualTimeSource::new(1000);
        let mut router = router(&clock);
        router.seed(&StaticBootstrap::new(vec![addr(2), addr(3)]));

        let header = Header::genesis();
        let out = router.outbound(Envelope::broadcast(Message::NewHeader(header.clone())));

        for peer in [addr(2), addr(3)] {
            assert_eq!(sent_to(&out, peer), vec![Message::NewHeader(header.clone())]);
        }
    }

    #[test]
    fn test_local_and_gui_destinations() {
        let clock = ManualTimeSource::new(1000);
        let mut router = router(&clock);

        assert_eq!(
            router.outbound(Envelope::new(Message::Mine, Destination::Local)),
            vec![Routed::Deliver(Inbound::local(Message::Mine))]
        );
        let notice = Message::Notice(Notice::Saved { blocks: 1 });
        assert_eq!(
            router.outbound(Envelope::new(notice.clone(), Destination::Gui)),
            vec![Routed::Notify(notice)]
        );
    }

    #[test]
    fn test_list_peers_reports_directory() {
        let clock = ManualTimeSource::new(1000);
        let mut router = router(&clock);
        router.seed(&StaticBootstrap::new(vec![addr(2)]));
        receive(&mut router, addr(3), &Message::Network(NetworkMessage::Pong));

        let out = router.outbound(Envelope::new(
            Message::Network(NetworkMessage::ListPeers),
            Destination::Local,
        ));

        assert_eq!(
            out,
            vec![Routed::Notify(Message::Notice(Notice::Peers {
                active: vec![addr(3)],
                inactive: vec![addr(2)],
            }))]
        );
    }

    #[test]
    fn test_tick_pings_demoted_peers() {
        let clock = ManualTimeSource::new(1000);
        let mut router = router(&clock);
        receive(&mut router, addr(1), &Message::Network(NetworkMessage::Pong));

        clock.advance(LivenessConfig::for_testing().liveness_window_secs + 1);
        let out = router.tick();

        assert_eq!(sent_to(&out, addr(1)), vec![Message::Network(NetworkMessage::Ping)]);
        assert_eq!(router.peers().state(&addr(1)), Some(PeerState::Inactive));
    }
}
