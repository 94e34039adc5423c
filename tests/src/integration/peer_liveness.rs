//! # Peer Liveness
//!
//! Discovery through gossip, promotion on first contact and demotion after
//! the liveness window, driven through real routers.

#[cfg(test)]
mod tests {
    use crate::integration::simnet::SimNet;
    use pc_01_peer_directory::{LivenessConfig, PeerState};
    use pc_04_ledger::test_utils::wallet;
    use shared_types::{Destination, Envelope, Message, NetworkMessage, Notice};

    fn three_nodes() -> SimNet {
        SimNet::new(&[
            wallet(1).public_key(),
            wallet(2).public_key(),
            wallet(3).public_key(),
        ])
    }

    #[test]
    fn test_handshake_activates_both_sides() {
        let mut net = three_nodes();
        let (a, b) = (net.node(0).addr, net.node(1).addr);

        net.connect(0, &[1]);

        assert_eq!(net.node(0).peer_state(b), Some(PeerState::Active));
        assert_eq!(net.node(1).peer_state(a), Some(PeerState::Active));
    }

    #[test]
    fn test_gossiped_peer_goes_inferred_then_active_then_inactive() {
        let mut net = three_nodes();
        let b = net.node(1).addr;
        let c = net.node(2).addr;

        // B and C know each other; A only knows C.
        net.connect(1, &[2]);
        net.seed(0, &[2]);

        // A hears about B from C before B has answered anything.
        assert!(net.run_until(|n| n.node(0).peer_state(b).is_some()));
        assert_eq!(net.node(0).peer_state(b), Some(PeerState::Inferred));

        // B answers A's ping.
        net.run();
        assert_eq!(net.node(0).peer_state(b), Some(PeerState::Active));
        assert_eq!(net.node(0).peer_state(c), Some(PeerState::Active));

        // Silence past the window demotes B and pings it again.
        net.peer_clock
            .advance(LivenessConfig::for_testing().liveness_window_secs + 1);
        let sent = net.tick(0);
        assert_eq!(net.node(0).peer_state(b), Some(PeerState::Inactive));
        assert!(sent.contains(&(b, Message::Network(NetworkMessage::Ping))));
        assert!(sent.contains(&(c, Message::Network(NetworkMessage::Ping))));

        // The reply brings it back.
        net.run();
        assert_eq!(net.node(0).peer_state(b), Some(PeerState::Active));
    }

    #[test]
    fn test_tick_within_window_keeps_peers_active() {
        let mut net = three_nodes();
        let b = net.node(1).addr;
        net.connect(0, &[1]);

        net.peer_clock
            .advance(LivenessConfig::for_testing().liveness_window_secs - 1);
        assert!(net.tick(0).is_empty());
        assert_eq!(net.node(0).peer_state(b), Some(PeerState::Active));
    }

    #[test]
    fn test_peer_listing_reports_demoted_peers() {
        let mut net = three_nodes();
        let b = net.node(1).addr;
        let c = net.node(2).addr;
        net.connect(0, &[1, 2]);

        net.peer_clock
            .advance(LivenessConfig::for_testing().liveness_window_secs + 1);
        net.tick(0);
        net.isolate(1);
        net.isolate(2);
        net.run();

        net.outbound(
            0,
            Envelope::new(Message::Network(NetworkMessage::ListPeers), Destination::Local),
        );
        let Some(Message::Notice(Notice::Peers { active, mut inactive })) =
            net.node(0).ui.last().cloned()
        else {
            panic!("expected a peer listing");
        };
        inactive.sort();
        let mut expected = vec![b, c];
        expected.sort();
        assert!(active.is_empty());
        assert_eq!(inactive, expected);
    }
}
