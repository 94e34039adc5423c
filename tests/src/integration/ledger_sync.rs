//! # Ledger Sync Over The Wire
//!
//! Mining, transaction relay and fork resolution between nodes that only
//! talk through routers, fragmented datagrams and the message codec.

#[cfg(test)]
mod tests {
    use crate::integration::simnet::{SimNet, START};
    use pc_04_ledger::test_utils::wallet;
    use shared_types::{Message, Notice};

    fn notices(net: &SimNet, i: usize) -> Vec<Notice> {
        net.node(i)
            .ui
            .iter()
            .filter_map(|m| match m {
                Message::Notice(n) => Some(n.clone()),
                _ => None,
            })
            .collect()
    }

    fn headers(net: &SimNet, i: usize) -> Vec<shared_types::Header> {
        net.node(i).ledger.chain().headers()
    }

    // =============================================================================
    // MINING AND RELAY
    // =============================================================================

    #[test]
    fn test_mined_block_reaches_peer() {
        let k = wallet(1);
        let other = wallet(9);
        let mut net = SimNet::new(&[k.public_key(), other.public_key()]);
        net.connect(1, &[0]);

        net.local(0, Message::Mine);

        assert_eq!(net.node(0).ledger.chain().tip().header.index, 1);
        assert_eq!(headers(&net, 1), headers(&net, 0));
        assert_eq!(net.node(1).ledger.balance(&k.party()), 50);
        let tip = net.node(0).ledger.chain().tip().header.clone();
        assert!(notices(&net, 1).contains(&Notice::BlockAccepted(tip)));
    }

    #[test]
    fn test_relayed_transfer_is_mined_everywhere() {
        let k = wallet(1);
        let l = wallet(2);
        let other = wallet(9);
        let mut net = SimNet::new(&[k.public_key(), other.public_key()]);
        net.connect(1, &[0]);
        net.local(0, Message::Mine);

        let tx = k.transfer(l.party(), 10, 1, Vec::new(), START + 100.0);
        net.local(0, Message::NewTransaction(tx.clone()));
        assert!(net.node(1).ledger.pool().contains(&tx.id()));

        net.local(0, Message::Mine);

        let tip = net.node(1).ledger.chain().tip().clone();
        assert_eq!(tip.header.index, 2);
        assert!(tip.contains(&tx));
        assert_eq!(tip.rewards().next().map(|r| r.amount), Some(51));
        for i in 0..2 {
            let ledger = &net.node(i).ledger;
            assert_eq!(ledger.balance(&k.party()), 90);
            assert_eq!(ledger.balance(&l.party()), 10);
            assert!(ledger.pool().is_empty());
        }
    }

    #[test]
    fn test_transfer_submitted_on_peer_is_mined_by_miner() {
        let k = wallet(1);
        let l = wallet(2);
        let other = wallet(9);
        let mut net = SimNet::new(&[k.public_key(), other.public_key()]);
        net.connect(1, &[0]);
        net.local(0, Message::Mine);

        let tx = k.transfer(l.party(), 20, 2, Vec::new(), START + 100.0);
        net.local(1, Message::NewTransaction(tx.clone()));
        assert!(net.node(0).ledger.pool().contains(&tx.id()));
        assert!(matches!(
            notices(&net, 1).last(),
            Some(Notice::TransactionAccepted(accepted)) if *accepted == tx
        ));

        net.local(0, Message::Mine);
        assert!(net.node(1).ledger.chain().contains_tx(&tx.id()));
        assert_eq!(net.node(1).ledger.balance(&k.party()), 50 - 22 + 52);
    }

    #[test]
    fn test_late_joiner_syncs_on_startup() {
        let k = wallet(1);
        let other = wallet(9);
        let mut net = SimNet::new(&[k.public_key(), other.public_key()]);
        for _ in 0..3 {
            net.local(0, Message::Mine);
        }

        net.connect(1, &[0]);
        assert_eq!(net.node(1).ledger.chain().len(), 1);
        net.startup(1);

        // Every fetched block extends the tip, so it is adopted one by one.
        assert_eq!(headers(&net, 1), headers(&net, 0));
        assert!(net.node(1).ledger.fork().is_none());
        let accepted: Vec<u64> = notices(&net, 1)
            .iter()
            .filter_map(|n| match n {
                Notice::BlockAccepted(h) => Some(h.index),
                _ => None,
            })
            .collect();
        assert_eq!(accepted, vec![1, 2, 3]);
    }

    // =============================================================================
    // FORK RESOLUTION
    // =============================================================================

    #[test]
    fn test_partitioned_nodes_converge_on_longer_chain() {
        let k = wallet(1);
        let l = wallet(2);
        let m = wallet(3);
        let other = wallet(9);
        let mut net = SimNet::new(&[k.public_key(), other.public_key()]);
        net.connect(1, &[0]);

        // Shared block 1 pays K.
        net.local(0, Message::Mine);
        assert_eq!(headers(&net, 1), headers(&net, 0));

        net.isolate(1);

        // Node 0 extends to index 3.
        net.local(0, Message::Mine);
        net.local(0, Message::Mine);

        // Node 1 mines a competing block 2 with K -> L and keeps K -> M pending.
        let to_l = k.transfer(l.party(), 5, 0, Vec::new(), START + 100.0);
        net.local(1, Message::NewTransaction(to_l.clone()));
        net.local(1, Message::Mine);
        let to_m = k.transfer(m.party(), 3, 0, Vec::new(), START + 200.0);
        net.local(1, Message::NewTransaction(to_m.clone()));
        assert_eq!(net.node(1).ledger.chain().tip().header.index, 2);
        assert_ne!(headers(&net, 1)[2], headers(&net, 0)[2]);

        net.heal();
        net.startup(1);

        assert_eq!(headers(&net, 1), headers(&net, 0));
        assert!(net.node(1).ledger.fork().is_none());
        let pool = net.node(1).ledger.pool();
        assert!(pool.contains(&to_l.id()));
        assert!(pool.contains(&to_m.id()));
        assert_eq!(net.node(1).ledger.balance(&m.party()), 3);
        assert_eq!(net.node(1).ledger.balance(&l.party()), 5);
        assert!(notices(&net, 1).contains(&Notice::ChainReplaced { tip_index: 3 }));

        // The shorter chain never replaces the longer one.
        assert_eq!(net.node(0).ledger.chain().tip().header.index, 3);
    }

    #[test]
    fn test_readmitted_transfers_are_mined_after_swap() {
        let k = wallet(1);
        let l = wallet(2);
        let other = wallet(9);
        let mut net = SimNet::new(&[k.public_key(), other.public_key()]);
        net.connect(1, &[0]);
        net.local(0, Message::Mine);

        net.isolate(1);
        net.local(0, Message::Mine);
        net.local(0, Message::Mine);
        let tx = k.transfer(l.party(), 7, 1, Vec::new(), START + 100.0);
        net.local(1, Message::NewTransaction(tx.clone()));
        net.local(1, Message::Mine);

        net.heal();
        net.startup(1);
        assert!(net.node(1).ledger.pool().contains(&tx.id()));

        net.local(1, Message::Mine);
        assert_eq!(net.node(1).ledger.chain().tip().header.index, 4);
        assert_eq!(headers(&net, 0), headers(&net, 1));
        assert!(net.node(0).ledger.chain().contains_tx(&tx.id()));
        assert_eq!(net.node(0).ledger.balance(&l.party()), 7);
    }
}
