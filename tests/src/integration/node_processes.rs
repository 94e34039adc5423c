//! # Full Nodes Over UDP
//!
//! Two complete node runtimes on localhost sockets: configuration, peer
//! file bootstrap, both workers and the console command mapping.

#[cfg(test)]
mod tests {
    use node_runtime::console::{parse_command, Command};
    use node_runtime::runtime::QUEUE_CAPACITY;
    use node_runtime::{NodeConfig, NodeRuntime};
    use pc_04_ledger::test_utils::wallet;
    use shared_types::{Message, Notice, Party};
    use std::net::{IpAddr, Ipv4Addr, SocketAddr};
    use std::path::Path;
    use std::time::Duration;
    use tokio::sync::mpsc;
    use tokio::time::timeout;

    fn config(dir: &Path, name: &str, peers: &[SocketAddr]) -> NodeConfig {
        let mut config = NodeConfig::default();
        config.network.bind_address = IpAddr::V4(Ipv4Addr::LOCALHOST);
        config.network.p2p_port = 0;
        config.network.liveness_interval_ms = 100;
        config.network.peers_file = dir.join(format!("{name}-peers.txt"));
        config.storage.chain_file = dir.join(format!("{name}-chain.bin"));
        let lines: String = peers
            .iter()
            .map(|p| format!("{} {}\n", p.ip(), p.port()))
            .collect();
        std::fs::write(&config.network.peers_file, lines).unwrap();
        config
    }

    /// Wait for the first notice matching `pick`.
    async fn wait_for<T>(
        ui: &mut mpsc::Receiver<Message>,
        pick: impl Fn(&Notice) -> Option<T>,
    ) -> T {
        timeout(Duration::from_secs(30), async {
            loop {
                match ui.recv().await {
                    Some(Message::Notice(notice)) => {
                        if let Some(found) = pick(&notice) {
                            return found;
                        }
                    }
                    Some(_) => {}
                    None => panic!("UI queue closed"),
                }
            }
        })
        .await
        .expect("timed out waiting for a notice")
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_block_mined_on_one_node_reaches_the_other() {
        let dir = tempfile::tempdir().unwrap();
        let k = wallet(1);
        let other = wallet(2);

        let (ui1_tx, mut ui1) = mpsc::channel(QUEUE_CAPACITY);
        let node1 = NodeRuntime::spawn(&config(dir.path(), "n1", &[]), &k, ui1_tx)
            .await
            .unwrap();
        let (ui2_tx, mut ui2) = mpsc::channel(QUEUE_CAPACITY);
        let node2 = NodeRuntime::spawn(
            &config(dir.path(), "n2", &[node1.local_addr()]),
            &other,
            ui2_tx,
        )
        .await
        .unwrap();
        let node2_addr = node2.local_addr();

        // Node 1 must know node 2 before a broadcast can reach it.
        loop {
            let peers = parse_command("peers", &k, 0.0).unwrap().unwrap();
            node1.dispatch(peers).await.unwrap();
            let active = wait_for(&mut ui1, |n| match n {
                Notice::Peers { active, .. } => Some(active.clone()),
                _ => None,
            })
            .await;
            if active.contains(&node2_addr) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }

        let mine = parse_command("mine", &k, 0.0).unwrap().unwrap();
        node1.dispatch(mine).await.unwrap();
        let mined = wait_for(&mut ui1, |n| match n {
            Notice::BlockAccepted(h) => Some(h.clone()),
            _ => None,
        })
        .await;
        let received = wait_for(&mut ui2, |n| match n {
            Notice::BlockAccepted(h) => Some(h.clone()),
            _ => None,
        })
        .await;
        assert_eq!(received, mined);

        let balance = parse_command(&format!("balance {}", hex::encode(k.public_key())), &other, 0.0)
            .unwrap()
            .unwrap();
        assert!(matches!(balance, Command::Ledger(_)));
        node2.dispatch(balance).await.unwrap();
        let amount = wait_for(&mut ui2, |n| match n {
            Notice::Balance { party, amount } if *party == Party::Key(k.public_key()) => {
                Some(*amount)
            }
            _ => None,
        })
        .await;
        assert_eq!(amount, 50);

        let chain1 = node1.shutdown().await.unwrap();
        let chain2 = node2.shutdown().await.unwrap();
        assert_eq!(chain1.chain().headers(), chain2.chain().headers());
    }
}
