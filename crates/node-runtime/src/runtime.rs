//! # Node Runtime
//!
//! Wires the two workers together:
//!
//! ```text
//! console ──Inbound──→ ledger worker ──Envelope──→ transport worker ──UDP──→ peers
//!                          ↑                              │
//!                          └────────── Inbound ───────────┤
//!                                                         └──Message──→ UI sink
//! ```
//!
//! Each worker owns its state; the queues are created here and moved in.

use anyhow::{Context, Result};
use pc_01_peer_directory::{BootstrapFile, PeerDirectoryService, SystemTimeSource};
use pc_02_chain_storage::FileChainStore;
use pc_03_transport::{Router, TransportChannels, TransportWorker};
use pc_04_ledger::{
    LeadingZeroHex, Ledger, LedgerChannels, LedgerDependencies, LedgerWorker, PlainTransfers,
};
use shared_crypto::{Ed25519KeyPair, Wallet};
use shared_types::{Envelope, Inbound, Message, PublicKey};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::console::{self, Command};
use crate::container::{save_key, NodeConfig};

/// Capacity of each inter-worker queue.
pub const QUEUE_CAPACITY: usize = 1024;

/// A running node.
pub struct NodeRuntime {
    public_key: PublicKey,
    local_addr: SocketAddr,
    ledger_tx: mpsc::Sender<Inbound>,
    outbound_tx: mpsc::Sender<Envelope>,
    ledger_task: JoinHandle<Ledger>,
    transport_task: JoinHandle<()>,
    ui_task: Option<JoinHandle<()>>,
}

impl NodeRuntime {
    /// Start the node and print UI messages to stdout.
    pub async fn start(config: &NodeConfig, wallet: &Wallet) -> Result<Self> {
        let (ui_tx, mut ui_rx) = mpsc::channel::<Message>(QUEUE_CAPACITY);
        let mut runtime = Self::spawn(config, wallet, ui_tx).await?;
        runtime.ui_task = Some(tokio::spawn(async move {
            while let Some(message) = ui_rx.recv().await {
                println!("{}", console::render(&message));
            }
        }));
        Ok(runtime)
    }

    /// Start the node with UI messages delivered to `ui`.
    pub async fn spawn(
        config: &NodeConfig,
        wallet: &Wallet,
        ui: mpsc::Sender<Message>,
    ) -> Result<Self> {
        let public_key = wallet.public_key();

        let ledger = Ledger::new(
            LedgerDependencies {
                config: config.ledger_config(),
                store: Box::new(FileChainStore::new(&config.storage.chain_file)),
                pow: Arc::new(LeadingZeroHex),
                policy: Box::new(PlainTransfers),
            },
            public_key,
        );

        let peers = PeerDirectoryService::new(
            Vec::<SocketAddr>::new(),
            config.liveness_config(),
            Box::new(SystemTimeSource::new()),
        );
        let router = Router::new(peers, config.transport_config());
        let mut transport =
            TransportWorker::bind(config.listen_addr(), router, config.transport_config())
                .await
                .with_context(|| format!("cannot listen on {}", config.listen_addr()))?;
        transport.seed(&BootstrapFile::new(&config.network.peers_file));
        let local_addr = transport.local_addr()?;

        let (ledger_tx, ledger_rx) = mpsc::channel(QUEUE_CAPACITY);
        let (outbound_tx, outbound_rx) = mpsc::channel(QUEUE_CAPACITY);

        let ledger_task = tokio::spawn(LedgerWorker::new(ledger).run(LedgerChannels {
            inbound: ledger_rx,
            inbound_tx: ledger_tx.clone(),
            outbound: outbound_tx.clone(),
        }));
        let transport_task = tokio::spawn(transport.run(TransportChannels {
            outbound: outbound_rx,
            inbound: ledger_tx.clone(),
            ui,
        }));

        info!("Node {} running on {}", hex::encode(public_key), local_addr);
        Ok(Self {
            public_key,
            local_addr,
            ledger_tx,
            outbound_tx,
            ledger_task,
            transport_task,
            ui_task: None,
        })
    }

    /// This node's public key.
    pub fn public_key(&self) -> PublicKey {
        self.public_key
    }

    /// Address the transport socket is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Enqueue a console command on its worker queue.
    ///
    /// Key and help commands are answered by the caller and ignored here.
    pub async fn dispatch(&self, command: Command) -> Result<()> {
        match command {
            Command::Ledger(inbound) => self
                .ledger_tx
                .send(inbound)
                .await
                .context("ledger worker has stopped"),
            Command::Transport(envelope) => self
                .outbound_tx
                .send(envelope)
                .await
                .context("transport worker has stopped"),
            Command::ShowKey | Command::ExportKey | Command::ImportKey(_) | Command::Help => Ok(()),
        }
    }

    /// Switch the node key: write it to `key_file` when one is configured,
    /// then credit future mining rewards to it. A block already being mined
    /// still pays the previous key.
    pub async fn import_key(
        &mut self,
        keypair: Ed25519KeyPair,
        key_file: Option<&Path>,
    ) -> Result<Wallet> {
        if let Some(path) = key_file {
            save_key(path, &keypair)?;
        }
        let wallet = Wallet::new(keypair);
        self.public_key = wallet.public_key();
        self.ledger_tx
            .send(Inbound::local(Message::SetMiner(self.public_key)))
            .await
            .context("ledger worker has stopped")?;
        info!("Node key is now {}", hex::encode(self.public_key));
        Ok(wallet)
    }

    /// Stop both workers and wait for them. Returns the final ledger.
    pub async fn shutdown(self) -> Result<Ledger> {
        if self.ledger_tx.send(Inbound::local(Message::Exit)).await.is_err() {
            debug!("Ledger worker already stopped");
        }
        drop(self.ledger_tx);
        drop(self.outbound_tx);

        let ledger = self.ledger_task.await.context("ledger worker panicked")?;
        self.transport_task
            .await
            .context("transport worker panicked")?;
        if let Some(ui) = self.ui_task {
            ui.await.context("UI printer panicked")?;
        }
        info!("Node stopped at block {}", ledger.chain().tip().header.index);
        Ok(ledger)
    }
}
