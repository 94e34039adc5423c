//! # Message Envelope
//!
//! The closed set of messages carried on the internal queues and on the wire.
//!
//! ## Routing
//!
//! - Ledger messages travel between the ledger worker and peers.
//! - `Network` messages are control traffic, consumed by the transport worker
//!   and never delivered to the ledger.
//! - `Notice` messages are produced for the UI sink only.
//!
//! Unknown tags are rejected at decode time by the wire codec.

use crate::entities::{Block, Header, Party, PublicKey, Transaction};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Where an outbound message goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Destination {
    /// A single peer.
    Peer(SocketAddr),
    /// Every peer in the broadcast fan-out set.
    Broadcast,
    /// Back into the local ledger inbound queue.
    Local,
    /// The UI sink.
    Gui,
}

/// Where an inbound message came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Received from a peer.
    Peer(SocketAddr),
    /// Produced by this node (UI, console, mining worker).
    Local,
}

impl Origin {
    /// Reply destination for a message from this origin.
    pub fn reply_to(&self) -> Destination {
        match self {
            Self::Peer(addr) => Destination::Peer(*addr),
            Self::Local => Destination::Gui,
        }
    }
}

/// Network control traffic, handled by the transport worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NetworkMessage {
    /// Liveness probe.
    Ping,
    /// Liveness answer.
    Pong,
    /// Request the receiver's known peer addresses.
    GetPeers,
    /// Gossiped peer addresses.
    NewPeers(Vec<SocketAddr>),
    /// Local request to report the peer directory to the UI sink.
    ListPeers,
}

/// Typed notifications for the UI sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Notice {
    /// A transaction entered the pool.
    TransactionAccepted(Transaction),
    /// A block became the new tip.
    BlockAccepted(Header),
    /// The canonical chain was replaced by a fork.
    ChainReplaced {
        /// Index of the new tip.
        tip_index: u64,
    },
    /// Answer to a balance query.
    Balance {
        /// Queried account.
        party: Party,
        /// Confirmed plus pending balance.
        amount: i128,
    },
    /// Chain summary: one entry per block.
    ChainDump(Vec<(Header, usize)>),
    /// Peer directory summary.
    Peers {
        /// Peers seen within the liveness window.
        active: Vec<SocketAddr>,
        /// Known peers outside the window.
        inactive: Vec<SocketAddr>,
    },
    /// Mining rewards now go to this key.
    MinerChanged(PublicKey),
    /// Persistence finished.
    Saved {
        /// Number of blocks written.
        blocks: usize,
    },
    /// A human-readable failure.
    Failure(String),
}

/// Every message kind the node understands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Message {
    /// Submit or relay a transaction.
    NewTransaction(Transaction),
    /// Submit or relay a full block.
    NewBlock(Block),
    /// Announce a new tip header.
    NewHeader(Header),
    /// Request the full block matching a header.
    GetBlock(Header),
    /// Request the complete header list.
    GetChain,
    /// Request the tip header.
    GetNewestBlock,
    /// A peer's complete header list, to be compared against ours.
    ResolveConflict(Vec<Header>),
    /// Start mining a block.
    Mine,
    /// Mining finished; the sealed block is submitted locally.
    Mined(Block),
    /// Query a balance (own key when `None`).
    PrintBalance(Option<PublicKey>),
    /// Persist the chain.
    Save,
    /// Report the chain to the UI sink.
    Dump,
    /// Credit future mining rewards to another key.
    SetMiner(PublicKey),
    /// Stop the receiving worker.
    Exit,
    /// Network control traffic.
    Network(NetworkMessage),
    /// UI notification.
    Notice(Notice),
}

impl Message {
    /// Short tag for logging.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::NewTransaction(_) => "new_transaction",
            Self::NewBlock(_) => "new_block",
            Self::NewHeader(_) => "new_header",
            Self::GetBlock(_) => "get_block",
            Self::GetChain => "get_chain",
            Self::GetNewestBlock => "get_newest_block",
            Self::ResolveConflict(_) => "resolve_conflict",
            Self::Mine => "mine",
            Self::Mined(_) => "mined",
            Self::PrintBalance(_) => "print_balance",
            Self::Save => "save",
            Self::Dump => "dump",
            Self::SetMiner(_) => "set_miner",
            Self::Exit => "exit",
            Self::Network(NetworkMessage::Ping) => "N_ping",
            Self::Network(NetworkMessage::Pong) => "N_pong",
            Self::Network(NetworkMessage::GetPeers) => "N_get_peers",
            Self::Network(NetworkMessage::NewPeers(_)) => "N_new_peer",
            Self::Network(NetworkMessage::ListPeers) => "N_list_peers",
            Self::Notice(_) => "notice",
        }
    }

    /// True for control traffic intercepted by the transport worker.
    pub fn is_network_control(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    /// True for consensus traffic a peer may hand to the ledger.
    ///
    /// Local intents (mining, key changes, persistence, queries, exit) and
    /// UI notices are never accepted from the network.
    pub fn is_peer_consensus(&self) -> bool {
        matches!(
            self,
            Self::NewTransaction(_)
                | Self::NewBlock(_)
                | Self::NewHeader(_)
                | Self::GetBlock(_)
                | Self::GetChain
                | Self::GetNewestBlock
                | Self::ResolveConflict(_)
        )
    }
}

/// An outbound message with its destination.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    /// The message.
    pub message: Message,
    /// Where it goes.
    pub destination: Destination,
}

impl Envelope {
    /// Build an envelope.
    pub fn new(message: Message, destination: Destination) -> Self {
        Self {
            message,
            destination,
        }
    }

    /// Shorthand for a broadcast envelope.
    pub fn broadcast(message: Message) -> Self {
        Self::new(message, Destination::Broadcast)
    }

    /// Shorthand for a UI notice.
    pub fn notice(notice: Notice) -> Self {
        Self::new(Message::Notice(notice), Destination::Gui)
    }
}

/// An inbound message with its origin.
#[derive(Debug, Clone, PartialEq)]
pub struct Inbound {
    /// The message.
    pub message: Message,
    /// Who sent it.
    pub origin: Origin,
}

impl Inbound {
    /// Message produced by this node.
    pub fn local(message: Message) -> Self {
        Self {
            message,
            origin: Origin::Local,
        }
    }

    /// Message received from `addr`.
    pub fn from_peer(message: Message, addr: SocketAddr) -> Self {
        Self {
            message,
            origin: Origin::Peer(addr),
        }
    }
}
