//! # Core Domain Entities
//!
//! Defines the ledger entities exchanged between subsystems and peers.
//!
//! ## Clusters
//!
//! - **Chain**: `Transaction`, `Header`, `Block`
//! - **Identity**: `Party`, `PublicKey`, `Signature`
//!
//! All entities are immutable once built. Hashes are computed over an explicit
//! field-by-field encoding so they never depend on the wire codec.

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};
use sha2::{Digest, Sha256};
use std::fmt;

// =============================================================================
// CLUSTER A: PRIMITIVES
// =============================================================================

/// A 32-byte SHA-256 hash.
pub type Hash = [u8; 32];

/// A 64-byte Ed25519 signature.
pub type Signature = [u8; 64];

/// A 32-byte Ed25519 public key.
pub type PublicKey = [u8; 32];

/// The all-zero hash. Used for genesis linkage and as the empty Merkle root.
pub const ZERO_HASH: Hash = [0u8; 32];

/// Signature carried by reward transactions (no key signs them).
pub const REWARD_SIGNATURE: Signature = [0u8; 64];

/// Ledger protocol version produced and accepted by this node.
pub const LEDGER_VERSION: f64 = 1.0;

/// Fixed genesis timestamp (Unix seconds).
pub const GENESIS_TIMESTAMP: f64 = 1_500_000_000.0;

/// Fixed genesis proof, the seed of the first nonce search.
pub const GENESIS_PROOF: u64 = 100;

/// Compute SHA-256 of `data`.
#[inline]
pub fn sha256(data: &[u8]) -> Hash {
    Sha256::digest(data).into()
}

// =============================================================================
// CLUSTER B: IDENTITY
// =============================================================================

/// A transaction endpoint.
///
/// `System` only ever appears as a sender (block rewards) and `Escrow` only as
/// a recipient (funds held by an extension policy).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Party {
    /// The issuing system (reward transactions).
    System,
    /// Funds held in escrow by an extension policy.
    Escrow,
    /// A key-identified account.
    Key(PublicKey),
}

impl Party {
    /// Returns the key if this party is a key-identified account.
    pub fn key(&self) -> Option<&PublicKey> {
        match self {
            Self::Key(key) => Some(key),
            _ => None,
        }
    }

    fn hash_into(&self, hasher: &mut Sha256) {
        match self {
            Self::System => hasher.update([0u8]),
            Self::Escrow => hasher.update([1u8]),
            Self::Key(key) => {
                hasher.update([2u8]);
                hasher.update(key);
            }
        }
    }
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::System => write!(f, "system"),
            Self::Escrow => write!(f, "escrow"),
            Self::Key(key) => write!(f, "{}", hex::encode(key)),
        }
    }
}

// =============================================================================
// CLUSTER C: THE CHAIN
// =============================================================================

/// A signed value transfer, optionally carrying a domain operation.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Paying party (`Party::System` for rewards).
    pub sender: Party,
    /// Receiving party.
    pub recipient: Party,
    /// Amount transferred in base units.
    pub amount: u64,
    /// Fee paid to the miner of the including block.
    pub fee: u64,
    /// Creation time (Unix seconds).
    pub timestamp: f64,
    /// Opaque domain operation; empty for a plain transfer.
    pub payload: Vec<u8>,
    /// Sender's signature over [`Transaction::signing_hash`].
    #[serde_as(as = "Bytes")]
    pub signature: Signature,
}

impl Transaction {
    /// Build the reward transaction crediting `miner`.
    pub fn reward(miner: PublicKey, amount: u64, timestamp: f64) -> Self {
        Self {
            sender: Party::System,
            recipient: Party::Key(miner),
            amount,
            fee: 0,
            timestamp,
            payload: Vec::new(),
            signature: REWARD_SIGNATURE,
        }
    }

    /// Canonical hash of (sender, recipient, amount, fee, payload, timestamp).
    ///
    /// This is the message signed by the sender.
    pub fn signing_hash(&self) -> Hash {
        let mut hasher = Sha256::new();
        self.sender.hash_into(&mut hasher);
        self.recipient.hash_into(&mut hasher);
        hasher.update(self.amount.to_le_bytes());
        hasher.update(self.fee.to_le_bytes());
        hasher.update((self.payload.len() as u64).to_le_bytes());
        hasher.update(&self.payload);
        hasher.update(self.timestamp.to_bits().to_le_bytes());
        hasher.finalize().into()
    }

    /// Identity of the transaction: hash of the signed content plus signature.
    ///
    /// Used as the Merkle leaf and for duplicate detection.
    pub fn id(&self) -> Hash {
        let mut hasher = Sha256::new();
        hasher.update(self.signing_hash());
        hasher.update(self.signature);
        hasher.finalize().into()
    }

    /// True for the system-issued miner reward.
    pub fn is_reward(&self) -> bool {
        self.sender == Party::System && self.signature == REWARD_SIGNATURE
    }

    /// Amount plus fee, the total debited from the sender.
    pub fn total_cost(&self) -> u64 {
        self.amount.saturating_add(self.fee)
    }
}

/// Content-addressed block metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Header {
    /// Ledger protocol version.
    pub version: f64,
    /// Position in the chain (genesis is 0).
    pub index: u64,
    /// Creation time (Unix seconds).
    pub timestamp: f64,
    /// `root_hash` of the predecessor header.
    pub previous_root_hash: Hash,
    /// Merkle root of this block's transactions.
    pub root_hash: Hash,
    /// Proof-of-work nonce.
    pub proof: u64,
}

impl Header {
    /// The fixed genesis header.
    pub fn genesis() -> Self {
        Self {
            version: LEDGER_VERSION,
            index: 0,
            timestamp: GENESIS_TIMESTAMP,
            previous_root_hash: ZERO_HASH,
            root_hash: ZERO_HASH,
            proof: GENESIS_PROOF,
        }
    }
}

/// A header with its ordered transaction list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Block metadata.
    pub header: Header,
    /// Ordered transactions, reward last when built locally.
    pub transactions: Vec<Transaction>,
}

impl Block {
    /// The genesis block: genesis header and no transactions.
    pub fn genesis() -> Self {
        Self {
            header: Header::genesis(),
            transactions: Vec::new(),
        }
    }

    /// The block's reward transactions (valid blocks carry exactly one).
    pub fn rewards(&self) -> impl Iterator<Item = &Transaction> {
        self.transactions.iter().filter(|tx| tx.is_reward())
    }

    /// Sum of fees over non-reward transactions.
    pub fn total_fees(&self) -> u64 {
        self.transactions
            .iter()
            .filter(|tx| !tx.is_reward())
            .fold(0u64, |acc, tx| acc.saturating_add(tx.fee))
    }

    /// True if a transaction with the same identity is included.
    pub fn contains(&self, tx: &Transaction) -> bool {
        let id = tx.id();
        self.transactions.iter().any(|t| t.id() == id)
    }
}
