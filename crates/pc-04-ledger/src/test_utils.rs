//! Test utilities for the ledger.
//!
//! # Example
//!
//! ```rust
//! use pc_04_ledger::test_utils::StepClock;
//! use pc_04_ledger::Clock;
//!
//! let clock = StepClock::new(1_600_000_000.0);
//! assert_eq!(clock.now(), 1_600_000_000.0);
//! assert_eq!(clock.now(), 1_600_000_001.0);
//! ```

use crate::domain::{merkle_root, Chain};
use crate::ports::{Clock, ProofOfWork};
use shared_crypto::{Ed25519KeyPair, Wallet};
use shared_types::{Block, Header, PublicKey, Transaction, LEDGER_VERSION};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub f64);

impl Clock for FixedClock {
    fn now(&self) -> f64 {
        self.0
    }
}

/// A clock that advances one second per reading, so every reading is
/// distinct. Clones share the same counter.
#[derive(Debug, Clone)]
pub struct StepClock {
    millis: Arc<AtomicU64>,
}

impl StepClock {
    pub fn new(start: f64) -> Self {
        Self {
            millis: Arc::new(AtomicU64::new((start * 1000.0) as u64)),
        }
    }
}

impl Clock for StepClock {
    fn now(&self) -> f64 {
        self.millis.fetch_add(1000, Ordering::SeqCst) as f64 / 1000.0
    }
}

/// Deterministic wallet from a one-byte seed.
pub fn wallet(seed: u8) -> Wallet {
    Wallet::new(Ed25519KeyPair::from_seed([seed; 32]))
}

/// Build and seal a valid successor of `chain`'s tip: `transfers` followed
/// by the reward for `miner`, with a searched proof.
pub fn seal_block(
    chain: &Chain,
    transfers: Vec<Transaction>,
    miner: PublicKey,
    timestamp: f64,
    pow: &dyn ProofOfWork,
) -> Block {
    let parent = &chain.tip().header;
    let index = parent.index + 1;
    let fees = transfers.iter().fold(0u64, |acc, tx| acc.saturating_add(tx.fee));

    let mut transactions = transfers;
    transactions.push(Transaction::reward(
        miner,
        pow.subsidy(index).saturating_add(fees),
        timestamp,
    ));

    let difficulty = pow.difficulty(parent.index);
    let proof = pow
        .search(parent.proof, &miner, difficulty, &AtomicBool::new(false))
        .unwrap_or_default();

    Block {
        header: Header {
            version: LEDGER_VERSION,
            index,
            timestamp: timestamp.max(parent.timestamp),
            previous_root_hash: parent.root_hash,
            root_hash: merkle_root(&transactions),
            proof,
        },
        transactions,
    }
}
