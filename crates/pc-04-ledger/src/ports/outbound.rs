//! # Driven Ports (Outbound SPI)
//!
//! Strategies the ledger core is composed with.

use crate::error::RejectReason;
use shared_crypto::leading_zero_hex_digits;
use shared_types::{Block, Envelope, Hash, PublicKey, Transaction};
use std::sync::atomic::{AtomicBool, Ordering};

/// Nonces tried between two cancellation checks.
const CANCEL_CHECK_INTERVAL: u64 = 1024;

/// Pluggable proof-of-work acceptance policy.
pub trait ProofOfWork: Send + Sync {
    /// Required difficulty for the block following `predecessor_index`.
    fn difficulty(&self, predecessor_index: u64) -> usize;

    /// Hash of a candidate nonce.
    fn proof_hash(&self, previous_proof: u64, nonce: u64, miner: &PublicKey) -> Hash;

    /// Block subsidy at `index`, before fees.
    fn subsidy(&self, index: u64) -> u64;

    /// True if `nonce` meets `difficulty`.
    fn verify(&self, previous_proof: u64, nonce: u64, miner: &PublicKey, difficulty: usize) -> bool {
        leading_zero_hex_digits(&self.proof_hash(previous_proof, nonce, miner)) >= difficulty
    }

    /// Brute-force a nonce. Returns `None` once `cancel` is set.
    fn search(
        &self,
        previous_proof: u64,
        miner: &PublicKey,
        difficulty: usize,
        cancel: &AtomicBool,
    ) -> Option<u64> {
        let mut nonce = 0u64;
        loop {
            if nonce % CANCEL_CHECK_INTERVAL == 0 && cancel.load(Ordering::Relaxed) {
                return None;
            }
            if self.verify(previous_proof, nonce, miner, difficulty) {
                return Some(nonce);
            }
            nonce = nonce.wrapping_add(1);
        }
    }
}

/// Domain-specific transaction semantics plugged into the ledger.
///
/// The ledger enforces signatures, balances and proof of work; a policy adds
/// payload rules on top and may react to accepted transactions.
pub trait ExtensionPolicy: Send {
    /// Accept or refuse a transaction given the chain it would extend.
    fn validate_transaction(&self, tx: &Transaction, chain: &[Block]) -> Result<(), RejectReason>;

    /// True if `tx` may carry a zero amount.
    fn allows_zero_amount(&self, _tx: &Transaction) -> bool {
        false
    }

    /// Extra whole-block rules.
    fn validate_block(&self, _block: &Block, _chain: &[Block]) -> Result<(), RejectReason> {
        Ok(())
    }

    /// Called after a transaction enters the pool.
    fn apply_transaction_effects(&mut self, _tx: &Transaction) -> Vec<Envelope> {
        Vec::new()
    }

    /// Called after the canonical chain was replaced by a fork.
    fn on_chain_replaced(&mut self, _chain: &[Block]) {}
}

/// Wall clock for block and reward timestamps.
pub trait Clock: Send + Sync {
    /// Current Unix time in seconds.
    fn now(&self) -> f64;
}
