//! Detached proof-of-work search.

use crate::ports::ProofOfWork;
use shared_types::{Block, PublicKey};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Candidate block plus everything needed to seal it off the ledger thread.
pub struct MiningJob {
    pub(crate) template: Block,
    pub(crate) previous_proof: u64,
    pub(crate) miner: PublicKey,
    pub(crate) difficulty: usize,
    pub(crate) cancel: Arc<AtomicBool>,
    pub(crate) pow: Arc<dyn ProofOfWork>,
}

impl MiningJob {
    /// Index of the block being mined.
    pub fn index(&self) -> u64 {
        self.template.header.index
    }

    pub fn difficulty(&self) -> usize {
        self.difficulty
    }

    /// Flag that aborts [`MiningJob::run`] when set.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    /// Search for a proof. Blocks the calling thread; returns `None` if
    /// cancelled first.
    pub fn run(self) -> Option<Block> {
        let nonce = self.pow.search(
            self.previous_proof,
            &self.miner,
            self.difficulty,
            &self.cancel,
        )?;
        let mut block = self.template;
        block.header.proof = nonce;
        Some(block)
    }
}

impl std::fmt::Debug for MiningJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MiningJob")
            .field("index", &self.index())
            .field("transactions", &self.template.transactions.len())
            .field("difficulty", &self.difficulty)
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
