//! Header, transaction, block and chain validation.
//!
//! Validation is stateless: every check reads the predecessor chain and the
//! balances it implies, and never mutates them.

use super::balances::Balances;
use super::chain::Chain;
use super::merkle::{canonical_order, merkle_root};
use super::pool::Pool;
use crate::error::{LedgerError, LedgerResult, RejectReason};
use crate::ports::{ExtensionPolicy, ProofOfWork};
use shared_crypto::verify_transaction;
use shared_types::{Block, Header, Party, Transaction};
use std::collections::HashSet;

/// Check `header` against its `parent`: link, non-decreasing timestamp and
/// supported version. The index is checked by the caller.
pub fn validate_header(header: &Header, parent: &Header, local_version: f64) -> Result<(), RejectReason> {
    if header.previous_root_hash != parent.root_hash {
        return Err(RejectReason::BrokenLink);
    }
    if header.timestamp < parent.timestamp {
        return Err(RejectReason::NonMonotonicTimestamp {
            block: header.timestamp,
            parent: parent.timestamp,
        });
    }
    if header.version > local_version {
        return Err(RejectReason::UnsupportedVersion {
            version: header.version,
            local: local_version,
        });
    }
    Ok(())
}

/// Validation rules composed from the ledger's strategies.
pub struct BlockValidator<'a> {
    pub pow: &'a dyn ProofOfWork,
    pub policy: &'a dyn ExtensionPolicy,
    pub local_version: f64,
}

impl BlockValidator<'_> {
    /// Validate a non-reward transaction given the sender's `available`
    /// balance.
    pub fn validate_transaction(
        &self,
        tx: &Transaction,
        available: i128,
        chain: &[Block],
    ) -> Result<(), RejectReason> {
        if tx.is_reward() {
            return Err(RejectReason::UnexpectedReward);
        }
        if !matches!(tx.sender, Party::Key(_)) {
            return Err(RejectReason::InvalidSender);
        }
        verify_transaction(tx).map_err(|_| RejectReason::BadSignature)?;

        self.policy.validate_transaction(tx, chain)?;

        if tx.amount == 0 && !self.policy.allows_zero_amount(tx) {
            return Err(RejectReason::ZeroAmount);
        }
        let required = tx.total_cost();
        if available < i128::from(required) {
            return Err(RejectReason::InsufficientBalance {
                available,
                required,
            });
        }
        Ok(())
    }

    /// Validate `block` as the successor of `chain`'s tip.
    pub fn validate_block(&self, block: &Block, chain: &Chain) -> Result<(), RejectReason> {
        let parent = &chain.tip().header;
        let header = &block.header;

        let expected = parent.index + 1;
        if header.index != expected {
            return Err(RejectReason::BadIndex {
                expected,
                actual: header.index,
            });
        }
        validate_header(header, parent, self.local_version)?;

        if merkle_root(&block.transactions) != header.root_hash {
            return Err(RejectReason::MerkleMismatch);
        }

        let rewards: Vec<&Transaction> = block.rewards().collect();
        let [reward] = rewards.as_slice() else {
            return Err(RejectReason::RewardCount(rewards.len()));
        };
        let Some(miner) = reward.recipient.key() else {
            return Err(RejectReason::BadRewardRecipient);
        };

        let difficulty = self.pow.difficulty(parent.index);
        if !self.pow.verify(parent.proof, header.proof, miner, difficulty) {
            return Err(RejectReason::BadProof { difficulty });
        }

        let expected_reward = self
            .pow
            .subsidy(header.index)
            .saturating_add(block.total_fees());
        if reward.amount != expected_reward {
            return Err(RejectReason::BadRewardAmount {
                expected: expected_reward,
                actual: reward.amount,
            });
        }

        let mut seen = HashSet::with_capacity(block.transactions.len());
        for tx in &block.transactions {
            let id = tx.id();
            if chain.contains_tx(&id) || !seen.insert(id) {
                return Err(RejectReason::DuplicateTransaction);
            }
        }

        // Transfers are applied cumulatively in canonical order against the
        // pre-block balances.
        let mut transfers: Vec<&Transaction> =
            block.transactions.iter().filter(|tx| !tx.is_reward()).collect();
        transfers.sort_by(|a, b| canonical_order(a, b));

        let mut running = chain.balances().clone();
        for tx in transfers {
            self.validate_transaction(tx, running.get(&tx.sender), chain.blocks())?;
            running.apply(tx);
        }

        self.policy.validate_block(block, chain.blocks())
    }

    /// Validate a complete chain from genesis, pairwise. Returns the chain
    /// with its caches built.
    pub fn validate_chain(&self, blocks: Vec<Block>) -> LedgerResult<Chain> {
        let mut blocks = blocks.into_iter();
        match blocks.next() {
            Some(first) if first == Block::genesis() => {}
            _ => {
                return Err(LedgerError::BlockRejected {
                    index: 0,
                    reason: RejectReason::ForeignGenesis,
                })
            }
        }

        let mut chain = Chain::genesis();
        for block in blocks {
            self.validate_block(&block, &chain)
                .map_err(|reason| LedgerError::BlockRejected {
                    index: block.header.index,
                    reason,
                })?;
            chain.push(block);
        }
        Ok(chain)
    }

    /// Pick pooled transfers for the next block: canonical order, greedily
    /// skipping any the sender can no longer afford.
    pub fn select_for_block(&self, pool: &Pool, chain: &Chain) -> Vec<Transaction> {
        let mut running: Balances = chain.balances().clone();
        let mut selected = Vec::new();
        for tx in pool.ordered_transfers() {
            if chain.contains_tx(&tx.id()) {
                continue;
            }
            if running.get(&tx.sender) < i128::from(tx.total_cost()) {
                continue;
            }
            running.apply(&tx);
            selected.push(tx);
        }
        selected
    }
}
