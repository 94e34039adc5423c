//! Account balances derived by replaying transactions.

use shared_types::{Block, Party, Transaction};
use std::collections::HashMap;

/// Balance per party. Signed so a pending overdraft is representable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Balances {
    accounts: HashMap<Party, i128>,
}

impl Balances {
    /// Replay every transaction of `blocks`.
    pub fn from_blocks<'a>(blocks: impl IntoIterator<Item = &'a Block>) -> Self {
        let mut balances = Self::default();
        for block in blocks {
            balances.apply_block(block);
        }
        balances
    }

    /// Balance of `party` (0 if never seen).
    pub fn get(&self, party: &Party) -> i128 {
        self.accounts.get(party).copied().unwrap_or(0)
    }

    /// Apply one transaction. The system sender is never debited; fees are
    /// credited to the miner through the reward transaction.
    pub fn apply(&mut self, tx: &Transaction) {
        if tx.sender != Party::System {
            *self.accounts.entry(tx.sender).or_insert(0) -= i128::from(tx.total_cost());
        }
        *self.accounts.entry(tx.recipient).or_insert(0) += i128::from(tx.amount);
    }

    /// Apply every transaction of a block.
    pub fn apply_block(&mut self, block: &Block) {
        for tx in &block.transactions {
            self.apply(tx);
        }
    }
}

/// Net effect of `tx` on `party`.
pub fn effect_on(tx: &Transaction, party: &Party) -> i128 {
    let mut delta = 0i128;
    if tx.sender == *party && tx.sender != Party::System {
        delta -= i128::from(tx.total_cost());
    }
    if tx.recipient == *party {
        delta += i128::from(tx.amount);
    }
    delta
}
