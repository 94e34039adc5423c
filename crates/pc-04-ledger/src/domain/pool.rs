//! Pending transaction pool.

use super::balances::effect_on;
use super::merkle::canonical_order;
use crate::error::RejectReason;
use shared_types::{Hash, Party, Transaction};
use std::collections::HashSet;

/// Accepted transactions not yet committed, in arrival order.
///
/// At most one reward transaction is pooled at a time, and only while a
/// local mining job is running.
#[derive(Debug, Clone)]
pub struct Pool {
    entries: Vec<Transaction>,
    ids: HashSet<Hash>,
    capacity: usize,
}

impl Pool {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            ids: HashSet::new(),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Transaction> {
        self.entries.iter()
    }

    pub fn contains(&self, id: &Hash) -> bool {
        self.ids.contains(id)
    }

    /// True while a mining reward is pooled.
    pub fn has_reward(&self) -> bool {
        self.entries.iter().any(Transaction::is_reward)
    }

    /// Add a validated transaction.
    pub fn insert(&mut self, tx: Transaction) -> Result<(), RejectReason> {
        let id = tx.id();
        if self.ids.contains(&id) {
            return Err(RejectReason::AlreadyPooled);
        }
        if self.entries.len() >= self.capacity {
            return Err(RejectReason::PoolFull(self.capacity));
        }
        self.ids.insert(id);
        self.entries.push(tx);
        Ok(())
    }

    /// Pool a reward transaction, bypassing the capacity limit.
    pub fn insert_reward(&mut self, tx: Transaction) {
        if self.ids.insert(tx.id()) {
            self.entries.push(tx);
        }
    }

    /// Drop every transaction whose id is in `ids`.
    pub fn remove_ids(&mut self, ids: &HashSet<Hash>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|tx| !ids.contains(&tx.id()));
        self.ids.retain(|id| !ids.contains(id));
        before - self.entries.len()
    }

    /// Withdraw pooled reward transactions.
    pub fn withdraw_rewards(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|tx| !tx.is_reward());
        self.ids = self.entries.iter().map(Transaction::id).collect();
        before - self.entries.len()
    }

    /// Empty the pool, returning its contents.
    pub fn drain(&mut self) -> Vec<Transaction> {
        self.ids.clear();
        std::mem::take(&mut self.entries)
    }

    /// Net pending effect on `party` of pooled transfers stamped strictly
    /// before `before`.
    pub fn pending_effect_before(&self, party: &Party, before: f64) -> i128 {
        self.entries
            .iter()
            .filter(|tx| !tx.is_reward() && tx.timestamp < before)
            .map(|tx| effect_on(tx, party))
            .sum()
    }

    /// Net pending effect on `party` of every pooled transfer. An unsealed
    /// mining reward is not counted.
    pub fn pending_effect(&self, party: &Party) -> i128 {
        self.entries
            .iter()
            .filter(|tx| !tx.is_reward())
            .map(|tx| effect_on(tx, party))
            .sum()
    }

    /// Non-reward transactions in canonical (timestamp, id) order.
    pub fn ordered_transfers(&self) -> Vec<Transaction> {
        let mut txs: Vec<Transaction> = self
            .entries
            .iter()
            .filter(|tx| !tx.is_reward())
            .cloned()
            .collect();
        txs.sort_by(canonical_order);
        txs
    }
}
