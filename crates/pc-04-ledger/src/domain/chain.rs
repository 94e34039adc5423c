//! The canonical chain.

use super::balances::Balances;
use shared_types::{Block, Hash, Header, Transaction};
use std::collections::HashSet;

/// Append-only list of blocks with cached transaction ids and balances.
///
/// Invariant: `blocks[i].header.index == i` and
/// `blocks[i].header.previous_root_hash == blocks[i - 1].header.root_hash`.
/// Callers validate before [`Chain::push`]; the chain itself does not.
#[derive(Debug, Clone)]
pub struct Chain {
    blocks: Vec<Block>,
    tx_ids: HashSet<Hash>,
    balances: Balances,
}

#[allow(clippy::len_without_is_empty)]
impl Chain {
    /// A chain holding only the genesis block.
    pub fn genesis() -> Self {
        Self::from_blocks(vec![Block::genesis()])
    }

    /// Wrap already-validated blocks. An empty list yields genesis.
    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        if blocks.is_empty() {
            return Self::genesis();
        }
        let tx_ids = blocks
            .iter()
            .flat_map(|b| b.transactions.iter().map(Transaction::id))
            .collect();
        let balances = Balances::from_blocks(&blocks);
        Self {
            blocks,
            tx_ids,
            balances,
        }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn into_blocks(self) -> Vec<Block> {
        self.blocks
    }

    /// Last block. The chain is never empty.
    pub fn tip(&self) -> &Block {
        &self.blocks[self.blocks.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Header list, genesis first.
    pub fn headers(&self) -> Vec<Header> {
        self.blocks.iter().map(|b| b.header.clone()).collect()
    }

    /// Confirmed balances after the tip.
    pub fn balances(&self) -> &Balances {
        &self.balances
    }

    /// Ids of every confirmed transaction.
    pub fn tx_ids(&self) -> &HashSet<Hash> {
        &self.tx_ids
    }

    /// True if a transaction with this id is confirmed.
    pub fn contains_tx(&self, id: &Hash) -> bool {
        self.tx_ids.contains(id)
    }

    /// Block whose header equals `header`.
    pub fn block_for(&self, header: &Header) -> Option<&Block> {
        let index = usize::try_from(header.index).ok()?;
        self.blocks.get(index).filter(|b| b.header == *header)
    }

    /// Append a validated block.
    pub fn push(&mut self, block: Block) {
        self.tx_ids
            .extend(block.transactions.iter().map(Transaction::id));
        self.balances.apply_block(&block);
        self.blocks.push(block);
    }
}

impl Default for Chain {
    fn default() -> Self {
        Self::genesis()
    }
}
