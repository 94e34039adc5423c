use crate::domain::{genesis_chain, StorageError};
use crate::ports::ChainStore;
use shared_types::Block;

/// In-memory chain store for tests and ephemeral nodes.
#[derive(Debug, Default, Clone)]
pub struct MemoryChainStore {
    blocks: Option<Vec<Block>>,
    saves: usize,
}

impl MemoryChainStore {
    /// Empty store (loads as genesis).
    pub fn new() -> Self {
        Self::default()
    }

    /// Store preloaded with `blocks`.
    pub fn with_blocks(blocks: Vec<Block>) -> Self {
        Self {
            blocks: Some(blocks),
            saves: 0,
        }
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> usize {
        self.saves
    }
}

impl ChainStore for MemoryChainStore {
    fn load(&self) -> Result<Vec<Block>, StorageError> {
        Ok(self.blocks.clone().unwrap_or_else(genesis_chain))
    }

    fn save(&mut self, blocks: &[Block]) -> Result<(), StorageError> {
        self.blocks = Some(blocks.to_vec());
        self.saves += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_round_trip() {
        let mut store = MemoryChainStore::new();
        assert_eq!(store.load().unwrap(), genesis_chain());

        let mut blocks = genesis_chain();
        blocks.push(Block::genesis());
        store.save(&blocks).unwrap();

        assert_eq!(store.load().unwrap(), blocks);
        assert_eq!(store.save_count(), 1);
    }
}
