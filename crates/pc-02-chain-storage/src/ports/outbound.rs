//! # Driven Ports (Outbound SPI)

use crate::domain::StorageError;
use shared_types::Block;

/// Durable chain store with a save/load round-trip contract.
///
/// `load` after `save(blocks)` returns `blocks` exactly. A store that has
/// never been written loads as the genesis chain.
pub trait ChainStore: Send {
    /// Read the whole chain, genesis first.
    fn load(&self) -> Result<Vec<Block>, StorageError>;

    /// Replace the stored chain with `blocks`.
    fn save(&mut self, blocks: &[Block]) -> Result<(), StorageError>;
}
