//! The persisted chain image.

use super::errors::StorageError;
use serde::{Deserialize, Serialize};
use shared_types::{Block, Header};

/// Format version written into every chain file.
pub const CHAIN_FORMAT_VERSION: u16 = 1;

/// The whole chain as written to disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredChain {
    /// Layout version of this image.
    pub format_version: u16,
    /// Blocks in chain order, genesis first.
    pub blocks: Vec<Block>,
}

impl StoredChain {
    /// Wrap `blocks` for writing.
    pub fn new(blocks: Vec<Block>) -> Self {
        Self {
            format_version: CHAIN_FORMAT_VERSION,
            blocks,
        }
    }

    /// Check the image before handing its blocks to the ledger.
    ///
    /// An empty image stands for the genesis chain.
    pub fn into_blocks(self) -> Result<Vec<Block>, StorageError> {
        if self.format_version != CHAIN_FORMAT_VERSION {
            return Err(StorageError::UnsupportedFormat {
                found: self.format_version,
                expected: CHAIN_FORMAT_VERSION,
            });
        }
        if self.blocks.is_empty() {
            return Ok(genesis_chain());
        }
        if self.blocks[0].header != Header::genesis() {
            return Err(StorageError::Corrupt("first block is not genesis".into()));
        }
        Ok(self.blocks)
    }
}

/// The single-block genesis chain.
pub fn genesis_chain() -> Vec<Block> {
    vec![Block::genesis()]
}
