use crate::domain::{StorageError, StoredChain};

/// Chain image serializer using bincode.
#[derive(Debug, Default, Clone, Copy)]
pub struct BincodeChainSerializer;

impl BincodeChainSerializer {
    /// Encode a chain image.
    pub fn serialize(&self, chain: &StoredChain) -> Result<Vec<u8>, StorageError> {
        bincode::serialize(chain).map_err(|e| StorageError::Serialization(e.to_string()))
    }

    /// Decode a chain image.
    pub fn deserialize(&self, data: &[u8]) -> Result<StoredChain, StorageError> {
        bincode::deserialize(data).map_err(|e| StorageError::Corrupt(e.to_string()))
    }
}
