use super::serializer::BincodeChainSerializer;
use crate::domain::{genesis_chain, StorageError, StoredChain};
use crate::ports::ChainStore;
use shared_types::Block;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Chain store backed by a single file.
///
/// The whole chain is rewritten on every save, atomically via a temp file
/// and rename.
pub struct FileChainStore {
    path: PathBuf,
    serializer: BincodeChainSerializer,
}

impl FileChainStore {
    /// Store the chain at `path`.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            serializer: BincodeChainSerializer,
        }
    }

    /// Path of the chain file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ChainStore for FileChainStore {
    fn load(&self) -> Result<Vec<Block>, StorageError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("[pc-02] No chain file at {}", self.path.display());
                return Ok(genesis_chain());
            }
            Err(e) => return Err(StorageError::io(&self.path, e)),
        };

        if bytes.is_empty() {
            tracing::info!("[pc-02] Chain file {} is empty", self.path.display());
            return Ok(genesis_chain());
        }

        let blocks = self.serializer.deserialize(&bytes)?.into_blocks()?;
        tracing::info!(
            "[pc-02] Loaded {} blocks from {} ({} bytes)",
            blocks.len(),
            self.path.display(),
            bytes.len()
        );
        Ok(blocks)
    }

    fn save(&mut self, blocks: &[Block]) -> Result<(), StorageError> {
        let bytes = self.serializer.serialize(&StoredChain::new(blocks.to_vec()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, e))?;
        }

        let temp_path = self.path.with_extension("tmp");
        let mut file =
            std::fs::File::create(&temp_path).map_err(|e| StorageError::io(&temp_path, e))?;
        file.write_all(&bytes)
            .map_err(|e| StorageError::io(&temp_path, e))?;
        file.sync_all()
            .map_err(|e| StorageError::io(&temp_path, e))?;

        std::fs::rename(&temp_path, &self.path).map_err(|e| StorageError::io(&self.path, e))?;

        tracing::debug!(
            "[pc-02] Saved {} blocks to {}",
            blocks.len(),
            self.path.display()
        );
        Ok(())
    }
}
