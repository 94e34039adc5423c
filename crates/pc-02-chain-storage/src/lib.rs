//! # Chain Storage Subsystem
//!
//! **Subsystem ID:** 2
//!
//! Persists the whole chain to one file and reads it back. A missing or
//! empty file yields the genesis chain; any other failure is returned as a
//! [`StorageError`] for the caller to report.
//!
//! ## Architecture
//!
//! - **Domain Layer:** `StoredChain` image, `StorageError`
//! - **Ports Layer:** `ChainStore`
//! - **Adapters Layer:** `FileChainStore` (bincode, temp file + rename),
//!   `MemoryChainStore`

pub mod adapters;
pub mod domain;
pub mod ports;

pub use adapters::{FileChainStore, MemoryChainStore};
pub use domain::{genesis_chain, StorageError, StoredChain, CHAIN_FORMAT_VERSION};
pub use ports::ChainStore;
