//! Adapters Layer - file and in-memory chain stores

pub mod file;
pub mod memory;
pub mod serializer;

pub use file::FileChainStore;
pub use memory::MemoryChainStore;
pub use serializer::BincodeChainSerializer;
