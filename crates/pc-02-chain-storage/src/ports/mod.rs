//! # Ports Layer
//!
//! The durable store the ledger saves its chain into.

pub mod outbound;

pub use outbound::ChainStore;
