//! # Ledger Subsystem
//!
//! **Subsystem ID:** 4
//!
//! The consensus engine: chain, transaction pool, validation, Merkle
//! commitment, proof of work and fork resolution.
//!
//! ## Architecture
//!
//! - **Domain Layer:** Chain, pool, balances, validation rules, fork buffer
//! - **Ports Layer:** `ProofOfWork`, `ExtensionPolicy`, `Clock`
//! - **Service Layer:** `Ledger` core and the async `LedgerWorker`
//! - **Adapters Layer:** System clock
//!
//! ## Processing Model
//!
//! The worker handles one inbound message at a time, so every chain and pool
//! mutation is linearized. Mining searches for a proof on the blocking pool
//! and reports back through the inbound queue; a competing tip or a fork
//! swap cancels it.
//!
//! ## Example
//!
//! ```rust
//! use pc_02_chain_storage::MemoryChainStore;
//! use pc_04_ledger::{LeadingZeroHex, Ledger, LedgerConfig, LedgerDependencies, PlainTransfers};
//! use shared_types::{Inbound, Message, Party};
//! use std::sync::Arc;
//!
//! let miner = [7u8; 32];
//! let mut ledger = Ledger::new(
//!     LedgerDependencies {
//!         config: LedgerConfig::for_testing(),
//!         store: Box::new(MemoryChainStore::new()),
//!         pow: Arc::new(LeadingZeroHex),
//!         policy: Box::new(PlainTransfers),
//!     },
//!     miner,
//! );
//!
//! ledger.handle(Inbound::local(Message::Mine));
//! assert_eq!(ledger.chain().tip().header.index, 1);
//! assert_eq!(ledger.balance(&Party::Key(miner)), 50);
//! ```

pub mod adapters;
pub mod config;
pub mod domain;
pub mod error;
pub mod ports;
pub mod service;
pub mod test_utils;

pub use adapters::SystemClock;
pub use config::LedgerConfig;
pub use domain::{
    merkle_root, validate_header, Balances, BlockValidator, Chain, ForkBuffer, LeadingZeroHex,
    PlainTransfers, Pool, Slot,
};
pub use error::{LedgerError, LedgerResult, RejectReason};
pub use ports::{Clock, ExtensionPolicy, ProofOfWork};
pub use service::{Ledger, LedgerChannels, LedgerDependencies, LedgerWorker, MiningJob};
