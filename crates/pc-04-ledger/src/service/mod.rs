//! # Service Layer
//!
//! - `Ledger`: synchronous core, one message in, envelopes out
//! - `MiningJob`: proof search detached from the ledger state
//! - `LedgerWorker`: async task driving the core from its queues

mod core;
mod mining;
mod worker;

pub use self::core::{Ledger, LedgerDependencies};
pub use mining::MiningJob;
pub use worker::{LedgerChannels, LedgerWorker};
