//! Integration scenarios.

pub mod simnet;

mod ledger_sync;
mod node_processes;
mod peer_liveness;
