//! # Proof-Chain Node Runtime
//!
//! Loads configuration and the node key, wires the ledger and transport
//! workers through their queues, and drives the interactive console.
//!
//! ## Modules
//!
//! - `container/` - Configuration sources and the signing key
//! - `console` - Line commands and UI rendering
//! - `runtime` - Worker wiring and lifecycle

pub mod console;
pub mod container;
pub mod runtime;

pub use container::{CliArgs, NodeConfig};
pub use runtime::NodeRuntime;
