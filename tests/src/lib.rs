//! # Proof-Chain Test Suite
//!
//! Cross-subsystem scenarios. Unit tests live next to the code in each crate;
//! this crate runs the subsystems together.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── simnet.rs          # In-memory network of routers and ledgers
//!     ├── ledger_sync.rs     # Mining, relay and fork resolution over the wire
//!     ├── peer_liveness.rs   # Peer discovery and demotion
//!     └── node_processes.rs  # Full nodes over UDP on localhost
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p pc-tests
//! cargo test -p pc-tests integration::ledger_sync
//! ```

pub mod integration;
