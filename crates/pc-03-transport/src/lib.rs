//! # Transport Subsystem
//!
//! **Subsystem ID:** 3
//!
//! Moves logical messages of any size between peers over a fixed-size,
//! unreliable datagram channel, and classifies what arrives.
//!
//! ## Architecture
//!
//! - **Domain Layer:** control-byte fragmentation and per-sender reassembly
//! - **Router:** envelope routing, network-control answers, peer bookkeeping
//!   (synchronous, no I/O)
//! - **Service Layer:** the tokio worker that owns the UDP socket
//!
//! ## Flow
//!
//! ```text
//! outbound queue --> Router::outbound --> fragment --> socket
//! socket --> Reassembler --> decode --> Router::inbound --> ledger queue
//!                                                     \--> control answers
//! ```

pub mod domain;
pub mod router;
pub mod service;

pub use domain::{fragment, ControlByte, Reassembler, TransportConfig, TransportError};
pub use router::{Routed, Router};
pub use service::{TransportChannels, TransportWorker};
