//! # Peer Directory Subsystem
//!
//! **Subsystem ID:** 1
//!
//! Tracks known, active and inactive peers, issues liveness probes and
//! supplies the broadcast fan-out set to the transport.
//!
//! ## Architecture
//!
//! - **Domain Layer:** Peer records and the liveness state machine
//! - **Ports Layer:** `TimeSource` and `BootstrapProvider`
//! - **Service Layer:** Wires domain to ports
//! - **Adapters Layer:** System clock and the `host port` peer file
//!
//! ## Example
//!
//! ```rust
//! use pc_01_peer_directory::{LivenessConfig, PeerAction, PeerDirectory, PeerState, Timestamp};
//! use std::net::SocketAddr;
//!
//! let own: SocketAddr = "127.0.0.1:6666".parse().unwrap();
//! let peer: SocketAddr = "127.0.0.1:7000".parse().unwrap();
//! let mut dir = PeerDirectory::new([own], LivenessConfig::default());
//!
//! assert_eq!(dir.learn(peer, Timestamp::new(0)), Ok(Some(PeerAction::Ping(peer))));
//! dir.observe(peer, Timestamp::new(1));
//! assert_eq!(dir.state(&peer), Some(PeerState::Active));
//! ```

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;
pub mod test_utils;

pub use adapters::{BootstrapFile, StaticBootstrap, SystemTimeSource};
pub use domain::{
    LivenessConfig, PeerAction, PeerDirectory, PeerDirectoryError, PeerRecord, PeerState,
    Timestamp,
};
pub use ports::{BootstrapProvider, TimeSource};
pub use service::PeerDirectoryService;
