//! Adapters Layer - Concrete implementations of the driven ports

pub mod bootstrap;
pub mod time;

pub use bootstrap::{parse_peer_line, parse_peer_list, BootstrapFile, StaticBootstrap, DEFAULT_PEERS};
pub use time::SystemTimeSource;
