//! # Node Container
//!
//! Configuration and identity loaded before any subsystem starts.

pub mod config;
pub mod keys;

pub use config::{CliArgs, ConfigError, NodeConfig};
pub use keys::{load_wallet, save_key};
