//! Domain Layer - Fragmentation protocol, configuration and errors

pub mod config;
pub mod errors;
pub mod fragment;

pub use config::*;
pub use errors::*;
pub use fragment::*;
