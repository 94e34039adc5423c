//! # Ports Layer
//!
//! Driven ports (outbound SPI) this subsystem requires from adapters.

pub mod outbound;

pub use outbound::{BootstrapProvider, TimeSource};
