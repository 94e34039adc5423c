//! # Ports Layer
//!
//! - `ProofOfWork`: difficulty, nonce search/verify, reward schedule
//! - `ExtensionPolicy`: payload semantics for domain-specific ledgers
//! - `Clock`: time source for block timestamps

pub mod outbound;

pub use outbound::{Clock, ExtensionPolicy, ProofOfWork};
