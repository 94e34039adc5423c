//! # Shared Types Crate
//!
//! This crate contains the ledger entities, the message envelope and the wire
//! codec shared by every subsystem.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All cross-subsystem types are defined here.
//! - **Closed Message Set**: `Message` is an exhaustive enum; the transport
//!   drops anything that fails to decode.
//! - **Codec-Independent Hashes**: Entity hashes are computed field by field,
//!   never over the wire encoding.

pub mod codec;
pub mod entities;
pub mod errors;
pub mod messages;

pub use codec::{decode, decode_entity, encode, encode_entity, MAX_MESSAGE_BYTES};
pub use entities::*;
pub use errors::*;
pub use messages::*;
