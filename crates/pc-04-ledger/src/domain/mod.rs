//! # Domain Layer
//!
//! Chain, pool, validation rules and fork buffer. No I/O.

pub mod balances;
pub mod chain;
pub mod fork;
pub mod merkle;
pub mod policy;
pub mod pool;
pub mod pow;
pub mod validation;

pub use balances::{effect_on, Balances};
pub use chain::Chain;
pub use fork::{ForkBuffer, Slot};
pub use merkle::{canonical_order, merkle_root};
pub use policy::PlainTransfers;
pub use pool::Pool;
pub use pow::{LeadingZeroHex, HALVING_INTERVAL, INITIAL_SUBSIDY};
pub use validation::{validate_header, BlockValidator};
