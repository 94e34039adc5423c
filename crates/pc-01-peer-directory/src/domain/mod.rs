//! Domain Layer - Pure peer bookkeeping with no I/O
//!
//! - Peer records and their liveness states
//! - The directory state machine (learn, observe, tick)
//! - Broadcast fan-out selection

pub mod directory;
pub mod entities;
pub mod errors;
pub mod value_objects;

pub use directory::*;
pub use entities::*;
pub use errors::*;
pub use value_objects::*;
