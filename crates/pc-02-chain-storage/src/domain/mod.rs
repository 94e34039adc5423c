//! Domain Layer - Stored chain image and storage errors

pub mod errors;
pub mod stored;

pub use errors::*;
pub use stored::*;
