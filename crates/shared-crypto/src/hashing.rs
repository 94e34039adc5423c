//! # SHA-256 Hashing
//!
//! Hex helpers used by proof-of-work and by key identifiers in logs. The
//! digest itself lives with the entities it identifies.

pub use shared_types::{sha256, Hash};

/// Number of leading `'0'` hex digits in a hash.
pub fn leading_zero_hex_digits(hash: &Hash) -> usize {
    let mut count = 0;
    for byte in hash {
        if *byte == 0 {
            count += 2;
            continue;
        }
        if byte >> 4 == 0 {
            count += 1;
        }
        break;
    }
    count
}

/// Short hex prefix for log lines.
pub fn short_hex(bytes: &[u8]) -> String {
    hex::encode(&bytes[..bytes.len().min(4)])
}
