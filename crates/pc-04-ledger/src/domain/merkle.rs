//! Merkle commitment over a block's transactions.
//!
//! Leaves are transaction ids ordered by transaction timestamp (ties broken
//! by id), so the root does not depend on the order transactions were
//! listed in. The leaf list is padded to a power of two by repeating the
//! last leaf, then hashed pairwise up to a single root.

use shared_types::{sha256, Hash, Transaction, ZERO_HASH};
use std::cmp::Ordering;

/// Canonical ordering of transactions for commitment and block application.
pub fn canonical_order(a: &Transaction, b: &Transaction) -> Ordering {
    a.timestamp
        .total_cmp(&b.timestamp)
        .then_with(|| a.id().cmp(&b.id()))
}

/// Merkle root of `transactions`. Empty lists commit to [`ZERO_HASH`].
pub fn merkle_root(transactions: &[Transaction]) -> Hash {
    if transactions.is_empty() {
        return ZERO_HASH;
    }

    let mut ordered: Vec<(f64, Hash)> = transactions
        .iter()
        .map(|tx| (tx.timestamp, tx.id()))
        .collect();
    ordered.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(&b.1)));

    let mut level: Vec<Hash> = ordered.into_iter().map(|(_, id)| id).collect();
    let width = level.len().next_power_of_two();
    if let Some(&last) = level.last() {
        level.resize(width, last);
    }

    while level.len() > 1 {
        level = level
            .chunks(2)
            .map(|pair| {
                let mut buf = [0u8; 64];
                buf[..32].copy_from_slice(&pair[0]);
                buf[32..].copy_from_slice(&pair[1]);
                sha256(&buf)
            })
            .collect();
    }
    level[0]
}
