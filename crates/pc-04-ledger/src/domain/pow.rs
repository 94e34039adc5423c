//! Default proof-of-work strategy.

use crate::ports::ProofOfWork;
use shared_crypto::sha256;
use shared_types::{Hash, PublicKey};

/// Initial block subsidy.
pub const INITIAL_SUBSIDY: u64 = 50;

/// Blocks between subsidy halvings.
pub const HALVING_INTERVAL: u64 = 10;

/// Leading-zero-hex-digit proof of work.
///
/// - difficulty `d = max(floor(ln(predecessor_index) / 2), 1)`
/// - a nonce is valid when `sha256("{previous_proof}{nonce}{miner_hex}")` has
///   at least `d` leading `'0'` hex digits
/// - the subsidy halves every [`HALVING_INTERVAL`] blocks; a subsidy of 1
///   collapses to 0
#[derive(Debug, Default, Clone, Copy)]
pub struct LeadingZeroHex;

impl ProofOfWork for LeadingZeroHex {
    fn difficulty(&self, predecessor_index: u64) -> usize {
        if predecessor_index < 2 {
            return 1;
        }
        let d = ((predecessor_index as f64).ln() / 2.0).floor() as usize;
        d.max(1)
    }

    fn proof_hash(&self, previous_proof: u64, nonce: u64, miner: &PublicKey) -> Hash {
        let input = format!("{}{}{}", previous_proof, nonce, hex::encode(miner));
        sha256(input.as_bytes())
    }

    fn subsidy(&self, index: u64) -> u64 {
        let halvings = index / HALVING_INTERVAL;
        let subsidy = if halvings >= 64 {
            0
        } else {
            INITIAL_SUBSIDY >> halvings
        };
        if subsidy <= 1 {
            0
        } else {
            subsidy
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_crypto::leading_zero_hex_digits;
    use std::sync::atomic::AtomicBool;

    #[test]
    fn test_difficulty_schedule() {
        let pow = LeadingZeroHex;
        assert_eq!(pow.difficulty(0), 1);
        assert_eq!(pow.difficulty(1), 1);
        assert_eq!(pow.difficulty(7), 1);
        assert_eq!(pow.difficulty(8), 1); // ln(8)/2 = 1.04
        assert_eq!(pow.difficulty(55), 2); // ln(55)/2 = 2.0036
        assert_eq!(pow.difficulty(54), 1);
        assert_eq!(pow.difficulty(500), 3);
    }

    #[test]
    fn test_subsidy_schedule() {
        let pow = LeadingZeroHex;
        assert_eq!(pow.subsidy(1), 50);
        assert_eq!(pow.subsidy(9), 50);
        assert_eq!(pow.subsidy(10), 25);
        assert_eq!(pow.subsidy(20), 12);
        assert_eq!(pow.subsidy(30), 6);
        assert_eq!(pow.subsidy(40), 3);
        assert_eq!(pow.subsidy(50), 0); // 1 collapses to 0
        assert_eq!(pow.subsidy(u64::MAX), 0);
    }

    #[test]
    fn test_search_finds_verifiable_nonce() {
        let pow = LeadingZeroHex;
        let miner = [7u8; 32];
        let cancel = AtomicBool::new(false);

        let nonce = pow.search(100, &miner, 2, &cancel).unwrap();

        assert!(pow.verify(100, nonce, &miner, 2));
        assert!(leading_zero_hex_digits(&pow.proof_hash(100, nonce, &miner)) >= 2);
    }

    #[test]
    fn test_proof_bound_to_miner() {
        let pow = LeadingZeroHex;
        let cancel = AtomicBool::new(false);
        let nonce = pow.search(100, &[7u8; 32], 1, &cancel).unwrap();
        assert_ne!(
            pow.proof_hash(100, nonce, &[7u8; 32]),
            pow.proof_hash(100, nonce, &[8u8; 32])
        );
    }

    #[test]
    fn test_cancelled_search_returns_none() {
        let pow = LeadingZeroHex;
        let cancel = AtomicBool::new(true);
        assert_eq!(pow.search(100, &[7u8; 32], 64, &cancel), None);
    }
}
