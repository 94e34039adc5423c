//! Ledger configuration

use shared_types::LEDGER_VERSION;

/// Ledger parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerConfig {
    /// Highest block version this node accepts, and the version it mines.
    pub local_version: f64,
    /// Maximum pending transactions.
    pub max_pool_size: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            local_version: LEDGER_VERSION,
            max_pool_size: 10_000,
        }
    }
}

impl LedgerConfig {
    /// Create a config suitable for testing
    pub fn for_testing() -> Self {
        Self {
            local_version: LEDGER_VERSION,
            max_pool_size: 16,
        }
    }
}
