//! Error types for the ledger subsystem
//!
//! Every rejection is non-fatal: the offending transaction, block or header
//! is dropped and logged, and chain/pool state is left untouched.

use pc_02_chain_storage::StorageError;
use thiserror::Error;

/// Why a transaction, header or block was refused.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RejectReason {
    #[error("A mined reward is pending; retry after the block is sealed")]
    MiningInProgress,

    #[error("Transaction is already in the tip block")]
    AlreadyInTip,

    #[error("Transaction is already pooled")]
    AlreadyPooled,

    #[error("Transaction is already in the chain")]
    AlreadyInChain,

    #[error("Transaction pool is full ({0} entries)")]
    PoolFull(usize),

    #[error("Reward transactions are only valid inside blocks")]
    UnexpectedReward,

    #[error("Sender must be a key account")]
    InvalidSender,

    #[error("Recipient not accepted: {0}")]
    InvalidRecipient(String),

    #[error("Invalid signature")]
    BadSignature,

    #[error("Amount must be positive")]
    ZeroAmount,

    #[error("Insufficient balance: available {available}, required {required}")]
    InsufficientBalance { available: i128, required: u64 },

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Invalid block index: expected {expected}, got {actual}")]
    BadIndex { expected: u64, actual: u64 },

    #[error("Previous root hash does not match the predecessor")]
    BrokenLink,

    #[error("Invalid timestamp: block {block} < parent {parent}")]
    NonMonotonicTimestamp { block: f64, parent: f64 },

    #[error("Unsupported version {version} (local {local})")]
    UnsupportedVersion { version: f64, local: f64 },

    #[error("Merkle root does not match the transactions")]
    MerkleMismatch,

    #[error("Expected exactly one reward transaction, found {0}")]
    RewardCount(usize),

    #[error("Reward must credit a key account")]
    BadRewardRecipient,

    #[error("Invalid reward amount: expected {expected}, got {actual}")]
    BadRewardAmount { expected: u64, actual: u64 },

    #[error("Proof of work does not meet difficulty {difficulty}")]
    BadProof { difficulty: usize },

    #[error("Transaction appears twice")]
    DuplicateTransaction,

    #[error("Genesis block does not match")]
    ForeignGenesis,

    #[error("Rejected by extension policy: {0}")]
    Policy(String),
}

/// Ledger error types
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Transaction rejected: {0}")]
    TransactionRejected(RejectReason),

    #[error("Block {index} rejected: {reason}")]
    BlockRejected { index: u64, reason: RejectReason },

    #[error("Header {index} rejected: {reason}")]
    HeaderRejected { index: u64, reason: RejectReason },

    #[error("Already mining block {0}")]
    AlreadyMining(u64),

    #[error("Fork resolution failed: {0}")]
    ForkRejected(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;
