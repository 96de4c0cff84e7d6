use thiserror::Error;

/// Unified error type for the ledger mirror
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("wrong transaction format: {0}")]
    Format(String),

    #[error("Invalid ledger response: {0}")]
    InvalidResponse(String),

    #[error("Inconsistent data: transaction {seq_no} has no timestamp outside the genesis window")]
    InconsistentData { seq_no: u64 },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid range: start {start}, end {end} (available: {available})")]
    InvalidRange { start: u64, end: u64, available: u64 },

    #[error("Corrupted cache: {0}")]
    CorruptedCache(String),

    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience alias
pub type Result<T> = std::result::Result<T, LedgerError>;
