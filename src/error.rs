use thiserror::Error;

/// Error types for the airdrop engine
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Insufficient balance: available {available}, required {required}")]
    InsufficientBalance { available: u64, required: u64 },

    #[error("There must be at least one receiver")]
    EmptyReceiverSet,

    #[error("Invalid batch size {0}: must be between 1 and {max}", max = crate::plan::MAX_BATCH_SIZE)]
    InvalidBatchSize(usize),

    #[error("Amount error: {0}")]
    Amount(String),

    #[error("Address parsing error: {0}")]
    Address(String),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, Error>;
