use thiserror::Error;

/// Every fallible outcome the crate can produce.
#[derive(Debug, Error)]
pub enum MinerError {
    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error("unknown activity referenced: {0}")]
    UnknownActivity(String),

    #[error("duplicate directly-follows pair in windowed batch: {0} -> {1}")]
    DuplicateDirectlyFollows(String, String),

    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MinerError>;
