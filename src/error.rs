//! Error types for the tapes recording core.

use thiserror::Error;

/// Errors raised while canonically encoding or hashing nodes.
#[derive(Debug, Error)]
pub enum MerkleError {
    #[error("canonical encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Storage driver errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("node not found: {0}")]
    NotFound(String),

    /// Same hash, different identity payload: an observed SHA-256 collision.
    #[error("hash collision for {hash}: stored identity differs")]
    Conflict { hash: String },

    #[error("storage I/O error: {0}")]
    Io(String),

    #[error(transparent)]
    Merkle(#[from] MerkleError),
}

/// Publisher and event construction errors.
#[derive(Debug, Error)]
pub enum PublisherError {
    #[error("cannot create event with empty root hash")]
    EmptyRootHash,

    #[error("kafka brokers are required")]
    MissingBrokers,

    #[error("kafka topic is required")]
    MissingTopic,

    #[error("marshal event: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("publish timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("transport error: {0}")]
    Transport(String),
}

/// Worker pool construction errors.
#[derive(Debug, Error)]
pub enum PoolError {
    #[error("num_workers must be at least 1, got {0}")]
    InvalidWorkerCount(usize),
}

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
