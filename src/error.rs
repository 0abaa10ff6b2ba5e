//! Error types
//!
//! `StoreError` covers failures inside a bookmark store. `ApiError` is the
//! library surface: sorting, snapshot validation, configuration and I/O.

use crate::types::NodeId;
use thiserror::Error;

/// Failures raised by a [`crate::store::BookmarkStore`] implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("node not found: {0}")]
    NotFound(NodeId),

    #[error("invalid store operation: {0}")]
    InvalidOperation(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    #[error("encoding error: {0}")]
    Encoding(#[from] bincode::Error),
}

/// Library-level error.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("store operation failed for {id}: {reason}")]
    StoreOperationFailed { id: NodeId, reason: String },

    #[error("anchor folder '{0}' not found in snapshot")]
    MissingAnchor(String),

    #[error("reserved identity '{0}' used by a non-root node")]
    ReservedIdentity(NodeId),

    #[error("duplicate node identity: {0}")]
    DuplicateIdentity(NodeId),

    #[error("invalid node {id}: {reason}")]
    InvalidNode { id: NodeId, reason: String },

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<config::ConfigError> for ApiError {
    fn from(error: config::ConfigError) -> Self {
        ApiError::ConfigError(error.to_string())
    }
}
