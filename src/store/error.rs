//! Error types shared by every store capability

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    /// Connection could not be established or was lost
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The store accepted the call but the operation failed
    #[error("store operation failed: {0}")]
    OperationFailed(String),

    /// The call did not complete within the configured bound
    #[error("store call timed out after {0:?}")]
    Timeout(Duration),

    /// Malformed reply from a remote store
    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Whether the store itself could not be reached
    pub fn is_unavailable(&self) -> bool {
        matches!(self, StoreError::Unavailable(_) | StoreError::Io(_))
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
