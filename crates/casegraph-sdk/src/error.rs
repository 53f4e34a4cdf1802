//! Error types for the CaseGraph SDK

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CaseGraphError {
    /// The requested resource does not exist (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// The server rejected the request parameters (400)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Any other non-success response
    #[error("Server error {status} ({code}): {message}")]
    ServerError { status: u16, code: String, message: String },

    /// Invalid base URL or request path
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type CaseGraphResult<T> = Result<T, CaseGraphError>;
