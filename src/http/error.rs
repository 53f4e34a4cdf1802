//! API error type and its JSON rendering

use crate::ranking::RankingError;
use crate::store::StoreError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

/// Body of every error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("invalid {field}: {reason}")]
    ValidationFailed { field: String, reason: String },

    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("store operation failed: {0}")]
    StoreOperationFailed(String),
}

impl ApiError {
    /// A required parameter that is missing or blank
    pub fn missing(field: &str) -> Self {
        ApiError::ValidationFailed {
            field: field.to_string(),
            reason: "required".to_string(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::ValidationFailed { .. } => "VALIDATION_FAILED",
            Self::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            Self::StoreOperationFailed(_) => "STORE_OPERATION_FAILED",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::ValidationFailed { .. } => StatusCode::BAD_REQUEST,
            Self::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::StoreOperationFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn details(&self) -> Option<String> {
        match self {
            Self::ValidationFailed { field, .. } => Some(format!("field: {field}")),
            Self::StoreUnavailable(detail) | Self::StoreOperationFailed(detail) => Some(detail.clone()),
            Self::NotFound(_) => None,
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        let message = match self {
            Self::StoreUnavailable(_) => "A backing store is unavailable".to_string(),
            Self::StoreOperationFailed(_) => "A store operation failed".to_string(),
            other => other.to_string(),
        };
        ErrorResponse {
            code: self.code().to_string(),
            message,
            details: self.details(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        if err.is_unavailable() {
            ApiError::StoreUnavailable(err.to_string())
        } else {
            ApiError::StoreOperationFailed(err.to_string())
        }
    }
}

impl From<RankingError> for ApiError {
    fn from(err: RankingError) -> Self {
        match err {
            RankingError::Session(e) => e.into(),
            RankingError::Exhausted { primary, fallback } => {
                let detail = format!("{primary}; fallback: {fallback}");
                if fallback.is_unavailable() {
                    ApiError::StoreUnavailable(detail)
                } else {
                    ApiError::StoreOperationFailed(detail)
                }
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(code = self.code(), error = %self, "request failed");
        }
        (status, Json(self.to_response())).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
