//! Error types for the catalog daemon

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use launchpad_types::IdError;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Daemon-level errors
#[derive(Debug, Error)]
pub enum DaemonError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Server startup error
    #[error("Server error: {0}")]
    Server(String),

    /// Storage error
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Storage-specific errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// Connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query error
    #[error("Query error: {0}")]
    Query(String),

    /// Query did not finish in time
    #[error("Query timed out after {0:?}")]
    Timeout(Duration),

    /// Invalid data
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// API-specific errors
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed identifier in the path
    #[error("invalid {entity} ID format")]
    InvalidId {
        entity: &'static str,
        #[source]
        source: IdError,
    },

    /// Malformed request body
    #[error("invalid request payload")]
    InvalidPayload(String),

    /// Resource not found
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Storage error
    #[error("{context}")]
    Storage {
        context: &'static str,
        #[source]
        source: StorageError,
    },
}

impl ApiError {
    pub fn invalid_id(entity: &'static str) -> impl FnOnce(IdError) -> ApiError {
        move |source| ApiError::InvalidId { entity, source }
    }

    pub fn storage(context: &'static str) -> impl FnOnce(StorageError) -> ApiError {
        move |source| ApiError::Storage { context, source }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, msg) = match &self {
            ApiError::InvalidId { source, .. } => {
                (StatusCode::BAD_REQUEST, "INVALID_INPUT", Some(source.to_string()))
            }
            ApiError::InvalidPayload(msg) => {
                (StatusCode::BAD_REQUEST, "INVALID_INPUT", Some(msg.clone()))
            }
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND", None),
            ApiError::Storage { source, .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "STORAGE_ERROR",
                Some(source.to_string()),
            ),
        };

        let body = ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
            msg,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Result type alias for daemon operations
pub type DaemonResult<T> = Result<T, DaemonError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_status_codes() {
        assert_eq!(
            ApiError::NotFound("service").into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::invalid_id("service")(IdError::InvalidLength(3))
                .into_response()
                .status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::storage("failed to fetch service")(StorageError::Query("boom".into()))
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(ApiError::NotFound("service").to_string(), "service not found");
        assert_eq!(
            ApiError::invalid_id("project")(IdError::InvalidLength(3)).to_string(),
            "invalid project ID format"
        );
    }
}
