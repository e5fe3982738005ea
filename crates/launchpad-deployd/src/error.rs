//! Error types for the deployment daemon

use crate::validator::ValidationError;
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
///
/// Everything the request path can fail with. Activation failures never
/// show up here; they end in a `Failed` deployment instead.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed service id in the path
    #[error("invalid service ID format")]
    InvalidId(#[source] IdError),

    /// Resource not found
    #[error("{0} not found")]
    NotFound(&'static str),

    /// The catalog could not answer whether the service exists
    #[error("failed to validate service")]
    Dependency(#[source] ValidationError),

    /// Storage error
    #[error("{context}")]
    Storage {
        context: &'static str,
        #[source]
        source: StorageError,
    },
}

impl ApiError {
    pub fn storage(context: &'static str) -> impl FnOnce(StorageError) -> ApiError {
        move |source| ApiError::Storage { context, source }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidId(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Dependency(_) | ApiError::Storage { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidId(_) => "INVALID_INPUT",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Dependency(ValidationError::Unauthorized { .. }) => "UPSTREAM_AUTH_FAILURE",
            ApiError::Dependency(_) => "UPSTREAM_ERROR",
            ApiError::Storage { .. } => "STORAGE_ERROR",
        }
    }

    fn detail(&self) -> Option<String> {
        match self {
            ApiError::InvalidId(e) => Some(e.to_string()),
            ApiError::NotFound(_) => None,
            ApiError::Dependency(e) => Some(e.to_string()),
            ApiError::Storage { source, .. } => Some(source.to_string()),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Dependency(err)
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
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(code = self.code(), error = ?self.detail(), "{}", self);
        }

        let body = ErrorResponse {
            error: self.to_string(),
            code: self.code().to_string(),
            msg: self.detail(),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Result type alias for daemon operations
pub type DaemonResult<T> = Result<T, DaemonError>;
