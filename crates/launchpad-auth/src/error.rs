//! Error types for token issuance and verification

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Token errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No `Authorization` header on the request
    #[error("missing authorization header")]
    MissingHeader,

    /// Header present but not `Bearer <token>`
    #[error("invalid authorization format")]
    InvalidFormat,

    /// Unparseable token, bad signature or disallowed algorithm
    #[error("invalid token: {0}")]
    InvalidToken(String),

    /// Signature fine but `exp` has passed
    #[error("token expired")]
    Expired,

    /// Signature fine but the claims are not acceptable
    #[error("token validation failed: {0}")]
    Rejected(String),

    /// Unusable signing secret
    #[error("invalid signing secret: {0}")]
    InvalidSecret(String),

    /// Signing failed
    #[error("failed to sign token: {0}")]
    Signing(String),
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::MissingHeader
            | AuthError::InvalidFormat
            | AuthError::InvalidToken(_)
            | AuthError::Expired => StatusCode::UNAUTHORIZED,
            AuthError::Rejected(_) => StatusCode::FORBIDDEN,
            AuthError::InvalidSecret(_) | AuthError::Signing(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn summary(&self) -> &'static str {
        match self {
            AuthError::MissingHeader => "missing authorization header",
            AuthError::InvalidFormat => "invalid authorization format",
            AuthError::InvalidToken(_) => "invalid token",
            AuthError::Expired => "token expired",
            AuthError::Rejected(_) => "token validation failed",
            AuthError::InvalidSecret(_) | AuthError::Signing(_) => "token signing unavailable",
        }
    }

    fn detail(&self) -> String {
        match self {
            AuthError::MissingHeader => {
                "Authorization header with Bearer token is required".to_string()
            }
            AuthError::InvalidFormat => {
                "Authorization header must be in format: Bearer <token>".to_string()
            }
            AuthError::InvalidToken(msg)
            | AuthError::Rejected(msg)
            | AuthError::InvalidSecret(msg)
            | AuthError::Signing(msg) => msg.clone(),
            AuthError::Expired => "please obtain a new token".to_string(),
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
struct AuthErrorResponse {
    error: &'static str,
    msg: String,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = AuthErrorResponse {
            error: self.summary(),
            msg: self.detail(),
        };

        (self.status(), Json(body)).into_response()
    }
}
