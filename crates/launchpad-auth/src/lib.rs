//! Service identity tokens
//!
//! Peers authenticate each other with short-lived HMAC-signed JWTs carrying
//! the caller's service name. The issuing side mints one token per outbound
//! call; the receiving side gates protected routes with
//! [`require_service_token`].
//!
//! ```text
//! deployd ──(TokenIssuer::issue)──► Authorization: Bearer <jwt> ──► catalogd
//!                                                                   │
//!                                             require_service_token ┘
//!                                             (TokenVerifier::verify_bearer)
//! ```

#![deny(unsafe_code)]

mod claims;
mod error;
mod issuer;
mod middleware;
mod verifier;

pub use claims::ServiceClaims;
pub use error::AuthError;
pub use issuer::{SigningSecret, TokenIssuer, DEFAULT_TOKEN_TTL_SECS};
pub use middleware::require_service_token;
pub use verifier::TokenVerifier;
