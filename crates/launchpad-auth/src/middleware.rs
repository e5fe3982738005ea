//! Bearer-token gate for axum routes

use crate::{AuthError, TokenVerifier};
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Reject requests without a valid service token.
///
/// Mount with `axum::middleware::from_fn_with_state(verifier, require_service_token)`.
/// On success the verified [`crate::ServiceClaims`] are available to handlers
/// through `Extension<ServiceClaims>`.
pub async fn require_service_token(
    State(verifier): State<Arc<TokenVerifier>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let header = match request.headers().get(AUTHORIZATION) {
        None => None,
        Some(value) => Some(value.to_str().map_err(|_| AuthError::InvalidFormat)?),
    };

    let claims = match verifier.verify_bearer(header) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::debug!(error = %e, path = %request.uri().path(), "Rejected service token");
            return Err(e);
        }
    };

    tracing::trace!(caller = %claims.service_name, "Authenticated service call");
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}
