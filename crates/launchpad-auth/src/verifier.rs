//! Token verification
//!
//! Only the HMAC family is accepted. The allowed list is pinned here rather
//! than taken from the token header, so a token claiming `RS256` (or any
//! other scheme) is refused before its signature is even looked at.

use crate::issuer::SigningSecret;
use crate::{AuthError, ServiceClaims};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};

const HMAC_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

/// Validates inbound service identity tokens
#[derive(Clone)]
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(secret: &SigningSecret) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = HMAC_ALGORITHMS.to_vec();
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.validate_nbf = true;

        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Restrict accepted `iss` values. An empty list accepts any issuer.
    pub fn with_trusted_issuers<T: ToString>(mut self, issuers: &[T]) -> Self {
        if !issuers.is_empty() {
            self.validation.set_issuer(issuers);
        }
        self
    }

    /// Verify a raw token
    pub fn verify(&self, token: &str) -> Result<ServiceClaims, AuthError> {
        jsonwebtoken::decode::<ServiceClaims>(token, &self.key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                ErrorKind::ImmatureSignature => {
                    AuthError::Rejected("token is not valid yet".to_string())
                }
                ErrorKind::InvalidIssuer => {
                    AuthError::Rejected("token issuer is not trusted".to_string())
                }
                ErrorKind::MissingRequiredClaim(claim) => {
                    AuthError::Rejected(format!("token is missing the {} claim", claim))
                }
                _ => AuthError::InvalidToken(e.to_string()),
            })
    }

    /// Verify the value of an `Authorization` header
    pub fn verify_bearer(&self, header: Option<&str>) -> Result<ServiceClaims, AuthError> {
        let header = match header {
            Some(h) if !h.is_empty() => h,
            _ => return Err(AuthError::MissingHeader),
        };

        let parts: Vec<&str> = header.split(' ').collect();
        match parts.as_slice() {
            ["Bearer", token] if !token.is_empty() => self.verify(token),
            _ => Err(AuthError::InvalidFormat),
        }
    }
}
