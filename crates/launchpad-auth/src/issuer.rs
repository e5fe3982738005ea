//! Token issuance

use crate::{AuthError, ServiceClaims};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use std::fmt;

/// Default validity window of a minted token
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 3600;

/// Shared HMAC secret, established once at startup
#[derive(Clone)]
pub struct SigningSecret(Vec<u8>);

impl SigningSecret {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, AuthError> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(AuthError::InvalidSecret("secret must not be empty".into()));
        }
        Ok(Self(bytes))
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningSecret(<redacted>)")
    }
}

/// Mints service identity tokens for outbound calls
#[derive(Clone)]
pub struct TokenIssuer {
    service_name: String,
    key: EncodingKey,
    ttl: chrono::Duration,
}

impl TokenIssuer {
    pub fn new(service_name: impl Into<String>, secret: &SigningSecret) -> Self {
        Self {
            service_name: service_name.into(),
            key: EncodingKey::from_secret(secret.as_bytes()),
            ttl: chrono::Duration::seconds(DEFAULT_TOKEN_TTL_SECS as i64),
        }
    }

    pub fn with_ttl(mut self, ttl: std::time::Duration) -> Self {
        self.ttl = chrono::Duration::from_std(ttl).unwrap_or(self.ttl);
        self
    }

    /// Mint a token valid from now for the configured TTL
    pub fn issue(&self) -> Result<String, AuthError> {
        self.issue_at(chrono::Utc::now())
    }

    /// Mint a token as if the current time were `now`
    pub fn issue_at(&self, now: chrono::DateTime<chrono::Utc>) -> Result<String, AuthError> {
        let claims = ServiceClaims {
            service_name: self.service_name.clone(),
            iss: self.service_name.clone(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.key)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }
}

impl fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("service_name", &self.service_name)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_secret_rejected() {
        assert!(matches!(
            SigningSecret::new(Vec::new()),
            Err(AuthError::InvalidSecret(_))
        ));
    }

    #[test]
    fn test_secret_debug_is_redacted() {
        let secret = SigningSecret::new("hunter2").unwrap();
        assert!(!format!("{:?}", secret).contains("hunter2"));
    }

    #[test]
    fn test_token_has_three_segments() {
        let secret = SigningSecret::new("s3cret").unwrap();
        let token = TokenIssuer::new("deployment-service", &secret).issue().unwrap();
        assert_eq!(token.split('.').count(), 3);
    }
}
