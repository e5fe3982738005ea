//! Dependency validation against the catalog
//!
//! Before a deployment is recorded, the catalog is asked whether the target
//! service exists. The call carries a freshly minted service token because
//! the catalog's lookup route is the one route it guards.

use async_trait::async_trait;
use launchpad_auth::{AuthError, TokenIssuer};
use launchpad_types::ObjectId;
use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;

/// Default bound on a catalog lookup
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Why the catalog could not give a yes/no answer
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Could not mint the outbound token
    #[error("failed to generate service token: {0}")]
    Token(#[from] AuthError),

    /// Network failure or timeout
    #[error("failed to call core service: {0}")]
    Transport(#[source] reqwest::Error),

    /// The catalog refused our credentials
    #[error("authentication failed with core service: {body}")]
    Unauthorized { status: u16, body: String },

    /// Any other non-200, non-404 answer
    #[error("core service returned status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    /// 200 with a body that is not a service record
    #[error("invalid response from core service: {0}")]
    MalformedResponse(String),
}

/// Answers whether a service exists
#[async_trait]
pub trait DependencyValidator: Send + Sync {
    /// `Ok(false)` means the service is absent, which is not an error
    async fn validate(&self, service_id: &ObjectId) -> Result<bool, ValidationError>;
}

/// HTTP client for the catalog's `GET /services/{id}`
#[derive(Debug, Clone)]
pub struct CatalogClient {
    client: reqwest::Client,
    base_url: String,
    issuer: TokenIssuer,
}

impl CatalogClient {
    pub fn new(
        base_url: impl Into<String>,
        issuer: TokenIssuer,
        timeout: Duration,
    ) -> Result<Self, ValidationError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ValidationError::Transport)?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            issuer,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl DependencyValidator for CatalogClient {
    async fn validate(&self, service_id: &ObjectId) -> Result<bool, ValidationError> {
        let token = self.issuer.issue()?;
        let url = format!("{}/services/{}", self.base_url, service_id);

        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(ValidationError::Transport)?;

        let status = response.status();
        match status {
            StatusCode::OK => {}
            StatusCode::NOT_FOUND => {
                tracing::debug!(service_id = %service_id, "Service not found in catalog");
                return Ok(false);
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                let body = response.text().await.unwrap_or_default();
                return Err(ValidationError::Unauthorized {
                    status: status.as_u16(),
                    body,
                });
            }
            _ => {
                let body = response.text().await.unwrap_or_default();
                return Err(ValidationError::UnexpectedStatus {
                    status: status.as_u16(),
                    body,
                });
            }
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ValidationError::MalformedResponse(e.to_string()))?;

        match body.as_object() {
            Some(record) if record.contains_key("id") => Ok(true),
            _ => Err(ValidationError::MalformedResponse(
                "service record has no id".to_string(),
            )),
        }
    }
}
