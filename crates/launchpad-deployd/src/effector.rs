//! Outbound activation call

use async_trait::async_trait;
use launchpad_types::{Deployment, DeploymentStatus, ObjectId};
use reqwest::StatusCode;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Where activations are posted unless configured otherwise
pub const DEFAULT_EFFECTOR_URL: &str = "https://jsonplaceholder.typicode.com/posts";

/// Default bound on one activation call
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Error)]
pub enum EffectorError {
    /// Network failure or timeout
    #[error("failed to call effector: {0}")]
    Transport(#[source] reqwest::Error),

    /// The downstream system answered with something other than 200/201
    #[error("effector returned status {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Performs the side effect that brings a deployment to life.
///
/// Called exactly once per deployment; implementations must not retry.
#[async_trait]
pub trait Effector: Send + Sync {
    async fn activate(&self, deployment: &Deployment) -> Result<(), EffectorError>;
}

/// Body posted to the downstream system
#[derive(Debug, Serialize)]
struct ActivationRequest {
    deployment_id: ObjectId,
    service_id: ObjectId,
    status: DeploymentStatus,
    timestamp: i64,
}

/// Posts activations as JSON to a fixed URL
#[derive(Debug, Clone)]
pub struct HttpEffector {
    client: reqwest::Client,
    url: String,
}

impl HttpEffector {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, EffectorError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(EffectorError::Transport)?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl Effector for HttpEffector {
    async fn activate(&self, deployment: &Deployment) -> Result<(), EffectorError> {
        let request = ActivationRequest {
            deployment_id: deployment.id,
            service_id: deployment.service_id,
            status: deployment.status,
            timestamp: chrono::Utc::now().timestamp(),
        };

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(EffectorError::Transport)?;

        match response.status() {
            StatusCode::OK | StatusCode::CREATED => Ok(()),
            status => Err(EffectorError::Rejected {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use launchpad_types::NewDeployment;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn deployment() -> Deployment {
        NewDeployment::pending(ObjectId::generate())
            .into_deployment(ObjectId::generate(), chrono::Utc::now())
    }

    fn effector(server: &MockServer) -> HttpEffector {
        HttpEffector::new(format!("{}/posts", server.uri()), DEFAULT_TIMEOUT).unwrap()
    }

    #[tokio::test]
    async fn test_posts_deployment_payload() {
        let server = MockServer::start().await;
        let deployment = deployment();

        Mock::given(method("POST"))
            .and(path("/posts"))
            .and(header("content-type", "application/json"))
            .and(body_partial_json(serde_json::json!({
                "deployment_id": deployment.id.to_hex(),
                "service_id": deployment.service_id.to_hex(),
                "status": "Pending"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({"id": 101})))
            .expect(1)
            .mount(&server)
            .await;

        effector(&server).activate(&deployment).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert!(body["timestamp"].as_i64().unwrap() > 0);
    }

    #[tokio::test]
    async fn test_ok_is_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        assert!(effector(&server).activate(&deployment()).await.is_ok());
    }

    #[tokio::test]
    async fn test_other_statuses_are_rejected() {
        for code in [202u16, 400, 500] {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .respond_with(ResponseTemplate::new(code).set_body_string("nope"))
                .expect(1)
                .mount(&server)
                .await;

            match effector(&server).activate(&deployment()).await {
                Err(EffectorError::Rejected { status, body }) => {
                    assert_eq!(status, code);
                    assert_eq!(body, "nope");
                }
                other => panic!("expected rejection, got {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_timeout_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let effector =
            HttpEffector::new(format!("{}/posts", server.uri()), Duration::from_millis(50))
                .unwrap();
        let err = effector.activate(&deployment()).await.unwrap_err();
        assert!(matches!(err, EffectorError::Transport(_)));
    }
}
