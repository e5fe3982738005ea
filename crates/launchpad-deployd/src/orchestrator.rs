//! Deployment orchestration
//!
//! `create` is the synchronous half of the lifecycle: parse, validate,
//! persist `Pending`, hand off. Everything after the hand-off belongs to
//! [`crate::activation`].

use crate::activation::Dispatcher;
use crate::error::{ApiError, ApiResult};
use crate::storage::DeploymentStorage;
use crate::validator::DependencyValidator;
use launchpad_types::{Deployment, DeploymentEvent, NewDeployment, ObjectId, Page, PageRequest};
use std::sync::Arc;
use tokio::sync::broadcast;

pub struct DeploymentOrchestrator {
    validator: Arc<dyn DependencyValidator>,
    storage: Arc<dyn DeploymentStorage>,
    dispatcher: Dispatcher,
}

impl DeploymentOrchestrator {
    pub fn new(
        validator: Arc<dyn DependencyValidator>,
        storage: Arc<dyn DeploymentStorage>,
        dispatcher: Dispatcher,
    ) -> Self {
        Self {
            validator,
            storage,
            dispatcher,
        }
    }

    /// Record a new `Pending` deployment of `service_id` and start activating it.
    ///
    /// Returns as soon as the record is stored; the activation outcome is
    /// only visible through [`Self::list`].
    pub async fn create(&self, service_id: &str) -> ApiResult<Deployment> {
        let service_id = ObjectId::parse(service_id).map_err(ApiError::InvalidId)?;

        if !self.validator.validate(&service_id).await? {
            return Err(ApiError::NotFound("service"));
        }

        let deployment = self
            .storage
            .insert(NewDeployment::pending(service_id))
            .await
            .map_err(ApiError::storage("failed to create deployment"))?;

        tracing::info!(
            deployment_id = %deployment.id,
            service_id = %service_id,
            "Deployment created"
        );

        self.dispatcher.dispatch(deployment.clone());
        Ok(deployment)
    }

    /// A page of the service's deployments, newest first
    pub async fn list(&self, service_id: &str, page: PageRequest) -> ApiResult<Page<Deployment>> {
        let service_id = ObjectId::parse(service_id).map_err(ApiError::InvalidId)?;

        let (data, total) = self
            .storage
            .find_by_service(&service_id, page)
            .await
            .map_err(ApiError::storage("failed to fetch deployments"))?;

        Ok(Page::new(data, page, total))
    }

    /// Terminal status changes, as they happen
    pub fn subscribe(&self) -> broadcast::Receiver<DeploymentEvent> {
        self.dispatcher.activation().subscribe()
    }
}
