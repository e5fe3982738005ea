//! In-memory storage implementation

use super::traits::*;
use async_trait::async_trait;
use launchpad_types::{Deployment, DeploymentStatus, NewDeployment, ObjectId, PageRequest};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory storage for development and testing
#[derive(Debug, Clone, Default)]
pub struct InMemoryStorage {
    deployments: Arc<RwLock<HashMap<ObjectId, Deployment>>>,
}

impl InMemoryStorage {
    /// Create a new in-memory storage
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DeploymentStorage for InMemoryStorage {
    async fn insert(&self, deployment: NewDeployment) -> StorageResult<Deployment> {
        let deployment = deployment.into_deployment(ObjectId::generate(), chrono::Utc::now());
        let mut deployments = self.deployments.write().await;
        deployments.insert(deployment.id, deployment.clone());
        Ok(deployment)
    }

    async fn get(&self, id: &ObjectId) -> StorageResult<Option<Deployment>> {
        let deployments = self.deployments.read().await;
        Ok(deployments.get(id).cloned())
    }

    async fn set_status(&self, id: &ObjectId, status: DeploymentStatus) -> StorageResult<bool> {
        let mut deployments = self.deployments.write().await;
        match deployments.get_mut(id) {
            Some(deployment) => {
                deployment.status = status;
                deployment.updated_at = chrono::Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn find_by_service(
        &self,
        service_id: &ObjectId,
        page: PageRequest,
    ) -> StorageResult<(Vec<Deployment>, u64)> {
        let deployments = self.deployments.read().await;
        let mut matching: Vec<&Deployment> = deployments
            .values()
            .filter(|d| &d.service_id == service_id)
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total = matching.len() as u64;
        let data = matching
            .into_iter()
            .skip(usize::try_from(page.offset()).unwrap_or(usize::MAX))
            .take(usize::try_from(page.limit).unwrap_or(usize::MAX))
            .cloned()
            .collect();
        Ok((data, total))
    }
}
