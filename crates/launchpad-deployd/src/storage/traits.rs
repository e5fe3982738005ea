//! Storage trait definitions

use crate::error::StorageError;
use async_trait::async_trait;
use launchpad_types::{Deployment, DeploymentStatus, NewDeployment, ObjectId, PageRequest};

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage for deployments
#[async_trait]
pub trait DeploymentStorage: Send + Sync {
    /// Persist a new deployment, assigning its id and timestamps
    async fn insert(&self, deployment: NewDeployment) -> StorageResult<Deployment>;

    /// Get a deployment by ID
    async fn get(&self, id: &ObjectId) -> StorageResult<Option<Deployment>>;

    /// Rewrite `status` and `updated_at` together.
    ///
    /// Returns `false` when no deployment has this id.
    async fn set_status(&self, id: &ObjectId, status: DeploymentStatus) -> StorageResult<bool>;

    /// One page of a service's deployments, newest first, with the service's total count
    async fn find_by_service(
        &self,
        service_id: &ObjectId,
        page: PageRequest,
    ) -> StorageResult<(Vec<Deployment>, u64)>;
}
