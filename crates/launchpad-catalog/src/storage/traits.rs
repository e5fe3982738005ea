//! Storage trait definitions

use crate::error::StorageError;
use async_trait::async_trait;
use launchpad_types::{NewService, ObjectId, PageRequest, ServiceRecord};

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage for catalog service records
#[async_trait]
pub trait ServiceStorage: Send + Sync {
    /// Persist a new service, assigning its id and timestamps
    async fn insert_service(&self, service: NewService) -> StorageResult<ServiceRecord>;

    /// Get a service by ID
    async fn get_service(&self, id: &ObjectId) -> StorageResult<Option<ServiceRecord>>;

    /// One page of a project's services, newest first, with the project's total count
    async fn list_services_for_project(
        &self,
        project_id: &ObjectId,
        page: PageRequest,
    ) -> StorageResult<(Vec<ServiceRecord>, u64)>;
}
