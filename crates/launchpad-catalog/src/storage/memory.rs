//! In-memory storage implementation

use super::traits::*;
use async_trait::async_trait;
use launchpad_types::{NewService, ObjectId, PageRequest, ServiceRecord};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory storage for development and testing
#[derive(Debug, Clone, Default)]
pub struct InMemoryStorage {
    services: Arc<RwLock<HashMap<ObjectId, ServiceRecord>>>,
}

impl InMemoryStorage {
    /// Create a new in-memory storage
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ServiceStorage for InMemoryStorage {
    async fn insert_service(&self, service: NewService) -> StorageResult<ServiceRecord> {
        let record = service.into_record(ObjectId::generate(), chrono::Utc::now());
        let mut services = self.services.write().await;
        services.insert(record.id, record.clone());
        Ok(record)
    }

    async fn get_service(&self, id: &ObjectId) -> StorageResult<Option<ServiceRecord>> {
        let services = self.services.read().await;
        Ok(services.get(id).cloned())
    }

    async fn list_services_for_project(
        &self,
        project_id: &ObjectId,
        page: PageRequest,
    ) -> StorageResult<(Vec<ServiceRecord>, u64)> {
        let services = self.services.read().await;
        let mut matching: Vec<&ServiceRecord> = services
            .values()
            .filter(|s| &s.project_id == project_id)
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

#[cfg(test)]
mod tests {
    use super::*;

    fn new_service(project_id: ObjectId, name: &str) -> NewService {
        NewService {
            project_id,
            name: name.to_string(),
            description: String::new(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let storage = InMemoryStorage::new();
        let project = ObjectId::generate();

        let record = storage
            .insert_service(new_service(project, "billing"))
            .await
            .unwrap();
        assert_eq!(record.created_at, record.updated_at);

        let fetched = storage.get_service(&record.id).await.unwrap();
        assert_eq!(fetched, Some(record));

        let missing = storage.get_service(&ObjectId::generate()).await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_list_is_scoped_and_newest_first() {
        let storage = InMemoryStorage::new();
        let project = ObjectId::generate();
        let other = ObjectId::generate();

        let mut ids = Vec::new();
        for name in ["a", "b", "c"] {
            ids.push(storage.insert_service(new_service(project, name)).await.unwrap().id);
        }
        storage.insert_service(new_service(other, "x")).await.unwrap();

        let (page, total) = storage
            .list_services_for_project(&project, PageRequest::new(1, 2))
            .await
            .unwrap();
        assert_eq!(total, 3);
        assert_eq!(page.iter().map(|s| s.id).collect::<Vec<_>>(), vec![ids[2], ids[1]]);

        let (page, _) = storage
            .list_services_for_project(&project, PageRequest::new(2, 2))
            .await
            .unwrap();
        assert_eq!(page.iter().map(|s| s.id).collect::<Vec<_>>(), vec![ids[0]]);
    }
}
