//! PostgreSQL storage implementation

use super::traits::*;
use crate::error::StorageError;
use async_trait::async_trait;
use launchpad_types::{NewService, ObjectId, PageRequest, ServiceRecord};
use sqlx::{postgres::PgPoolOptions, postgres::PgRow, PgPool, Row};
use std::future::Future;
use std::time::Duration;

/// PostgreSQL-backed storage
#[derive(Debug, Clone)]
pub struct PostgresStorage {
    pool: PgPool,
    query_timeout: Duration,
}

impl PostgresStorage {
    /// Connect to PostgreSQL and initialize schema
    pub async fn new(
        url: &str,
        max_connections: u32,
        connect_timeout_secs: u64,
        query_timeout_secs: u64,
    ) -> Result<Self, StorageError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(connect_timeout_secs))
            .connect(url)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let storage = Self {
            pool,
            query_timeout: Duration::from_secs(query_timeout_secs),
        };
        storage.initialize_schema().await?;
        Ok(storage)
    }

    async fn initialize_schema(&self) -> Result<(), StorageError> {
        let statements = [
            r#"
            CREATE TABLE IF NOT EXISTS services (
                id TEXT PRIMARY KEY,
                project_id TEXT NOT NULL,
                name TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                created_at TIMESTAMPTZ NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL
            );
            "#,
            r#"CREATE INDEX IF NOT EXISTS services_project_created ON services(project_id, created_at DESC);"#,
        ];

        for stmt in statements {
            self.bounded(sqlx::query(stmt).execute(&self.pool)).await?;
        }

        Ok(())
    }

    /// Run a query under the configured timeout
    async fn bounded<T>(
        &self,
        query: impl Future<Output = Result<T, sqlx::Error>>,
    ) -> StorageResult<T> {
        match tokio::time::timeout(self.query_timeout, query).await {
            Ok(result) => result.map_err(|e| StorageError::Query(e.to_string())),
            Err(_) => Err(StorageError::Timeout(self.query_timeout)),
        }
    }

    fn parse_id(raw: &str) -> Result<ObjectId, StorageError> {
        ObjectId::parse(raw)
            .map_err(|e| StorageError::InvalidData(format!("stored id {:?}: {}", raw, e)))
    }

    fn row_to_record(row: &PgRow) -> Result<ServiceRecord, StorageError> {
        let get = |e: sqlx::Error| StorageError::Query(e.to_string());
        let id: String = row.try_get("id").map_err(get)?;
        let project_id: String = row.try_get("project_id").map_err(get)?;

        Ok(ServiceRecord {
            id: Self::parse_id(&id)?,
            project_id: Self::parse_id(&project_id)?,
            name: row.try_get("name").map_err(get)?,
            description: row.try_get("description").map_err(get)?,
            created_at: row.try_get("created_at").map_err(get)?,
            updated_at: row.try_get("updated_at").map_err(get)?,
        })
    }
}

#[async_trait]
impl ServiceStorage for PostgresStorage {
    async fn insert_service(&self, service: NewService) -> StorageResult<ServiceRecord> {
        let record = service.into_record(ObjectId::generate(), chrono::Utc::now());

        self.bounded(
            sqlx::query(
                r#"
                INSERT INTO services (id, project_id, name, description, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(record.id.to_hex())
            .bind(record.project_id.to_hex())
            .bind(&record.name)
            .bind(&record.description)
            .bind(record.created_at)
            .bind(record.updated_at)
            .execute(&self.pool),
        )
        .await?;

        Ok(record)
    }

    async fn get_service(&self, id: &ObjectId) -> StorageResult<Option<ServiceRecord>> {
        let row = self
            .bounded(
                sqlx::query(
                    "SELECT id, project_id, name, description, created_at, updated_at \
                     FROM services WHERE id = $1",
                )
                .bind(id.to_hex())
                .fetch_optional(&self.pool),
            )
            .await?;

        row.as_ref().map(Self::row_to_record).transpose()
    }

    async fn list_services_for_project(
        &self,
        project_id: &ObjectId,
        page: PageRequest,
    ) -> StorageResult<(Vec<ServiceRecord>, u64)> {
        let total: i64 = self
            .bounded(
                sqlx::query_scalar("SELECT COUNT(*) FROM services WHERE project_id = $1")
                    .bind(project_id.to_hex())
                    .fetch_one(&self.pool),
            )
            .await?;

        let rows = self
            .bounded(
                sqlx::query(
                    "SELECT id, project_id, name, description, created_at, updated_at \
                     FROM services WHERE project_id = $1 \
                     ORDER BY created_at DESC, id DESC LIMIT $2 OFFSET $3",
                )
                .bind(project_id.to_hex())
                .bind(i64::try_from(page.limit).unwrap_or(i64::MAX))
                .bind(i64::try_from(page.offset()).unwrap_or(i64::MAX))
                .fetch_all(&self.pool),
            )
            .await?;

        let data = rows
            .iter()
            .map(Self::row_to_record)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((data, total.max(0) as u64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Connects to TEST_DATABASE_URL; tests skip themselves when it is unset
    async fn test_storage() -> Option<PostgresStorage> {
        let url = std::env::var("TEST_DATABASE_URL").ok()?;
        PostgresStorage::new(&url, 2, 5, 5).await.ok()
    }

    async fn cleanup(storage: &PostgresStorage, project_id: &ObjectId) {
        sqlx::query("DELETE FROM services WHERE project_id = $1")
            .bind(project_id.to_hex())
            .execute(&storage.pool)
            .await
            .expect("Failed to clean up services");
    }

    fn new_service(project_id: ObjectId, name: &str) -> NewService {
        NewService {
            project_id,
            name: name.to_string(),
            description: String::new(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_get_service() {
        let Some(storage) = test_storage().await else {
            eprintln!("Skipping test: TEST_DATABASE_URL not set");
            return;
        };
        let project_id = ObjectId::generate();

        let record = storage
            .insert_service(new_service(project_id, "billing"))
            .await
            .unwrap();
        let fetched = storage.get_service(&record.id).await.unwrap().unwrap();
        assert_eq!(fetched.id, record.id);
        assert_eq!(fetched.project_id, project_id);
        assert_eq!(fetched.name, "billing");
        assert_eq!(fetched.description, "");

        assert!(storage
            .get_service(&ObjectId::generate())
            .await
            .unwrap()
            .is_none());

        cleanup(&storage, &project_id).await;
    }

    #[tokio::test]
    async fn test_list_services_pages_newest_first() {
        let Some(storage) = test_storage().await else {
            eprintln!("Skipping test: TEST_DATABASE_URL not set");
            return;
        };
        let project_id = ObjectId::generate();

        let mut ids = Vec::new();
        for name in ["a", "b", "c"] {
            ids.push(
                storage
                    .insert_service(new_service(project_id, name))
                    .await
                    .unwrap()
                    .id,
            );
        }
        ids.reverse();

        let (first, total) = storage
            .list_services_for_project(&project_id, PageRequest::new(1, 2))
            .await
            .unwrap();
        let (second, _) = storage
            .list_services_for_project(&project_id, PageRequest::new(2, 2))
            .await
            .unwrap();
        assert_eq!(total, 3);
        let seen: Vec<ObjectId> = first.iter().chain(&second).map(|s| s.id).collect();
        assert_eq!(seen, ids);

        let largest = PageRequest::from_query(Some("9223372036854775807"), Some("10"));
        let (data, total) = storage
            .list_services_for_project(&project_id, largest)
            .await
            .unwrap();
        assert!(data.is_empty());
        assert_eq!(total, 3);

        cleanup(&storage, &project_id).await;
    }
}
