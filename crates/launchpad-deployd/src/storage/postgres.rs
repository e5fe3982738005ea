//! PostgreSQL storage implementation

use super::traits::*;
use crate::error::StorageError;
use async_trait::async_trait;
use launchpad_types::{Deployment, DeploymentStatus, NewDeployment, ObjectId, PageRequest};
use sqlx::{postgres::PgPoolOptions, postgres::PgRow, PgPool, Row};
use std::future::Future;
use std::time::Duration;

const SELECT_COLUMNS: &str = "SELECT id, service_id, status, created_at, updated_at FROM deployments";

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
            CREATE TABLE IF NOT EXISTS deployments (
                id TEXT PRIMARY KEY,
                service_id TEXT NOT NULL,
                status TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL
            );
            "#,
            r#"CREATE INDEX IF NOT EXISTS deployments_service_created ON deployments(service_id, created_at DESC);"#,
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

    fn row_to_deployment(row: &PgRow) -> Result<Deployment, StorageError> {
        let get = |e: sqlx::Error| StorageError::Query(e.to_string());
        let id: String = row.try_get("id").map_err(get)?;
        let service_id: String = row.try_get("service_id").map_err(get)?;
        let status: String = row.try_get("status").map_err(get)?;

        Ok(Deployment {
            id: ObjectId::parse(&id)
                .map_err(|e| StorageError::InvalidData(format!("deployment id {:?}: {}", id, e)))?,
            service_id: ObjectId::parse(&service_id).map_err(|e| {
                StorageError::InvalidData(format!("service id {:?}: {}", service_id, e))
            })?,
            status: status.parse().map_err(StorageError::InvalidData)?,
            created_at: row.try_get("created_at").map_err(get)?,
            updated_at: row.try_get("updated_at").map_err(get)?,
        })
    }
}

#[async_trait]
impl DeploymentStorage for PostgresStorage {
    async fn insert(&self, deployment: NewDeployment) -> StorageResult<Deployment> {
        let deployment = deployment.into_deployment(ObjectId::generate(), chrono::Utc::now());

        self.bounded(
            sqlx::query(
                r#"
                INSERT INTO deployments (id, service_id, status, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(deployment.id.to_hex())
            .bind(deployment.service_id.to_hex())
            .bind(deployment.status.as_str())
            .bind(deployment.created_at)
            .bind(deployment.updated_at)
            .execute(&self.pool),
        )
        .await?;

        Ok(deployment)
    }

    async fn get(&self, id: &ObjectId) -> StorageResult<Option<Deployment>> {
        let query = format!("{} WHERE id = $1", SELECT_COLUMNS);
        let row = self
            .bounded(
                sqlx::query(&query)
                    .bind(id.to_hex())
                    .fetch_optional(&self.pool),
            )
            .await?;

        row.as_ref().map(Self::row_to_deployment).transpose()
    }

    async fn set_status(&self, id: &ObjectId, status: DeploymentStatus) -> StorageResult<bool> {
        // One statement, so status and updated_at change together
        let result = self
            .bounded(
                sqlx::query("UPDATE deployments SET status = $1, updated_at = $2 WHERE id = $3")
                    .bind(status.as_str())
                    .bind(chrono::Utc::now())
                    .bind(id.to_hex())
                    .execute(&self.pool),
            )
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_by_service(
        &self,
        service_id: &ObjectId,
        page: PageRequest,
    ) -> StorageResult<(Vec<Deployment>, u64)> {
        let total: i64 = self
            .bounded(
                sqlx::query_scalar("SELECT COUNT(*) FROM deployments WHERE service_id = $1")
                    .bind(service_id.to_hex())
                    .fetch_one(&self.pool),
            )
            .await?;

        let query = format!(
            "{} WHERE service_id = $1 ORDER BY created_at DESC, id DESC LIMIT $2 OFFSET $3",
            SELECT_COLUMNS
        );
        let rows = self
            .bounded(
                sqlx::query(&query)
                    .bind(service_id.to_hex())
                    .bind(i64::try_from(page.limit).unwrap_or(i64::MAX))
                    .bind(i64::try_from(page.offset()).unwrap_or(i64::MAX))
                    .fetch_all(&self.pool),
            )
            .await?;

        let data = rows
            .iter()
            .map(Self::row_to_deployment)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((data, total.max(0) as u64))
    }
}
