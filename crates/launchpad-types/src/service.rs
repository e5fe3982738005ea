//! Catalog service records

use crate::ObjectId;
use serde::{Deserialize, Serialize};

/// A deployable service registered under a project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRecord {
    pub id: ObjectId,
    pub project_id: ObjectId,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Input to the catalog store; id and timestamps are assigned on insert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewService {
    pub project_id: ObjectId,
    pub name: String,
    pub description: String,
}

impl NewService {
    pub fn into_record(self, id: ObjectId, now: chrono::DateTime<chrono::Utc>) -> ServiceRecord {
        ServiceRecord {
            id,
            project_id: self.project_id,
            name: self.name,
            description: self.description,
            created_at: now,
            updated_at: now,
        }
    }
}
