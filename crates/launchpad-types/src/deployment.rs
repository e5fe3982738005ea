//! Deployment types
//!
//! A Deployment tracks one attempt to activate a catalog service. Its status
//! moves exactly once, from `Pending` to either `Running` or `Failed`.

use crate::ObjectId;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A tracked attempt to activate a service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployment {
    /// Store-assigned identifier
    pub id: ObjectId,

    /// Catalog service this deployment activates
    pub service_id: ObjectId,

    /// Current lifecycle status
    pub status: DeploymentStatus,

    /// Created timestamp
    pub created_at: chrono::DateTime<chrono::Utc>,

    /// Rewritten on every status transition
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Input to the state store; id and timestamps are assigned on insert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDeployment {
    pub service_id: ObjectId,
    pub status: DeploymentStatus,
}

impl NewDeployment {
    /// A fresh deployment always starts out `Pending`
    pub fn pending(service_id: ObjectId) -> Self {
        Self {
            service_id,
            status: DeploymentStatus::Pending,
        }
    }

    /// Materialize the record with a store-assigned id and timestamp
    pub fn into_deployment(self, id: ObjectId, now: chrono::DateTime<chrono::Utc>) -> Deployment {
        Deployment {
            id,
            service_id: self.service_id,
            status: self.status,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Deployment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeploymentStatus {
    /// Created, activation not yet settled
    Pending,

    /// Activation succeeded
    Running,

    /// Activation failed; never retried
    Failed,
}

impl DeploymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeploymentStatus::Pending => "Pending",
            DeploymentStatus::Running => "Running",
            DeploymentStatus::Failed => "Failed",
        }
    }

    /// No transition leaves a terminal status
    pub fn is_terminal(&self) -> bool {
        !matches!(self, DeploymentStatus::Pending)
    }

    pub fn can_transition_to(&self, next: DeploymentStatus) -> bool {
        matches!(
            (self, next),
            (
                DeploymentStatus::Pending,
                DeploymentStatus::Running | DeploymentStatus::Failed
            )
        )
    }

    /// Validate a transition, returning the new status
    pub fn transition(self, next: DeploymentStatus) -> Result<DeploymentStatus, InvalidTransition> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(InvalidTransition {
                from: self,
                to: next,
            })
        }
    }
}

impl fmt::Display for DeploymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DeploymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(DeploymentStatus::Pending),
            "Running" => Ok(DeploymentStatus::Running),
            "Failed" => Ok(DeploymentStatus::Failed),
            other => Err(format!("unknown deployment status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid deployment transition {from} -> {to}")]
pub struct InvalidTransition {
    pub from: DeploymentStatus,
    pub to: DeploymentStatus,
}

/// Published when a deployment settles into a terminal status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentEvent {
    pub deployment_id: ObjectId,
    pub service_id: ObjectId,
    pub status: DeploymentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}
