//! Launchpad Types - Shared model for the catalog and deployment services
//!
//! Both services exchange entity handles as 24-character hex strings and
//! agree on the deployment lifecycle and the pagination envelope, so those
//! live here rather than in either daemon.
//!
//! ## Key Concepts
//!
//! - **ObjectId**: opaque 12-byte entity handle
//! - **Deployment**: a tracked attempt to activate a service
//! - **ServiceRecord**: a catalog entry that deployments point at
//! - **Page**: the `{data, page, limit, total_count, total_pages}` envelope

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod deployment;
pub mod ids;
pub mod page;
pub mod service;

// Re-export main types
pub use deployment::{
    Deployment, DeploymentEvent, DeploymentStatus, InvalidTransition, NewDeployment,
};
pub use ids::{IdError, ObjectId};
pub use page::{Page, PageQuery, PageRequest, DEFAULT_LIMIT, DEFAULT_PAGE};
pub use service::{NewService, ServiceRecord};
