//! Launchpad deployment daemon library
//!
//! A deployment is accepted in two phases. The request path parses the
//! target service id, asks the catalog whether that service exists and
//! records a `Pending` deployment before answering `201`. Activation then
//! runs off the request path: the effector is called once and the record
//! settles as `Running` or `Failed`. Clients observe the outcome by polling
//! the listing endpoint.
//!
//! ## Modules
//!
//! - [`validator`]: catalog lookups authenticated with service tokens
//! - [`effector`]: the outbound activation call
//! - [`storage`]: deployment state store (memory, PostgreSQL)
//! - [`activation`]: settles deployments, detached or through a worker pool
//! - [`orchestrator`]: the create and list operations
//! - [`api`]: axum routes

pub mod activation;
pub mod api;
pub mod config;
pub mod effector;
pub mod error;
pub mod orchestrator;
pub mod server;
pub mod storage;
pub mod validator;

pub use activation::{Activation, Dispatcher, WorkerPool};
pub use api::create_router;
pub use api::rest::state::AppState;
pub use config::DeploydConfig;
pub use effector::{Effector, EffectorError, HttpEffector};
pub use error::{ApiError, DaemonError, StorageError};
pub use orchestrator::DeploymentOrchestrator;
pub use server::Server;
pub use storage::{DeploymentStorage, InMemoryStorage, PostgresStorage};
pub use validator::{CatalogClient, DependencyValidator, ValidationError};

/// Name this daemon signs its outbound service tokens with
pub const SERVICE_NAME: &str = "deployment-service";
