//! Launchpad catalog library
//!
//! The catalog owns the registry of deployable services. Its single
//! token-gated route, `GET /services/{id}`, is what the deployment daemon
//! calls to validate a deployment's target before recording it.

pub mod api;
pub mod config;
pub mod error;
pub mod server;
pub mod storage;

pub use api::rest::state::AppState;
pub use api::create_router;
pub use config::CatalogConfig;
pub use error::{ApiError, DaemonError, StorageError};
pub use server::Server;
pub use storage::{InMemoryStorage, PostgresStorage, ServiceStorage};
