//! Deployment state store
//!
//! The store is the single source of truth for a deployment's status.
//! It does not police transitions; the activation path does.

mod memory;
mod postgres;
mod traits;

pub use memory::InMemoryStorage;
pub use postgres::PostgresStorage;
pub use traits::{DeploymentStorage, StorageResult};
