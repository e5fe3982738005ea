//! Storage layer for the catalog
//!
//! Provides persistent storage for service records.

mod memory;
mod postgres;
mod traits;

pub use memory::InMemoryStorage;
pub use postgres::PostgresStorage;
pub use traits::{ServiceStorage, StorageResult};
