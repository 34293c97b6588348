//! Storage module for persisting image records
//!
//! This module handles the durable side of the pipeline:
//! - The [`ImageRecord`] type and the [`ImageStore`] trait (append a batch,
//!   list one page)
//! - SQLite database initialization and schema management
//!
//! Persistence is at-most-once, best-effort: a failed batch write is logged
//! and dropped by the consumer, never retried.

mod schema;
mod sqlite;
mod traits;

pub use schema::{initialize_schema, SCHEMA_SQL};
pub use sqlite::SqliteImageStore;
pub use traits::{ImageRecord, ImageStore, StoreError, StoreResult, PAGE_SIZE};

use std::path::Path;

/// Initializes or opens a storage database
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteImageStore)` - Successfully initialized storage
/// * `Err(StoreError)` - Failed to initialize storage
pub fn open_storage(path: &Path) -> StoreResult<SqliteImageStore> {
    SqliteImageStore::new(path)
}
