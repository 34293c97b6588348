//! Storage trait and error types
//!
//! This module defines the record type flowing through the pipeline, the
//! trait interface for persistence backends, and associated error types.

use async_trait::async_trait;
use thiserror::Error;

/// Number of records returned per page by [`ImageStore::list_page`]
pub const PAGE_SIZE: u64 = 10;

/// A persisted image: the relative path of a saved, resized file
///
/// Created by a fetch worker at successful save time and never mutated
/// afterwards. The path is unique per save attempt (nanosecond timestamp plus
/// a random suffix).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRecord {
    pub file: String,
}

impl ImageRecord {
    pub fn new(file: impl Into<String>) -> Self {
        Self { file: file.into() }
    }
}

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Trait for image persistence backends
///
/// The pipeline needs exactly two operations: append a batch of records and
/// list one fixed-size page. The trait is async so page reads compose with
/// timeouts and tests can substitute failing or slow stores.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Persists a batch of records as a single write
    async fn append_batch(&self, records: &[ImageRecord]) -> StoreResult<()>;

    /// Returns up to [`PAGE_SIZE`] records starting at `offset`, in insertion
    /// order; empty when `offset` is at or past the stored count
    async fn list_page(&self, offset: u64) -> StoreResult<Vec<ImageRecord>>;
}
