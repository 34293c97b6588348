//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the ImageStore trait.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{ImageRecord, ImageStore, StoreError, StoreResult, PAGE_SIZE};
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Mutex;

/// SQLite-backed image store
///
/// The connection is wrapped in a mutex so the store can be shared as
/// `Arc<dyn ImageStore>` across the batch consumer and the paginated reader.
/// Both operations hold the lock only for the duration of one statement or
/// transaction and never across an await point.
pub struct SqliteImageStore {
    conn: Mutex<Connection>,
}

impl SqliteImageStore {
    /// Creates a new SqliteImageStore instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteImageStore)` - Successfully opened/created database
    /// * `Err(StoreError)` - Failed to open database
    pub fn new(path: &Path) -> StoreResult<Self> {
        let conn = Connection::open(path)?;

        // Configure SQLite for better performance
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        // Initialize schema
        initialize_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Creates an in-memory database (for testing)
    pub fn new_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> StoreResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Database("connection lock poisoned".to_string()))
    }
}

#[async_trait]
impl ImageStore for SqliteImageStore {
    async fn append_batch(&self, records: &[ImageRecord]) -> StoreResult<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare("INSERT INTO images (file) VALUES (?1)")?;
            for record in records {
                stmt.execute(params![record.file])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    async fn list_page(&self, offset: u64) -> StoreResult<Vec<ImageRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            // Stable id order keeps offset paging (and wraparound) coherent
            "SELECT file FROM images ORDER BY id LIMIT ?1 OFFSET ?2",
        )?;

        let rows = stmt.query_map(params![PAGE_SIZE, offset], |row| {
            Ok(ImageRecord {
                file: row.get(0)?,
            })
        })?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }
}
