//! Petsnap: a quota-bounded pet-image ingestion pipeline
//!
//! This crate discovers candidate image URLs by scraping image-search engines,
//! funnels them through a large rate-limited worker pool that fetches, decodes,
//! resizes, and saves each image under a shared quota gate, and micro-batches
//! the saved file paths into a SQLite store. A companion read path streams
//! stored records back out in fixed-size pages with wraparound.

pub mod config;
pub mod crawler;
pub mod pipeline;
pub mod reader;
pub mod storage;

use thiserror::Error;

/// Main error type for Petsnap operations
#[derive(Debug, Error)]
pub enum PetsnapError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Store(#[from] storage::StoreError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Petsnap operations
pub type Result<T> = std::result::Result<T, PetsnapError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use pipeline::IngestPipeline;
pub use reader::read_records;
pub use storage::{ImageRecord, ImageStore, SqliteImageStore, StoreError};
