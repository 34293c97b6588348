//! Configuration module for Petsnap
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every setting has a default, so running without a config file works.
//!
//! # Example
//!
//! ```no_run
//! use petsnap::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Some(Path::new("petsnap.toml"))).unwrap();
//! println!("Worker pool size: {}", config.ingest.workers);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, IngestConfig, ProxyConfig, StorageConfig};

// Re-export parser functions
pub use parser::load_config;
