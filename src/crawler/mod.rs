//! Crawler module for image URL discovery
//!
//! This module contains the producing side of the pipeline:
//! - Search backend definitions and per-element URL extraction
//! - The discovery loop feeding the bounded URL queue
//! - The best-effort proxy pool and its periodic refresher

mod discovery;
mod engines;
mod proxy;

pub use discovery::{extract_image_urls, run_crawler};
pub use engines::{random_query, SearchEngine, PET_QUERIES};
pub use proxy::{parse_proxy_table, run_refresher, ProxyPool};
