use serde::Deserialize;

/// Main configuration structure for Petsnap
///
/// Every field carries a default, so a config file (and any subset of its
/// keys) is optional; running without one uses the built-in defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub ingest: IngestConfig,
    #[serde(default)]
    pub proxy: ProxyConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Ingestion pipeline configuration
#[derive(Debug, Clone, Deserialize)]
pub struct IngestConfig {
    /// Directory resized images are saved into
    #[serde(rename = "save-dir", default = "default_save_dir")]
    pub save_dir: String,

    /// Number of concurrent fetch workers
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Maximum image downloads per second (also the burst size)
    #[serde(rename = "rate-limit", default = "default_rate_limit")]
    pub rate_limit: u32,

    /// Capacity of the bounded URL queue between crawler and workers
    #[serde(rename = "url-queue-capacity", default = "default_url_queue_capacity")]
    pub url_queue_capacity: usize,

    /// Capacity of the bounded result queue between workers and the batcher
    #[serde(
        rename = "result-queue-capacity",
        default = "default_result_queue_capacity"
    )]
    pub result_queue_capacity: usize,
}

/// Proxy pool configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ProxyConfig {
    /// Public proxy-list page scraped for fresh proxies
    #[serde(rename = "source-url", default = "default_proxy_source_url")]
    pub source_url: String,

    /// Seconds between proxy refresh attempts
    #[serde(
        rename = "refresh-interval-secs",
        default = "default_refresh_interval_secs"
    )]
    pub refresh_interval_secs: u64,
}

/// Storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path", default = "default_database_path")]
    pub database_path: String,
}

fn default_save_dir() -> String {
    "images".to_string()
}

fn default_workers() -> usize {
    10_000
}

fn default_rate_limit() -> u32 {
    1_000
}

fn default_url_queue_capacity() -> usize {
    100_000
}

fn default_result_queue_capacity() -> usize {
    20_000
}

fn default_proxy_source_url() -> String {
    "https://www.sslproxies.org/".to_string()
}

fn default_refresh_interval_secs() -> u64 {
    7
}

fn default_database_path() -> String {
    "petsnap.db".to_string()
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            save_dir: default_save_dir(),
            workers: default_workers(),
            rate_limit: default_rate_limit(),
            url_queue_capacity: default_url_queue_capacity(),
            result_queue_capacity: default_result_queue_capacity(),
        }
    }
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            source_url: default_proxy_source_url(),
            refresh_interval_secs: default_refresh_interval_secs(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}
