use crate::config::types::{Config, IngestConfig, ProxyConfig, StorageConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_ingest_config(&config.ingest)?;
    validate_proxy_config(&config.proxy)?;
    validate_storage_config(&config.storage)?;
    Ok(())
}

/// Validates ingestion pipeline configuration
fn validate_ingest_config(config: &IngestConfig) -> Result<(), ConfigError> {
    if config.save_dir.is_empty() {
        return Err(ConfigError::Validation(
            "save_dir cannot be empty".to_string(),
        ));
    }

    if config.workers < 1 {
        return Err(ConfigError::Validation(format!(
            "workers must be >= 1, got {}",
            config.workers
        )));
    }

    if config.rate_limit < 1 {
        return Err(ConfigError::Validation(format!(
            "rate_limit must be >= 1, got {}",
            config.rate_limit
        )));
    }

    if config.url_queue_capacity < 1 {
        return Err(ConfigError::Validation(format!(
            "url_queue_capacity must be >= 1, got {}",
            config.url_queue_capacity
        )));
    }

    if config.result_queue_capacity < 1 {
        return Err(ConfigError::Validation(format!(
            "result_queue_capacity must be >= 1, got {}",
            config.result_queue_capacity
        )));
    }

    Ok(())
}

/// Validates proxy pool configuration
fn validate_proxy_config(config: &ProxyConfig) -> Result<(), ConfigError> {
    if config.refresh_interval_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "refresh_interval_secs must be >= 1, got {}",
            config.refresh_interval_secs
        )));
    }

    Url::parse(&config.source_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid proxy source_url: {}", e)))?;

    Ok(())
}

/// Validates storage configuration
fn validate_storage_config(config: &StorageConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_zero_workers_rejected() {
        let mut config = Config::default();
        config.ingest.workers = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_zero_rate_limit_rejected() {
        let mut config = Config::default();
        config.ingest.rate_limit = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_zero_queue_capacities_rejected() {
        let mut config = Config::default();
        config.ingest.url_queue_capacity = 0;
        assert!(validate(&config).is_err());

        let mut config = Config::default();
        config.ingest.result_queue_capacity = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_empty_save_dir_rejected() {
        let mut config = Config::default();
        config.ingest.save_dir = String::new();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_invalid_proxy_source_url_rejected() {
        let mut config = Config::default();
        config.proxy.source_url = "not a url".to_string();
        assert!(matches!(
            validate(&config),
            Err(ConfigError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_empty_database_path_rejected() {
        let mut config = Config::default();
        config.storage.database_path = String::new();
        assert!(validate(&config).is_err());
    }
}
