use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// When `path` is `None`, the built-in defaults are used (running without a
/// config file is supported).
///
/// # Arguments
///
/// * `path` - Optional path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use petsnap::config::load_config;
///
/// let config = load_config(Some(Path::new("petsnap.toml"))).unwrap();
/// println!("Workers: {}", config.ingest.workers);
/// ```
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let config = match path {
        Some(path) => {
            // Read the configuration file
            let content = std::fs::read_to_string(path)?;

            // Parse TOML
            toml::from_str(&content)?
        }
        None => Config::default(),
    };

    // Validate the configuration
    validate(&config)?;

    Ok(config)
}
