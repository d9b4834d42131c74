//! Application service: configuration use-cases.

use anyhow::Result;

use crate::application::ports::ConfigStore;
use crate::domain::config::{DeployConfig, validate_config_key, validate_config_value};

/// Load configuration.
///
/// # Errors
///
/// Returns an error if the stored configuration cannot be read or parsed.
pub fn load_config(store: &impl ConfigStore) -> Result<DeployConfig> {
    store.load()
}

/// Validate `key = value`, apply it to the stored configuration and save.
///
/// Returns the updated configuration.
///
/// # Errors
///
/// Returns a `ConfigError` for unknown keys or invalid values, or an I/O
/// error from the store.
pub fn set_value(store: &impl ConfigStore, key: &str, value: &str) -> Result<DeployConfig> {
    validate_config_key(key)?;
    validate_config_value(key, value)?;

    let mut config = store.load()?;
    match key {
        "domain" => config.domain = value.to_string(),
        "email" => config.email = Some(value.to_string()),
        "upstream" => config.upstream = value.to_string(),
        _ => anyhow::bail!("Unknown setting: {key}"),
    }
    store.save(&config)?;
    Ok(config)
}
