//! Infrastructure implementation of the `ConfigStore` port.

use std::io::Write as _;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::debug;

use crate::application::ports::ConfigStore;
use crate::domain::config::DeployConfig;

/// Overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "NOTEOMATIC_DEPLOY_CONFIG";
/// Overrides `domain` for one run.
pub const DOMAIN_ENV: &str = "NOTEOMATIC_DOMAIN";
/// Overrides `email` for one run.
pub const EMAIL_ENV: &str = "NOTEOMATIC_EMAIL";

/// Production implementation of `ConfigStore` that uses a YAML file on disk.
pub struct YamlConfigStore;

impl ConfigStore for YamlConfigStore {
    fn load(&self) -> Result<DeployConfig> {
        let path = self.path()?;
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(DeployConfig::default());
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        serde_yaml::from_str(&content).with_context(|| format!("cannot parse {}", path.display()))
    }

    fn save(&self, config: &DeployConfig) -> Result<()> {
        let path = self.path()?;
        let parent = path
            .parent()
            .map_or_else(|| PathBuf::from("."), std::path::Path::to_path_buf);
        std::fs::create_dir_all(&parent)
            .with_context(|| format!("cannot create {}", parent.display()))?;
        let content = serde_yaml::to_string(config).context("cannot serialize config")?;

        let mut tmp = tempfile::NamedTempFile::new_in(&parent)
            .with_context(|| format!("cannot create temp file in {}", parent.display()))?;
        tmp.write_all(content.as_bytes())
            .with_context(|| format!("cannot write {}", path.display()))?;
        // NamedTempFile is created 0600 on unix, which is what we want here.
        tmp.persist(&path)
            .with_context(|| format!("cannot write {}", path.display()))?;
        Ok(())
    }

    fn path(&self) -> Result<PathBuf> {
        if let Ok(val) = std::env::var(CONFIG_PATH_ENV) {
            return Ok(PathBuf::from(val));
        }
        let dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("cannot determine config directory"))?;
        Ok(dir.join("noteomatic").join("deploy.yaml"))
    }
}

/// Apply `NOTEOMATIC_DOMAIN` / `NOTEOMATIC_EMAIL` on top of a loaded config.
///
/// Kept out of `load()` so `config set` never persists one-off overrides.
pub fn apply_env_overrides(config: &mut DeployConfig) {
    if let Some(domain) = non_empty_env(DOMAIN_ENV) {
        config.domain = domain;
    }
    if let Some(email) = non_empty_env(EMAIL_ENV) {
        config.email = Some(email);
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
