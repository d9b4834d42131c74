//! nginx `sites-available` / `sites-enabled` directory: implements
//! `SiteConfigStore`.

use std::io::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::application::ports::SiteConfigStore;
use crate::domain::config::NginxConfig;

/// Debian-style nginx site directories.
#[derive(Debug, Clone)]
pub struct NginxSites {
    available: PathBuf,
    enabled: PathBuf,
    site_name: String,
    default_site: String,
}

impl NginxSites {
    #[must_use]
    pub fn new(config: &NginxConfig) -> Self {
        Self {
            available: config.sites_available.clone(),
            enabled: config.sites_enabled.clone(),
            site_name: config.site_name.clone(),
            default_site: config.default_site.clone(),
        }
    }

    /// `sites-available/<site>`.
    #[must_use]
    pub fn site_path(&self) -> PathBuf {
        self.available.join(&self.site_name)
    }

    /// `sites-enabled/<site>`.
    #[must_use]
    pub fn link_path(&self) -> PathBuf {
        self.enabled.join(&self.site_name)
    }

    fn default_link_path(&self) -> PathBuf {
        self.enabled.join(&self.default_site)
    }
}

impl SiteConfigStore for NginxSites {
    async fn write_site(&self, content: &str) -> Result<()> {
        let dir = self.available.clone();
        let path = self.site_path();
        let content = content.to_owned();
        debug!(path = %path.display(), bytes = content.len(), "writing site configuration");
        tokio::task::spawn_blocking(move || write_atomic(&dir, &path, content.as_bytes()))
            .await
            .context("spawn_blocking for write_site")?
    }

    async fn enable_site(&self) -> Result<()> {
        let target = self.site_path();
        let link = self.link_path();
        tokio::fs::create_dir_all(&self.enabled)
            .await
            .with_context(|| format!("creating {}", self.enabled.display()))?;

        if let Ok(existing) = tokio::fs::read_link(&link).await {
            if existing == target {
                return Ok(());
            }
        }
        if tokio::fs::symlink_metadata(&link).await.is_ok() {
            tokio::fs::remove_file(&link)
                .await
                .with_context(|| format!("removing stale {}", link.display()))?;
        }
        debug!(link = %link.display(), target = %target.display(), "enabling site");
        link_site(&target, &link).await
    }

    async fn disable_site(&self) -> Result<()> {
        let link = self.link_path();
        if tokio::fs::symlink_metadata(&link).await.is_err() {
            return Ok(());
        }
        debug!(link = %link.display(), "disabling site");
        tokio::fs::remove_file(&link)
            .await
            .with_context(|| format!("removing {}", link.display()))
    }

    async fn disable_default_site(&self) -> Result<bool> {
        let link = self.default_link_path();
        if tokio::fs::symlink_metadata(&link).await.is_err() {
            return Ok(false);
        }
        tokio::fs::remove_file(&link)
            .await
            .with_context(|| format!("removing {}", link.display()))?;
        Ok(true)
    }

    async fn read_active_site(&self) -> Result<Option<String>> {
        let link = self.link_path();
        match tokio::fs::read_to_string(&link).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("reading {}", link.display())),
        }
    }

    async fn default_site_enabled(&self) -> Result<bool> {
        Ok(tokio::fs::symlink_metadata(self.default_link_path())
            .await
            .is_ok())
    }
}

/// Write via a temp file in the same directory and rename over `path`, so
/// nginx never reads a half-written file.
fn write_atomic(dir: &Path, path: &Path, content: &[u8]) -> Result<()> {
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("creating temp file in {}", dir.display()))?;
    tmp.write_all(content)
        .with_context(|| format!("writing {}", tmp.path().display()))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(tmp.path(), std::fs::Permissions::from_mode(0o644))
            .with_context(|| format!("setting permissions on {}", tmp.path().display()))?;
    }
    tmp.persist(path)
        .with_context(|| format!("replacing {}", path.display()))?;
    Ok(())
}

#[cfg(unix)]
async fn link_site(target: &Path, link: &Path) -> Result<()> {
    tokio::fs::symlink(target, link)
        .await
        .with_context(|| format!("linking {} -> {}", link.display(), target.display()))
}

#[cfg(not(unix))]
async fn link_site(target: &Path, link: &Path) -> Result<()> {
    tokio::fs::copy(target, link)
        .await
        .map(|_| ())
        .with_context(|| format!("copying {} -> {}", target.display(), link.display()))
}
