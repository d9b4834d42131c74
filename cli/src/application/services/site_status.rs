//! Application service: read-only site status gathering use-case.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! Nothing here mutates the host.

use anyhow::{Context, Result};

use crate::application::ports::{FileOracle, PortProbe, SiteConfigStore};
use crate::application::services::preflight::probe_ports;
use crate::domain::status::{self, SiteStatus};
use crate::domain::DeployConfig;

/// Gather the current site status for `config.domain`.
///
/// # Errors
///
/// Returns an error if the sites directory cannot be read or a port probe
/// fails.
pub async fn gather_status(
    host: &(impl PortProbe + SiteConfigStore + FileOracle),
    config: &DeployConfig,
) -> Result<SiteStatus> {
    let active = host
        .read_active_site()
        .await
        .context("reading active site configuration")?;
    let default_site_enabled = host
        .default_site_enabled()
        .await
        .context("checking default site")?;
    let certificate = config.certificate_chain();
    let certificate_present = host.exists(&certificate);
    let ports = probe_ports(host, &config.ports).await?;

    Ok(SiteStatus {
        domain: config.domain.clone(),
        active_site: status::classify(active.as_deref(), config),
        certificate,
        certificate_present,
        default_site_enabled,
        ports,
    })
}
