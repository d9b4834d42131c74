//! Application service: the SSL provisioning workflow.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! All host I/O is routed through the injected `HostEnvironment`.
//!
//! Steps run strictly in order and each one gates the next:
//! ports → packages → plain site → certbot → certificate check → TLS site.
//! The plain site goes live before certbot runs because the HTTP-01 challenge
//! is answered by that configuration.

use std::process::Output;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::application::ports::{
    HostEnvironment, PackageInstaller, ProgressReporter, SiteConfigStore, WebServer,
};
use crate::application::services::preflight::check_ports;
use crate::domain::site::{self, SiteVariant};
use crate::domain::{DeployConfig, ProvisionError, ProvisionOutcome, WorkflowStep};

/// Lines of tool output kept in error messages.
const DETAIL_LINES: usize = 20;

/// Run the full provisioning workflow for `config.domain`.
///
/// On success the TLS site is active and nginx has been reloaded once per
/// activation. On a missing certificate the plain site stays active.
///
/// # Errors
///
/// Returns a `ProvisionError` (wrapped in `anyhow`) for the first step that
/// fails. Nothing is retried.
pub async fn provision_site(
    host: &impl HostEnvironment,
    reporter: &impl ProgressReporter,
    config: &DeployConfig,
) -> Result<ProvisionOutcome> {
    config.validate()?;
    info!(domain = %config.domain, "provisioning started");
    let mut reloads = 0;

    // Step 1: guard. Nothing on the host is touched before this passes.
    reporter.step(&WorkflowStep::CheckPorts.to_string());
    check_ports(host, &config.ports).await?;
    reporter.success("required ports are free");

    // Step 2: packages.
    reporter.step(&WorkflowStep::InstallPackages.to_string());
    install_packages(host, &config.packages).await?;
    reporter.success("packages installed");

    // Step 3: plain HTTP site.
    reporter.step(&WorkflowStep::ActivatePlain.to_string());
    let plain = site::render(SiteVariant::Plain, config);
    activate_site(host, SiteVariant::Plain, &plain)
        .await
        .inspect_err(|e| report_rollback(reporter, e))?;
    reloads += 1;
    reporter.success(&format!("serving http://{}", config.domain));

    // Step 4: certbot. Its exit status is not trusted either way.
    reporter.step(&WorkflowStep::IssueCertificate.to_string());
    match host
        .issue_certificate(&config.domain, config.email.as_deref())
        .await
    {
        Ok(status) if status.success() => debug!("certbot exited successfully"),
        Ok(status) => {
            warn!(%status, "certbot exited unsuccessfully");
            reporter.warn(&format!("certbot exited with {status}"));
        }
        Err(e) => {
            warn!(error = %e, "certbot could not be run");
            reporter.warn(&format!("certbot could not be run: {e:#}"));
        }
    }

    // Step 5: the certificate on disk is the only success signal.
    reporter.step(&WorkflowStep::VerifyCertificate.to_string());
    let chain = config.certificate_chain();
    if !host.exists(&chain) {
        warn!(path = %chain.display(), "certificate chain missing after issuance");
        return Err(ProvisionError::CertificateMissing {
            domain: config.domain.clone(),
            path: chain,
        }
        .into());
    }
    reporter.success(&format!("certificate found at {}", chain.display()));

    // Step 6: swap to TLS.
    reporter.step(&WorkflowStep::ActivateTls.to_string());
    let tls = site::render(SiteVariant::Tls, config);
    activate_site(host, SiteVariant::Tls, &tls)
        .await
        .inspect_err(|e| report_rollback(reporter, e))?;
    reloads += 1;
    reporter.success(&format!("serving https://{}", config.domain));

    info!(domain = %config.domain, reloads, "provisioning finished");
    Ok(ProvisionOutcome {
        domain: config.domain.clone(),
        certificate: chain,
        reloads,
    })
}

/// Write, enable, validate and reload one site variant.
///
/// The default site is only disabled and nginx only reloaded after
/// validation succeeds. On a rejected configuration the previously enabled
/// site content is written back, or our site is unlinked when none was
/// enabled, so the sites directory matches what nginx is still serving.
///
/// # Errors
///
/// Returns `ConfigInvalid` if nginx rejects the configuration (no reload is
/// attempted), `ReloadFailed` if the reload fails.
pub async fn activate_site(
    host: &impl HostEnvironment,
    variant: SiteVariant,
    content: &str,
) -> Result<()> {
    let previous = host
        .read_active_site()
        .await
        .context("reading active site configuration")?;

    host.write_site(content)
        .await
        .with_context(|| format!("writing {variant} site configuration"))?;
    host.enable_site().await.context("enabling site")?;

    let output = host
        .validate_config()
        .await
        .context("validating nginx configuration")?;
    if !output.status.success() {
        restore_site(host, previous.as_deref()).await?;
        return Err(ProvisionError::ConfigInvalid {
            variant,
            detail: detail(&output),
        }
        .into());
    }
    debug!(%variant, "nginx configuration valid");

    if host
        .disable_default_site()
        .await
        .context("disabling default site")?
    {
        debug!("removed default site link");
    }
    reload(host).await
}

async fn restore_site(store: &impl SiteConfigStore, previous: Option<&str>) -> Result<()> {
    match previous {
        Some(content) => store
            .write_site(content)
            .await
            .context("restoring previous site configuration"),
        None => store
            .disable_site()
            .await
            .context("disabling rejected site configuration"),
    }
}

fn report_rollback(reporter: &impl ProgressReporter, err: &anyhow::Error) {
    if is_config_invalid(err) {
        warn!("rejected site configuration rolled back");
        reporter.warn("restored the previous site configuration");
    }
}

async fn reload(server: &impl WebServer) -> Result<()> {
    let output = server.reload().await.context("reloading nginx")?;
    if !output.status.success() {
        return Err(ProvisionError::ReloadFailed {
            detail: detail(&output),
        }
        .into());
    }
    Ok(())
}

async fn install_packages(installer: &impl PackageInstaller, packages: &[String]) -> Result<()> {
    let output = installer
        .install_packages(packages)
        .await
        .map_err(|e| ProvisionError::InstallFailed {
            detail: format!("{e:#}"),
        })?;
    if !output.status.success() {
        return Err(ProvisionError::InstallFailed {
            detail: detail(&output),
        }
        .into());
    }
    Ok(())
}

fn is_config_invalid(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<ProvisionError>(),
        Some(ProvisionError::ConfigInvalid { .. })
    )
}

/// Last `DETAIL_LINES` lines of stderr, falling back to stdout.
fn detail(output: &Output) -> String {
    let stream = if output.stderr.iter().all(u8::is_ascii_whitespace) {
        &output.stdout
    } else {
        &output.stderr
    };
    let text = String::from_utf8_lossy(stream);
    let lines: Vec<&str> = text.trim().lines().collect();
    let start = lines.len().saturating_sub(DETAIL_LINES);
    let tail = lines[start..].join("\n");
    if tail.is_empty() {
        format!("exited with {}", output.status)
    } else {
        tail
    }
}
