//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain`, never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Output};

use anyhow::Result;

use crate::domain::DeployConfig;

// ── Host Port Traits ──────────────────────────────────────────────────────────

/// Checks whether something is already listening on a local TCP port.
#[allow(async_fn_in_trait)]
pub trait PortProbe {
    /// Returns `true` when a listener accepts connections on `127.0.0.1:port`.
    ///
    /// Implementations must bound the probe with a timeout so a filtered port
    /// cannot hang the caller.
    async fn is_listening(&self, port: u16) -> Result<bool>;
}

/// OS package installation.
#[allow(async_fn_in_trait)]
pub trait PackageInstaller {
    /// Refresh the package index and install `packages`.
    ///
    /// Installing packages that are already present must succeed.
    async fn install_packages(&self, packages: &[String]) -> Result<Output>;
}

/// The web server's site configuration slot (`sites-available` /
/// `sites-enabled`).
#[allow(async_fn_in_trait)]
pub trait SiteConfigStore {
    /// Write `content` as our site's configuration document, replacing any
    /// previous one.
    async fn write_site(&self, content: &str) -> Result<()>;
    /// Link our site into the enabled set. No-op when already linked.
    async fn enable_site(&self) -> Result<()>;
    /// Remove our site from the enabled set. No-op when not linked.
    async fn disable_site(&self) -> Result<()>;
    /// Remove the distribution's default site from the enabled set.
    /// Returns `true` if a link was removed.
    async fn disable_default_site(&self) -> Result<bool>;
    /// Content of our enabled site, or `None` when it is not enabled.
    async fn read_active_site(&self) -> Result<Option<String>>;
    /// Whether the default site is still enabled.
    async fn default_site_enabled(&self) -> Result<bool>;
}

/// Web server control.
#[allow(async_fn_in_trait)]
pub trait WebServer {
    /// Syntax-check the full configuration (`nginx -t`).
    async fn validate_config(&self) -> Result<Output>;
    /// Apply the configuration to the running service.
    async fn reload(&self) -> Result<Output>;
}

/// ACME client.
#[allow(async_fn_in_trait)]
pub trait CertificateIssuer {
    /// Request a certificate for `domain` through the web-server plugin.
    ///
    /// May prompt on the terminal when `email` is `None`. The exit status is
    /// informational only; callers verify the artifact on disk.
    async fn issue_certificate(&self, domain: &str, email: Option<&str>) -> Result<ExitStatus>;
}

/// Read-only filesystem checks.
pub trait FileOracle {
    /// Whether `path` exists.
    fn exists(&self, path: &Path) -> bool;
}

/// Composite trait: everything the provisioning workflow touches on the host.
pub trait HostEnvironment:
    PortProbe + PackageInstaller + SiteConfigStore + WebServer + CertificateIssuer + FileOracle
{
}

/// Blanket implementation: any type implementing all sub-traits is a `HostEnvironment`.
impl<T> HostEnvironment for T where
    T: PortProbe + PackageInstaller + SiteConfigStore + WebServer + CertificateIssuer + FileOracle
{
}

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program and capture its output.
    ///
    /// Implementations should delegate to `run_with_timeout` using the
    /// instance's configured default timeout.
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output>;
    /// Run a program with a custom timeout override.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or exceeds `timeout`.
    /// On timeout, the child process must be killed (not left orphaned).
    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: std::time::Duration,
    ) -> Result<Output>;
    /// Run a program attached to the terminal and return only its exit status.
    async fn run_status(&self, program: &str, args: &[&str]) -> Result<ExitStatus>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait: no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}

// ── Config Port ───────────────────────────────────────────────────────────────

/// Abstracts persistence of `DeployConfig`.
pub trait ConfigStore {
    /// Load the configuration, falling back to defaults when none is stored.
    fn load(&self) -> Result<DeployConfig>;
    /// Persist the configuration.
    fn save(&self, config: &DeployConfig) -> Result<()>;
    /// Location of the configuration file.
    fn path(&self) -> Result<PathBuf>;
}
