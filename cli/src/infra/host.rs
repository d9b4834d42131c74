//! Infrastructure implementation of the host-environment port traits.
//!
//! `SystemHost<R>` routes apt, nginx, systemctl and certbot calls through a
//! `CommandRunner`, and delegates the sites directory, port probe and file
//! checks to their own adapters.

use std::path::Path;
use std::process::{ExitStatus, Output};

use anyhow::{Context, Result};

use crate::application::ports::{
    CertificateIssuer, CommandRunner, FileOracle, PackageInstaller, PortProbe, SiteConfigStore,
    WebServer,
};
use crate::domain::DeployConfig;
use crate::infra::command_runner::{INSTALL_TIMEOUT, TokioCommandRunner};
use crate::infra::fs::LocalFs;
use crate::infra::network::TcpPortProbe;
use crate::infra::sites::NginxSites;

/// Infrastructure adapter for the machine being provisioned.
///
/// Generic over `R: CommandRunner` and `P: PortProbe` so that tests can inject
/// mocks without spawning real processes or binding sockets.
pub struct SystemHost<R: CommandRunner, P: PortProbe = TcpPortProbe> {
    runner: R,
    probe: P,
    sites: NginxSites,
    fs: LocalFs,
}

impl<R: CommandRunner, P: PortProbe> SystemHost<R, P> {
    /// Create a host with explicit runner and probe instances.
    pub fn new(runner: R, probe: P, config: &DeployConfig) -> Self {
        Self {
            runner,
            probe,
            sites: NginxSites::new(&config.nginx),
            fs: LocalFs,
        }
    }

    /// The command runner every host command goes through.
    pub fn runner(&self) -> &R {
        &self.runner
    }
}

impl SystemHost<TokioCommandRunner> {
    /// Convenience constructor for production use.
    #[must_use]
    pub fn from_config(config: &DeployConfig) -> Self {
        Self::new(
            TokioCommandRunner::default(),
            TcpPortProbe::default(),
            config,
        )
    }
}

/// `certbot certonly --nginx` arguments.
///
/// `certonly` leaves our site file alone; the TLS variant is installed by the
/// workflow. `--keep-until-expiring` makes a re-run reuse a valid cert.
#[must_use]
pub fn certbot_args<'a>(domain: &'a str, email: Option<&'a str>) -> Vec<&'a str> {
    let mut args = vec!["certonly", "--nginx", "-d", domain, "--keep-until-expiring"];
    if let Some(email) = email {
        args.extend(["--email", email, "--agree-tos", "--non-interactive"]);
    }
    args
}

impl<R: CommandRunner, P: PortProbe> PortProbe for SystemHost<R, P> {
    async fn is_listening(&self, port: u16) -> Result<bool> {
        self.probe.is_listening(port).await
    }
}

impl<R: CommandRunner, P: PortProbe> PackageInstaller for SystemHost<R, P> {
    async fn install_packages(&self, packages: &[String]) -> Result<Output> {
        let update = self
            .runner
            .run_with_timeout(
                "env",
                &["DEBIAN_FRONTEND=noninteractive", "apt-get", "update", "-q"],
                INSTALL_TIMEOUT,
            )
            .await
            .context("apt-get update")?;
        if !update.status.success() {
            return Ok(update);
        }

        let mut args = vec!["DEBIAN_FRONTEND=noninteractive", "apt-get", "install", "-y", "-q"];
        args.extend(packages.iter().map(String::as_str));
        self.runner
            .run_with_timeout("env", &args, INSTALL_TIMEOUT)
            .await
            .context("apt-get install")
    }
}

impl<R: CommandRunner, P: PortProbe> SiteConfigStore for SystemHost<R, P> {
    async fn write_site(&self, content: &str) -> Result<()> {
        self.sites.write_site(content).await
    }

    async fn enable_site(&self) -> Result<()> {
        self.sites.enable_site().await
    }

    async fn disable_site(&self) -> Result<()> {
        self.sites.disable_site().await
    }

    async fn disable_default_site(&self) -> Result<bool> {
        self.sites.disable_default_site().await
    }

    async fn read_active_site(&self) -> Result<Option<String>> {
        self.sites.read_active_site().await
    }

    async fn default_site_enabled(&self) -> Result<bool> {
        self.sites.default_site_enabled().await
    }
}

impl<R: CommandRunner, P: PortProbe> WebServer for SystemHost<R, P> {
    async fn validate_config(&self) -> Result<Output> {
        self.runner.run("nginx", &["-t"]).await.context("nginx -t")
    }

    async fn reload(&self) -> Result<Output> {
        self.runner
            .run("systemctl", &["reload-or-restart", "nginx"])
            .await
            .context("systemctl reload-or-restart nginx")
    }
}

impl<R: CommandRunner, P: PortProbe> CertificateIssuer for SystemHost<R, P> {
    async fn issue_certificate(&self, domain: &str, email: Option<&str>) -> Result<ExitStatus> {
        self.runner
            .run_status("certbot", &certbot_args(domain, email))
            .await
            .context("certbot")
    }
}

impl<R: CommandRunner, P: PortProbe> FileOracle for SystemHost<R, P> {
    fn exists(&self, path: &Path) -> bool {
        self.fs.exists(path)
    }
}
