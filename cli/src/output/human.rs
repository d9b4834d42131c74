//! Human-readable terminal renderer.

use std::path::Path;

use owo_colors::OwoColorize as _;

use crate::domain::{ActiveSite, DeployConfig, PortState, ProvisionOutcome, SiteStatus};
use crate::output::OutputContext;

/// Renders domain types as human-readable terminal output using `OutputContext`.
pub struct HumanRenderer<'a> {
    ctx: &'a OutputContext,
}

impl<'a> HumanRenderer<'a> {
    /// Create a new `HumanRenderer` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    /// Render the CLI version.
    pub fn render_version(&self, version: &str) {
        println!("noteomatic-deploy {version}");
    }

    /// Render the result of a port preflight check.
    pub fn render_preflight(&self, ports: &[PortState]) {
        for state in ports {
            if state.in_use {
                self.ctx.error(&format!("port {} is in use", state.port));
            } else {
                self.ctx.success(&format!("port {} is free", state.port));
            }
        }
    }

    /// Render a finished provisioning run.
    pub fn render_outcome(&self, outcome: &ProvisionOutcome) {
        if self.ctx.quiet {
            return;
        }
        println!();
        self.ctx
            .success(&format!("https://{} is live", outcome.domain));
        self.ctx
            .kv("Certificate:", &outcome.certificate.display().to_string());
        self.ctx.kv("nginx reloads:", &outcome.reloads.to_string());
    }

    /// Render site status.
    pub fn render_status(&self, status: &SiteStatus) {
        self.ctx.kv("Domain:", &status.domain);
        self.ctx
            .kv("Active site:", active_site_display(status.active_site));
        let cert = if status.certificate_present {
            format!("present ({})", status.certificate.display())
        } else {
            format!("missing ({})", status.certificate.display())
        };
        self.ctx.kv("Certificate:", &cert);
        self.ctx.kv(
            "Default site:",
            if status.default_site_enabled {
                "enabled"
            } else {
                "disabled"
            },
        );

        if !self.ctx.quiet {
            println!();
        }
        self.ctx.header("Ports:");
        for state in &status.ports {
            let label = if state.in_use { "listening" } else { "free" };
            self.ctx.kv(&format!("  {}", state.port), label);
        }

        if status.active_site == ActiveSite::Modified {
            if !self.ctx.quiet {
                println!();
            }
            self.ctx
                .warn("Active site differs from the rendered config; the next run overwrites it.");
        }
    }

    /// Render the effective configuration.
    pub fn render_config(&self, config: &DeployConfig, path: &Path) {
        println!();
        println!(
            "  {}",
            format!("Configuration ({})", path.display()).style(self.ctx.styles.header)
        );
        println!();
        println!("  {:<20} {}", "domain:", config.domain);
        println!(
            "  {:<20} {}",
            "email:",
            config.email.as_deref().unwrap_or("(interactive)")
        );
        println!("  {:<20} {}", "upstream:", config.upstream);
        let ports: Vec<String> = config.ports.iter().map(ToString::to_string).collect();
        println!("  {:<20} {}", "ports:", ports.join(", "));
        println!("  {:<20} {}", "packages:", config.packages.join(" "));
        println!(
            "  {:<20} {}",
            "site:",
            config
                .nginx
                .sites_available
                .join(&config.nginx.site_name)
                .display()
        );
        println!(
            "  {:<20} {}",
            "certificate:",
            config.certificate_chain().display()
        );
        println!();
        println!("  {}", "Environment:".style(self.ctx.styles.bold));
        for key in [
            crate::infra::config::CONFIG_PATH_ENV,
            crate::infra::config::DOMAIN_ENV,
            crate::infra::config::EMAIL_ENV,
        ] {
            println!(
                "    {:<26} {}",
                format!("{key}:"),
                std::env::var(key).unwrap_or_else(|_| "(not set)".to_string())
            );
        }
    }
}

/// Display string for the active site slot.
#[must_use]
pub fn active_site_display(active: ActiveSite) -> &'static str {
    match active {
        ActiveSite::Plain => "plain HTTP",
        ActiveSite::Tls => "HTTPS",
        ActiveSite::Modified => "modified by hand",
        ActiveSite::Missing => "not enabled",
    }
}
