//! Output formatting module

pub mod human;
pub mod json;
pub mod reporter;
pub mod styles;

use std::path::Path;

use anyhow::Result;
use console::Term;
use owo_colors::OwoColorize as _;

use crate::domain::{DeployConfig, PortState, ProvisionOutcome, SiteStatus};

pub use human::HumanRenderer;
pub use json::JsonRenderer;
pub use reporter::TerminalReporter;
pub use styles::Styles;

/// Output context carrying styling and terminal state.
pub struct OutputContext {
    /// Stylesheet for colored output.
    pub styles: Styles,
    /// Whether to suppress non-error output.
    pub quiet: bool,
}

impl OutputContext {
    /// Create output context based on CLI flags and environment.
    #[must_use]
    pub fn new(no_color: bool, quiet: bool) -> Self {
        let is_tty = Term::stdout().is_term();
        let use_colors = !no_color && is_tty && std::env::var("NO_COLOR").is_err();

        let mut styles = Styles::default();
        if use_colors {
            styles.colorize();
        }

        Self { styles, quiet }
    }

    /// Print a success message prefixed with `✓`. Suppressed when `quiet`.
    pub fn success(&self, msg: &str) {
        if !self.quiet {
            println!("  {} {msg}", "✓".style(self.styles.success));
        }
    }

    /// Print a warning message prefixed with `⚠`. Suppressed when `quiet`.
    pub fn warn(&self, msg: &str) {
        if !self.quiet {
            println!("  {} {msg}", "⚠".style(self.styles.warning));
        }
    }

    /// Print an error message prefixed with `✗` to stderr. Never suppressed.
    pub fn error(&self, msg: &str) {
        eprintln!("  {} {msg}", "✗".style(self.styles.error));
    }

    /// Print an info message prefixed with `ℹ`. Suppressed when `quiet`.
    pub fn info(&self, msg: &str) {
        if !self.quiet {
            println!("  {} {msg}", "ℹ".style(self.styles.info));
        }
    }

    /// Print a section header. Suppressed when `quiet`.
    pub fn header(&self, msg: &str) {
        if !self.quiet {
            println!("  {}", msg.style(self.styles.header));
        }
    }

    /// Print a key-value pair with the key dimmed. Suppressed when `quiet`.
    pub fn kv(&self, key: &str, value: &str) {
        if !self.quiet {
            println!("  {:<22}{value}", key.style(self.styles.dim));
        }
    }
}

/// Renders results in the mode selected on the command line.
pub enum Renderer<'a> {
    /// Terminal output.
    Human(HumanRenderer<'a>),
    /// `--json` output.
    Json(JsonRenderer),
}

impl Renderer<'_> {
    /// Render the CLI version.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_version(&self, version: &str) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_version(version);
                Ok(())
            }
            Self::Json(r) => r.render_version(version),
        }
    }

    /// Render a port preflight check.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_preflight(&self, ports: &[PortState]) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_preflight(ports);
                Ok(())
            }
            Self::Json(r) => r.render_preflight(ports),
        }
    }

    /// Render a finished provisioning run.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_outcome(&self, outcome: &ProvisionOutcome) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_outcome(outcome);
                Ok(())
            }
            Self::Json(r) => r.render_outcome(outcome),
        }
    }

    /// Render site status.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_status(&self, status: &SiteStatus) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_status(status);
                Ok(())
            }
            Self::Json(r) => r.render_status(status),
        }
    }

    /// Render the effective configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_config(&self, config: &DeployConfig, path: &Path) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_config(config, path);
                Ok(())
            }
            Self::Json(r) => r.render_config(config, path),
        }
    }
}
