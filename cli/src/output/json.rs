//! JSON output helpers.
//!
//! `JsonRenderer` prints pretty JSON for `--json`; `format_error` builds the
//! error object printed when a command fails in that mode.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::domain::{DeployConfig, PortState, ProvisionOutcome, SiteStatus};

/// Renders domain types as JSON on stdout.
pub struct JsonRenderer;

impl JsonRenderer {
    /// Render the CLI version.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_version(&self, version: &str) -> Result<()> {
        print_json(&serde_json::json!({ "version": version }))
    }

    /// Render a port preflight check.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_preflight(&self, ports: &[PortState]) -> Result<()> {
        print_json(&serde_json::json!({
            "ok": ports.iter().all(|p| !p.in_use),
            "ports": ports,
        }))
    }

    /// Render a finished provisioning run.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_outcome(&self, outcome: &ProvisionOutcome) -> Result<()> {
        print_json(outcome)
    }

    /// Render site status.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_status(&self, status: &SiteStatus) -> Result<()> {
        print_json(status)
    }

    /// Render the effective configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_config(&self, config: &DeployConfig, path: &Path) -> Result<()> {
        print_json(&serde_json::json!({
            "path": path,
            "config": config,
        }))
    }
}

fn print_json(value: &impl Serialize) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("JSON serialization failed")?;
    println!("{out}");
    Ok(())
}

/// Format a JSON error object.
///
/// Output (pretty-printed):
/// ```json
/// {
///   "error": true,
///   "message": "...",
///   "code": "..."
/// }
/// ```
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_error(message: &str, code: &str) -> Result<String> {
    let obj = serde_json::json!({
        "error": true,
        "message": message,
        "code": code,
    });
    serde_json::to_string_pretty(&obj).context("JSON serialization failed")
}
