//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use std::path::PathBuf;

use thiserror::Error;

use crate::domain::site::SiteVariant;

// ── Provisioning errors ───────────────────────────────────────────────────────

/// Terminal failures of the provisioning workflow. None of them are retried.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("Port {port} is already in use. Free it and re-run the provisioning.")]
    PortInUse { port: u16 },

    #[error("Package installation failed: {detail}")]
    InstallFailed { detail: String },

    #[error("nginx rejected the {variant} site configuration:\n{detail}")]
    ConfigInvalid { variant: SiteVariant, detail: String },

    #[error("Failed to reload nginx: {detail}")]
    ReloadFailed { detail: String },

    #[error(
        "No certificate found for {domain} at {}.\n\
         Check the certbot output above; the site keeps serving plain HTTP.",
        .path.display()
    )]
    CertificateMissing { domain: String, path: PathBuf },
}

impl ProvisionError {
    /// Stable machine-readable code, used in `--json` error output.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::PortInUse { .. } => "port_in_use",
            Self::InstallFailed { .. } => "install_failed",
            Self::ConfigInvalid { .. } => "config_invalid",
            Self::ReloadFailed { .. } => "reload_failed",
            Self::CertificateMissing { .. } => "certificate_missing",
        }
    }
}

/// Code for any error reaching the CLI boundary.
#[must_use]
pub fn error_code(err: &anyhow::Error) -> &'static str {
    if let Some(e) = err.downcast_ref::<ProvisionError>() {
        return e.code();
    }
    if err.downcast_ref::<ConfigError>().is_some() {
        return "invalid_config";
    }
    "error"
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors related to configuration key/value validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown setting: {key}\n\nValid settings: {valid}")]
    UnknownKey { key: String, valid: String },

    #[error("Invalid value for {key}: {value}\n\nExpected: {expected}")]
    InvalidValue {
        key: String,
        value: String,
        expected: String,
    },

    #[error("Invalid domain name '{0}'")]
    InvalidDomain(String),
}
