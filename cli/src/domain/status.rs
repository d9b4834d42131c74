//! Site status types and classification.

use std::path::PathBuf;

use serde::Serialize;

use crate::domain::config::DeployConfig;
use crate::domain::site::{self, SiteVariant};

/// What is currently in the enabled site slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActiveSite {
    /// Byte-identical to the plain variant.
    Plain,
    /// Byte-identical to the TLS variant.
    Tls,
    /// Present but matches neither rendered variant.
    Modified,
    /// Not enabled.
    Missing,
}

impl ActiveSite {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::Tls => "tls",
            Self::Modified => "modified",
            Self::Missing => "missing",
        }
    }
}

/// Listener state of one required port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PortState {
    pub port: u16,
    pub in_use: bool,
}

/// Read-only snapshot reported by `status`.
#[derive(Debug, Clone, Serialize)]
pub struct SiteStatus {
    pub domain: String,
    pub active_site: ActiveSite,
    pub certificate: PathBuf,
    pub certificate_present: bool,
    pub default_site_enabled: bool,
    pub ports: Vec<PortState>,
}

/// Classify the enabled site content against the rendered variants.
#[must_use]
pub fn classify(active: Option<&str>, config: &DeployConfig) -> ActiveSite {
    let Some(content) = active else {
        return ActiveSite::Missing;
    };
    if content == site::render(SiteVariant::Tls, config) {
        ActiveSite::Tls
    } else if content == site::render(SiteVariant::Plain, config) {
        ActiveSite::Plain
    } else {
        ActiveSite::Modified
    }
}
