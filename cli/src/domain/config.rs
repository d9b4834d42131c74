//! Domain types and validators for deploy configuration.
//!
//! Pure functions only: no I/O, no async, no filesystem access.

use std::path::PathBuf;
use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::error::ConfigError;

// ── Constants ────────────────────────────────────────────────────────────────

pub const VALID_CONFIG_KEYS: &[&str] = &["domain", "email", "upstream"];

/// Domain served when nothing else is configured.
pub const DEFAULT_DOMAIN: &str = "notes.noteomatic.app";

/// Ports nginx (80, 443) and the note server (8000) will bind.
pub const DEFAULT_PORTS: &[u16] = &[80, 443, 8000];

/// Packages installed by the dependency step.
pub const DEFAULT_PACKAGES: &[&str] = &[
    "nginx",
    "certbot",
    "python3-certbot-nginx",
    "netcat-openbsd",
];

/// One DNS label: alphanumeric ends, hyphens allowed inside, at most 63 chars.
static DOMAIN_LABEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^[a-z0-9]([a-z0-9-]{0,61}[a-z0-9])?$").expect("valid regex")
});

// ── Config schema ────────────────────────────────────────────────────────────

/// Top-level configuration stored in `deploy.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    /// Domain the site is served on and the certificate is issued for.
    pub domain: String,
    /// ACME account email. When unset certbot runs interactively.
    pub email: Option<String>,
    /// `host:port` of the note server nginx proxies to.
    pub upstream: String,
    /// Ports that must be free before provisioning.
    pub ports: Vec<u16>,
    /// Packages installed by the dependency step.
    pub packages: Vec<String>,
    /// nginx layout.
    pub nginx: NginxConfig,
    /// certbot layout.
    pub acme: AcmeConfig,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            domain: DEFAULT_DOMAIN.to_string(),
            email: None,
            upstream: "127.0.0.1:8000".to_string(),
            ports: DEFAULT_PORTS.to_vec(),
            packages: DEFAULT_PACKAGES.iter().map(ToString::to_string).collect(),
            nginx: NginxConfig::default(),
            acme: AcmeConfig::default(),
        }
    }
}

/// nginx directory layout (Debian convention).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NginxConfig {
    pub sites_available: PathBuf,
    pub sites_enabled: PathBuf,
    /// File name of our site under both directories.
    pub site_name: String,
    /// Site link removed from `sites_enabled` on activation.
    pub default_site: String,
    /// Webroot serving `/.well-known/acme-challenge/`.
    pub webroot: PathBuf,
}

impl Default for NginxConfig {
    fn default() -> Self {
        Self {
            sites_available: PathBuf::from("/etc/nginx/sites-available"),
            sites_enabled: PathBuf::from("/etc/nginx/sites-enabled"),
            site_name: "noteomatic".to_string(),
            default_site: "default".to_string(),
            webroot: PathBuf::from("/var/www/html"),
        }
    }
}

/// certbot directory layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcmeConfig {
    /// Directory holding one subdirectory per issued domain.
    pub live_dir: PathBuf,
}

impl Default for AcmeConfig {
    fn default() -> Self {
        Self {
            live_dir: PathBuf::from("/etc/letsencrypt/live"),
        }
    }
}

impl DeployConfig {
    /// Path of the certificate chain certbot writes for `self.domain`.
    #[must_use]
    pub fn certificate_chain(&self) -> PathBuf {
        self.acme.live_dir.join(&self.domain).join("fullchain.pem")
    }

    /// Path of the private key certbot writes for `self.domain`.
    #[must_use]
    pub fn certificate_key(&self) -> PathBuf {
        self.acme.live_dir.join(&self.domain).join("privkey.pem")
    }

    /// Checks the fields that end up interpolated into nginx config and
    /// certbot arguments.
    ///
    /// # Errors
    ///
    /// Returns the first invalid field.
    pub fn validate(&self) -> Result<()> {
        validate_domain(&self.domain)?;
        validate_config_value("upstream", &self.upstream)?;
        if let Some(email) = &self.email {
            validate_config_value("email", email)?;
        }
        if self.ports.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "ports".to_string(),
                value: "[]".to_string(),
                expected: "at least one port".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

// ── Validators ───────────────────────────────────────────────────────────────

/// Validates a fully qualified domain name.
///
/// # Errors
///
/// Returns `ConfigError::InvalidDomain` for empty labels, labels starting or
/// ending with a hyphen, uppercase input, or names longer than 253 chars.
pub fn validate_domain(domain: &str) -> Result<()> {
    let valid = !domain.is_empty()
        && domain.len() <= 253
        && domain.contains('.')
        && domain.split('.').all(|label| DOMAIN_LABEL_RE.is_match(label));
    if !valid {
        return Err(ConfigError::InvalidDomain(domain.to_string()).into());
    }
    Ok(())
}

/// Validates a configuration key against the whitelist.
///
/// # Errors
///
/// Returns an error if the key is not in the allowed list.
pub fn validate_config_key(key: &str) -> Result<()> {
    if !VALID_CONFIG_KEYS.contains(&key) {
        return Err(ConfigError::UnknownKey {
            key: key.to_string(),
            valid: VALID_CONFIG_KEYS.join(", "),
        }
        .into());
    }
    Ok(())
}

/// Validates a configuration value for the given key.
///
/// # Errors
///
/// Returns an error if the value is not valid for the key.
pub fn validate_config_value(key: &str, value: &str) -> Result<()> {
    let invalid = |expected: &str| -> anyhow::Error {
        ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            expected: expected.to_string(),
        }
        .into()
    };
    match key {
        "domain" => validate_domain(value),
        "email" => {
            let ok = value
                .split_once('@')
                .is_some_and(|(user, host)| !user.is_empty() && host.contains('.'))
                && !value.chars().any(char::is_whitespace);
            if ok { Ok(()) } else { Err(invalid("an email address")) }
        }
        "upstream" => {
            let ok = value.rsplit_once(':').is_some_and(|(host, port)| {
                !host.is_empty()
                    && !host.chars().any(|c| c.is_whitespace() || c == ';')
                    && port.parse::<u16>().is_ok_and(|p| p != 0)
            });
            if ok { Ok(()) } else { Err(invalid("host:port")) }
        }
        _ => validate_config_key(key),
    }
}

// ── Unit tests ───────────────────────────────────────────────────────────────
