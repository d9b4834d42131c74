//! nginx site configuration rendering.
//!
//! Pure functions only. The two variants share the proxy location so the
//! note server sees the same headers before and after the TLS swap.

use std::fmt;
use std::fmt::Write as _;

use serde::Serialize;

use crate::domain::config::DeployConfig;

/// Request body limit; PDF scans posted to `/upload` are large.
const CLIENT_MAX_BODY_SIZE: &str = "50M";

/// Which site configuration document is (or should be) active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SiteVariant {
    /// Plain HTTP on port 80. Needed for the ACME HTTP-01 challenge.
    Plain,
    /// HTTPS on 443 with an HTTP→HTTPS redirect on 80.
    Tls,
}

impl fmt::Display for SiteVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain => f.write_str("plain"),
            Self::Tls => f.write_str("tls"),
        }
    }
}

/// Render the site configuration for `variant`.
///
/// Deterministic: the same config always yields byte-identical output, which
/// is what status classification relies on.
#[must_use]
pub fn render(variant: SiteVariant, config: &DeployConfig) -> String {
    match variant {
        SiteVariant::Plain => render_plain(config),
        SiteVariant::Tls => render_tls(config),
    }
}

fn render_plain(config: &DeployConfig) -> String {
    let mut out = header(SiteVariant::Plain, config);
    out.push_str("server {\n");
    out.push_str("    listen 80;\n");
    out.push_str("    listen [::]:80;\n");
    let _ = writeln!(out, "    server_name {};", config.domain);
    out.push('\n');
    out.push_str(&acme_location(config));
    out.push('\n');
    out.push_str(&proxy_location(config));
    out.push_str("}\n");
    out
}

fn render_tls(config: &DeployConfig) -> String {
    let mut out = header(SiteVariant::Tls, config);

    out.push_str("server {\n");
    out.push_str("    listen 80;\n");
    out.push_str("    listen [::]:80;\n");
    let _ = writeln!(out, "    server_name {};", config.domain);
    out.push('\n');
    out.push_str(&acme_location(config));
    out.push('\n');
    out.push_str("    location / {\n");
    out.push_str("        return 301 https://$host$request_uri;\n");
    out.push_str("    }\n");
    out.push_str("}\n\n");

    out.push_str("server {\n");
    out.push_str("    listen 443 ssl;\n");
    out.push_str("    listen [::]:443 ssl;\n");
    let _ = writeln!(out, "    server_name {};", config.domain);
    out.push('\n');
    let _ = writeln!(
        out,
        "    ssl_certificate {};",
        config.certificate_chain().display()
    );
    let _ = writeln!(
        out,
        "    ssl_certificate_key {};",
        config.certificate_key().display()
    );
    out.push_str("    ssl_protocols TLSv1.2 TLSv1.3;\n");
    out.push_str("    ssl_prefer_server_ciphers off;\n");
    out.push_str("    ssl_session_cache shared:SSL:10m;\n");
    out.push_str("    ssl_session_timeout 1d;\n");
    out.push('\n');
    out.push_str(&proxy_location(config));
    out.push_str("}\n");
    out
}

fn header(variant: SiteVariant, config: &DeployConfig) -> String {
    format!(
        "# Managed by noteomatic-deploy ({variant}) for {}. Local edits are overwritten.\n\n",
        config.domain
    )
}

fn acme_location(config: &DeployConfig) -> String {
    format!(
        "    location /.well-known/acme-challenge/ {{\n        root {};\n    }}\n",
        config.nginx.webroot.display()
    )
}

fn proxy_location(config: &DeployConfig) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "    client_max_body_size {CLIENT_MAX_BODY_SIZE};");
    out.push('\n');
    out.push_str("    location / {\n");
    let _ = writeln!(out, "        proxy_pass http://{};", config.upstream);
    out.push_str("        proxy_set_header Host $host;\n");
    out.push_str("        proxy_set_header X-Real-IP $remote_addr;\n");
    out.push_str("        proxy_set_header X-Forwarded-For $proxy_add_x_forwarded_for;\n");
    out.push_str("        proxy_set_header X-Forwarded-Proto $scheme;\n");
    out.push_str("        proxy_read_timeout 300s;\n");
    out.push_str("    }\n");
    out
}
