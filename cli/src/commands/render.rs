//! `noteomatic-deploy render`: print a site document without touching the host.

use std::process::ExitCode;

use anyhow::Result;
use clap::{Args, ValueEnum};

use crate::app::AppContext;
use crate::domain::site::{self, SiteVariant};

/// Arguments for the render command.
#[derive(Args)]
pub struct RenderArgs {
    /// Which site document to print
    #[arg(value_enum)]
    pub variant: VariantArg,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum VariantArg {
    /// Port 80 only, proxies to the upstream and serves ACME challenges
    Plain,
    /// Redirects port 80 and terminates TLS on 443
    Tls,
}

impl From<VariantArg> for SiteVariant {
    fn from(arg: VariantArg) -> Self {
        match arg {
            VariantArg::Plain => Self::Plain,
            VariantArg::Tls => Self::Tls,
        }
    }
}

/// Run the render command. Always prints the raw document, even with `--json`.
///
/// # Errors
///
/// Returns an error if configuration cannot be loaded or is invalid.
pub fn run(app: &AppContext, args: &RenderArgs) -> Result<ExitCode> {
    let config = app.effective_config()?;
    config.validate()?;
    print!("{}", site::render(args.variant.into(), &config));
    Ok(ExitCode::SUCCESS)
}
