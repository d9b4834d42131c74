//! `noteomatic-deploy status`: show what the host is currently serving.

use std::process::ExitCode;

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::site_status::gather_status;
use crate::infra::host::SystemHost;

/// Run the status command.
///
/// # Errors
///
/// Returns an error if configuration cannot be loaded or the sites
/// directory cannot be read.
pub async fn run(app: &AppContext) -> Result<ExitCode> {
    let config = app.effective_config()?;
    let host = SystemHost::from_config(&config);
    let status = gather_status(&host, &config).await?;
    app.renderer().render_status(&status)?;
    Ok(ExitCode::SUCCESS)
}
