//! `noteomatic-deploy provision`: the full SSL provisioning workflow.

use std::process::ExitCode;

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::provision::provision_site;
use crate::infra::host::SystemHost;
use crate::output::TerminalReporter;

/// Run the provision command.
///
/// # Errors
///
/// Returns the first failing workflow step as a `ProvisionError`.
pub async fn run(app: &AppContext) -> Result<ExitCode> {
    let config = app.effective_config()?;
    let host = SystemHost::from_config(&config);
    let reporter = TerminalReporter::new(&app.output);

    app.output
        .info(&format!("Provisioning HTTPS for {}", config.domain));
    let outcome = provision_site(&host, &reporter, &config).await?;
    app.renderer().render_outcome(&outcome)?;
    Ok(ExitCode::SUCCESS)
}
