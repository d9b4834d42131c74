//! `noteomatic-deploy preflight`: report whether the required ports are free.

use std::process::ExitCode;

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::preflight::probe_ports;
use crate::infra::network::TcpPortProbe;

/// Run the preflight command. Exits non-zero when any port is taken.
///
/// # Errors
///
/// Returns an error if configuration cannot be loaded or a probe fails.
pub async fn run(app: &AppContext) -> Result<ExitCode> {
    let config = app.effective_config()?;
    let ports = probe_ports(&TcpPortProbe::default(), &config.ports).await?;
    app.renderer().render_preflight(&ports)?;

    if ports.iter().any(|p| p.in_use) {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
