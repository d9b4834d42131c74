//! Application service: port availability checks.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use anyhow::{Context, Result};
use tracing::debug;

use crate::application::ports::PortProbe;
use crate::domain::{PortState, ProvisionError};

/// Probe every port and report its listener state, in the given order.
///
/// # Errors
///
/// Returns an error if a probe itself fails (not if a port is in use).
pub async fn probe_ports(probe: &impl PortProbe, ports: &[u16]) -> Result<Vec<PortState>> {
    let mut states = Vec::with_capacity(ports.len());
    for &port in ports {
        let in_use = probe
            .is_listening(port)
            .await
            .with_context(|| format!("probing port {port}"))?;
        debug!(port, in_use, "probed port");
        states.push(PortState { port, in_use });
    }
    Ok(states)
}

/// Fail on the first port that already has a listener.
///
/// # Errors
///
/// Returns `ProvisionError::PortInUse` naming the offending port.
pub async fn check_ports(probe: &impl PortProbe, ports: &[u16]) -> Result<()> {
    for &port in ports {
        let in_use = probe
            .is_listening(port)
            .await
            .with_context(|| format!("probing port {port}"))?;
        if in_use {
            return Err(ProvisionError::PortInUse { port }.into());
        }
        debug!(port, "port is free");
    }
    Ok(())
}
