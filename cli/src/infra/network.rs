//! Network infrastructure: implements `PortProbe` using `spawn_blocking`.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use anyhow::Result;
use tracing::debug;

use crate::application::ports::PortProbe;

/// Per-port connect timeout.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// Production probe: a port is in use when a TCP connect to it succeeds.
pub struct TcpPortProbe {
    host: IpAddr,
    timeout: Duration,
}

impl TcpPortProbe {
    #[must_use]
    pub fn new(host: IpAddr, timeout: Duration) -> Self {
        Self { host, timeout }
    }
}

impl Default for TcpPortProbe {
    fn default() -> Self {
        Self::new(IpAddr::V4(Ipv4Addr::LOCALHOST), PROBE_TIMEOUT)
    }
}

impl PortProbe for TcpPortProbe {
    async fn is_listening(&self, port: u16) -> Result<bool> {
        let addr = SocketAddr::new(self.host, port);
        let timeout = self.timeout;
        let result = tokio::task::spawn_blocking(move || {
            std::net::TcpStream::connect_timeout(&addr, timeout)
        })
        .await
        .map_err(|e| anyhow::anyhow!("spawn_blocking panicked: {e}"))?;
        if let Err(e) = &result {
            debug!(%addr, error = %e, "no listener");
        }
        Ok(result.is_ok())
    }
}
