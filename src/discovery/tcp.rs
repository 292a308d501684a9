//! TCP sweep of the SMB port across the local /24

use super::probe::{DeviceSink, Probe};
use crate::error::Result;
use crate::net::{SubnetContext, can_connect};
use crate::types::{DiscoveryConfig, NasDevice, ProbeKind};
use async_trait::async_trait;
use futures::StreamExt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

/// Marks every host accepting a connection on the SMB port as reachable
///
/// Connects run `concurrency` at a time so a full /24 fits well inside the
/// discovery deadline.
#[derive(Debug, Clone)]
pub struct TcpPortProbe {
    port: u16,
    connect_timeout: Duration,
    concurrency: usize,
}

impl TcpPortProbe {
    /// Create the probe with timing from `config`
    #[must_use]
    pub fn new(config: &DiscoveryConfig) -> Self {
        Self {
            port: config.smb_port,
            connect_timeout: config.connect_timeout,
            concurrency: config.sweep_concurrency.max(1),
        }
    }
}

#[async_trait]
impl Probe for TcpPortProbe {
    fn name(&self) -> &'static str {
        ProbeKind::TcpPort.as_str()
    }

    async fn probe(&self, subnet: &SubnetContext, sink: &DeviceSink) -> Result<()> {
        let port = self.port;
        let wait = self.connect_timeout;

        let mut attempts = futures::stream::iter(subnet.hosts())
            .map(|host| async move {
                let addr = SocketAddr::new(IpAddr::V4(host), port);
                (host, can_connect(addr, wait).await)
            })
            .buffer_unordered(self.concurrency);

        let mut open = 0usize;
        while let Some((host, reachable)) = attempts.next().await {
            if reachable {
                open += 1;
                sink.report(NasDevice::new(IpAddr::V4(host), ProbeKind::TcpPort).reachable());
            }
        }

        tracing::debug!(port, open, "TCP sweep finished");
        Ok(())
    }
}
