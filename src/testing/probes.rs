//! Scripted discovery probes

use crate::discovery::{DeviceSink, Probe};
use crate::error::{NasError, Result};
use crate::net::SubnetContext;
use crate::types::NasDevice;
use async_trait::async_trait;
use std::time::Duration;

/// Reports a fixed list of devices, optionally pausing before each one
#[derive(Debug, Clone)]
pub struct StaticProbe {
    name: &'static str,
    devices: Vec<NasDevice>,
    delay: Duration,
}

impl StaticProbe {
    /// Probe reporting `devices` immediately
    #[must_use]
    pub fn new(name: &'static str, devices: Vec<NasDevice>) -> Self {
        Self {
            name,
            devices,
            delay: Duration::ZERO,
        }
    }

    /// Wait `delay` before each report
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl Probe for StaticProbe {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn probe(&self, _subnet: &SubnetContext, sink: &DeviceSink) -> Result<()> {
        for device in &self.devices {
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            sink.report(device.clone());
        }
        Ok(())
    }
}

/// Reports its devices, then fails
#[derive(Debug, Clone, Default)]
pub struct FailingProbe {
    devices: Vec<NasDevice>,
}

impl FailingProbe {
    /// Probe reporting `devices` before failing
    #[must_use]
    pub fn after(devices: Vec<NasDevice>) -> Self {
        Self { devices }
    }
}

#[async_trait]
impl Probe for FailingProbe {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn probe(&self, _subnet: &SubnetContext, sink: &DeviceSink) -> Result<()> {
        for device in &self.devices {
            sink.report(device.clone());
        }
        Err(NasError::probe(
            self.name(),
            std::io::Error::new(std::io::ErrorKind::AddrNotAvailable, "socket setup failed"),
        ))
    }
}

/// Panics as soon as it runs
#[derive(Debug, Clone, Copy, Default)]
pub struct PanickingProbe;

#[async_trait]
impl Probe for PanickingProbe {
    fn name(&self) -> &'static str {
        "panicking"
    }

    #[allow(clippy::panic)]
    async fn probe(&self, _subnet: &SubnetContext, _sink: &DeviceSink) -> Result<()> {
        panic!("probe exploded");
    }
}

/// Reports its devices, then never finishes
#[derive(Debug, Clone, Default)]
pub struct StallingProbe {
    devices: Vec<NasDevice>,
}

impl StallingProbe {
    /// Probe reporting `devices` and then hanging
    #[must_use]
    pub fn after(devices: Vec<NasDevice>) -> Self {
        Self { devices }
    }
}

#[async_trait]
impl Probe for StallingProbe {
    fn name(&self) -> &'static str {
        "stalling"
    }

    async fn probe(&self, _subnet: &SubnetContext, sink: &DeviceSink) -> Result<()> {
        for device in &self.devices {
            sink.report(device.clone());
        }
        std::future::pending::<()>().await;
        Ok(())
    }
}
