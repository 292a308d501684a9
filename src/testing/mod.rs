//! Mock collaborators for tests
//!
//! An in-memory SMB host tree and scripted discovery probes, so discovery and
//! scanning can be exercised without a network or a NAS.

pub mod mock_smb;
pub mod probes;

pub use mock_smb::MockSmbClient;
pub use probes::{FailingProbe, PanickingProbe, StallingProbe, StaticProbe};

use crate::types::{NasDevice, ProbeKind};
use std::net::{IpAddr, Ipv4Addr};

/// Helper to create a `NasDevice` on 192.168.1.0/24
#[must_use]
pub fn test_device(last_octet: u8, name: Option<&str>) -> NasDevice {
    let device = NasDevice::new(
        IpAddr::V4(Ipv4Addr::new(192, 168, 1, last_octet)),
        ProbeKind::Manual,
    );
    match name {
        Some(name) => device.with_name(name),
        None => device,
    }
}
