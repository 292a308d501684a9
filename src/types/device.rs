use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;

/// Which discovery probe first reported a device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeKind {
    /// Multicast DNS query for `_smb._tcp.local`
    Mdns,
    /// NetBIOS name service status broadcast
    Netbios,
    /// TCP connect sweep of the SMB port
    TcpPort,
    /// Supplied by the caller or a test
    Manual,
}

impl ProbeKind {
    /// Short name used in logs
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mdns => "mdns",
            Self::Netbios => "netbios",
            Self::TcpPort => "tcp",
            Self::Manual => "manual",
        }
    }
}

impl fmt::Display for ProbeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A NAS or SMB-capable host seen on the local network
///
/// Two devices are the same device when their addresses match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NasDevice {
    /// Network address, the identity of the device
    pub address: IpAddr,

    /// Name announced by the device (mDNS instance or NetBIOS name)
    pub display_name: Option<String>,

    /// Whether the SMB port accepted a connection
    pub reachable: bool,

    /// Probe that reported this sighting
    pub source: ProbeKind,
}

impl NasDevice {
    /// Create a device with no display name
    #[must_use]
    pub fn new(address: IpAddr, source: ProbeKind) -> Self {
        Self {
            address,
            display_name: None,
            reachable: false,
            source,
        }
    }

    /// Set the announced name; blank names are ignored
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        let trimmed = name.trim();
        if !trimmed.is_empty() {
            self.display_name = Some(trimmed.to_string());
        }
        self
    }

    /// Mark the device as reachable on the SMB port
    #[must_use]
    pub fn reachable(mut self) -> Self {
        self.reachable = true;
        self
    }

    /// Name to show in a device list, falling back to the address
    #[must_use]
    pub fn label(&self) -> String {
        self.display_name
            .clone()
            .unwrap_or_else(|| self.address.to_string())
    }
}
