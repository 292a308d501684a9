//! NAS device discovery
//!
//! Three probes run side by side: an mDNS query for `_smb._tcp.local`, a
//! NetBIOS status broadcast, and a TCP sweep of the SMB port. Their sightings
//! are merged by address into one stream.

mod coordinator;
pub mod mdns;
pub mod multicast;
pub mod netbios;
mod probe;
pub mod tcp;
pub mod wire;
#[cfg(test)]
mod tests;

pub use coordinator::{DiscoveryCoordinator, DiscoveryOutcome, DiscoveryStream, merge_device};
pub use mdns::MdnsProbe;
pub use multicast::{MulticastGuard, MulticastHook, MulticastLock};
pub use netbios::NetbiosProbe;
pub use probe::{AddressSet, DeviceSink, Probe, collect_probe};
pub use tcp::TcpPortProbe;

use crate::types::{DiscoveryConfig, NasDevice};
use futures::Stream;

/// Discover NAS devices with the default configuration
///
/// Returns a stream that yields each device the first time it is seen. The
/// stream ends after the overall deadline (4 seconds by default) at the latest,
/// and at once when there is no local network.
///
/// # Example
///
/// ```rust,no_run
/// use futures::StreamExt;
///
/// # async fn example() {
/// let mut devices = smbscout::discover();
///
/// while let Some(device) = devices.next().await {
///     println!("Found: {} ({})", device.label(), device.address);
/// }
/// # }
/// ```
#[must_use]
pub fn discover() -> DiscoveryStream {
    discover_with_config(DiscoveryConfig::default())
}

/// Discover devices with custom configuration
#[must_use]
pub fn discover_with_config(config: DiscoveryConfig) -> DiscoveryStream {
    DiscoveryCoordinator::new(config).discover()
}

/// Discover devices as running snapshots for polling UIs
pub fn discover_all() -> impl Stream<Item = Vec<NasDevice>> {
    DiscoveryCoordinator::new(DiscoveryConfig::default()).discover_all()
}

/// Run one discovery session and return every device found
///
/// # Example
///
/// ```rust,no_run
/// # async fn example() {
/// let devices = smbscout::scan_network().await;
///
/// for device in devices {
///     println!("{}: reachable={}", device.label(), device.reachable);
/// }
/// # }
/// ```
pub async fn scan_network() -> Vec<NasDevice> {
    DiscoveryCoordinator::new(DiscoveryConfig::default())
        .discover_devices()
        .await
}
