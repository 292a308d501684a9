//! # smbscout
//!
//! Find NAS devices on the local network and collect the video files their
//! SMB shares expose.
//!
//! ## Features
//!
//! - Device discovery via mDNS, NetBIOS status broadcast and a TCP sweep of
//!   the SMB port, merged by address under a soft deadline
//! - Share enumeration with credential fallback (supplied, anonymous, guest)
//! - Bounded-parallel scanning of every share on a host
//! - Cancellable breadth-first video search inside a share
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use smbscout::smb::MountedShareClient;
//! use smbscout::{HostScanner, ScanConfig};
//!
//! # async fn example() -> Result<(), smbscout::NasError> {
//! // Find candidate hosts
//! let devices = smbscout::scan_network().await;
//!
//! // Scan the first one through a local mount of its shares
//! if let Some(device) = devices.first() {
//!     let client = Arc::new(MountedShareClient::new("/mnt/nas"));
//!     let scanner = HostScanner::new(client, ScanConfig::default());
//!     let host = device.address.to_string();
//!
//!     let videos = scanner
//!         .scan_all_shares(&host, None, None, |_| {}, |video| println!("{}", video.locator))
//!         .await?;
//!     println!("{} videos", videos.len());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - **Discovery**: [`DiscoveryCoordinator`] runs the [`discovery::Probe`]s
//! - **Scanning**: [`HostScanner`] drives [`ShareEnumerator`] and
//!   [`VideoTreeScanner`] over an [`smb::SmbClient`]
//! - **Low-level**: packet codecs in [`discovery::mdns`] and
//!   [`discovery::netbios`], locator parsing in [`smb`]

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Public modules
/// Error types
pub mod error;
/// Core types
pub mod types;

/// Testing utilities
pub mod testing;

pub mod discovery;
pub mod net;
pub mod scan;
pub mod smb;

// Re-exports
pub use discovery::{
    DiscoveryCoordinator, DiscoveryOutcome, DiscoveryStream, discover, discover_all,
    discover_with_config, scan_network,
};
pub use error::{NasError, Result};
pub use scan::{HostScanner, ScanEvent, ScanObserver, ShareEnumerator, VideoTreeScanner};
pub use smb::normalize_dir_locator;
pub use types::{
    DiscoveryConfig, NasDevice, ProbeKind, RemoteVideo, ScanConfig, ShareName, SmbCredentials,
    is_video_file,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude for common imports
///
/// Convenient re-exports
pub mod prelude {
    pub use crate::{
        DiscoveryConfig, HostScanner, NasDevice, NasError, RemoteVideo, ScanConfig, ShareName,
        SmbCredentials, VideoTreeScanner, discover, scan_network,
    };
}
