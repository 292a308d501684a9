//! Core types module

mod config;
mod credentials;
mod device;
mod media;
#[cfg(test)]
mod tests;

pub use config::{
    DiscoveryConfig, DiscoveryConfigBuilder, MIN_RECEIVE_TIMEOUT, SEED_SHARE_NAMES, ScanConfig,
    ScanConfigBuilder,
};
pub use credentials::{GUEST_USER, SmbCredentials};
pub use device::{NasDevice, ProbeKind};
pub use media::{RemoteVideo, ShareName, VIDEO_EXTENSIONS, is_video_file};
