use super::*;
use proptest::prelude::*;
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

// --- config.rs tests ---

#[test]
fn test_discovery_config_defaults() {
    let config = DiscoveryConfig::default();

    assert_eq!(config.overall_timeout, Duration::from_secs(4));
    assert_eq!(config.receive_timeout, Duration::from_secs(1));
    assert_eq!(config.listen_window, Duration::from_secs(3));
    assert_eq!(config.connect_timeout, Duration::from_millis(500));
    assert_eq!(config.smb_port, 445);
    assert!(config.enable_mdns && config.enable_netbios && config.enable_tcp);
}

#[test]
fn test_discovery_config_builder() {
    let config = DiscoveryConfig::builder()
        .overall_timeout(Duration::from_secs(10))
        .connect_timeout(Duration::from_millis(200))
        .sweep_concurrency(0)
        .max_responses(4)
        .tcp(false)
        .build();

    assert_eq!(config.overall_timeout, Duration::from_secs(10));
    assert_eq!(config.connect_timeout, Duration::from_millis(200));
    // Zero would stall the sweep
    assert_eq!(config.sweep_concurrency, 1);
    assert_eq!(config.max_responses, 4);
    assert!(!config.enable_tcp);
}

#[test]
fn test_zero_receive_timeout_is_raised() {
    let config = DiscoveryConfig::builder()
        .receive_timeout(Duration::ZERO)
        .build();
    assert_eq!(config.receive_timeout, MIN_RECEIVE_TIMEOUT);

    let config = DiscoveryConfig::builder()
        .receive_timeout(Duration::from_millis(250))
        .build();
    assert_eq!(config.receive_timeout, Duration::from_millis(250));
}

#[test]
fn test_scan_config() {
    let config = ScanConfig::default();
    assert_eq!(config.max_concurrent_shares, 4);
    assert!(config.seed_shares.iter().any(|s| s == "public"));

    let config = ScanConfig::builder()
        .max_concurrent_shares(2)
        .seed_shares(["movies"])
        .build();
    assert_eq!(config.max_concurrent_shares, 2);
    assert_eq!(config.seed_shares, vec!["movies".to_string()]);
}

// --- media.rs tests ---

#[test]
fn test_video_extensions() {
    assert!(is_video_file("movie.mp4"));
    assert!(is_video_file("MOVIE.MP4"));
    assert!(is_video_file("show.S01E02.mkv"));
    assert!(is_video_file("capture.m2ts"));
    assert!(is_video_file("clip.WebM"));

    assert!(!is_video_file("doc.txt"));
    assert!(!is_video_file("mp4"));
    assert!(!is_video_file("archive.mp4.zip"));
    assert!(!is_video_file("trailing."));
}

#[test]
fn test_share_name_hidden() {
    assert!(ShareName::new("IPC$").is_hidden());
    assert!(!ShareName::new("Media").is_hidden());
    assert_eq!(ShareName::from("Media").to_string(), "Media");
}

#[test]
fn test_remote_video_serializes_camel_case() {
    let video = RemoteVideo {
        name: "movie.mp4".to_string(),
        locator: "smb://nas/A/movie.mp4".to_string(),
        size_bytes: 10,
        last_modified_epoch_ms: 1_700_000_000_000,
    };

    let json = serde_json::to_value(&video).unwrap();
    assert_eq!(json["sizeBytes"], 10);
    assert_eq!(json["lastModifiedEpochMs"], 1_700_000_000_000_i64);
    assert_eq!(video.extension().as_deref(), Some("mp4"));
}

proptest! {
    #[test]
    fn prop_video_filter_matches_lowercase_suffix(stem in "[a-zA-Z0-9 _.-]{0,20}", ext in "[a-zA-Z0-9]{1,5}") {
        let name = format!("{stem}.{ext}");
        let expected = VIDEO_EXTENSIONS.contains(&ext.to_lowercase().as_str());
        prop_assert_eq!(is_video_file(&name), expected);
        prop_assert_eq!(is_video_file(&name.to_uppercase()), expected);
    }
}

// --- device.rs tests ---

#[test]
fn test_device_builders() {
    let addr = IpAddr::V4(Ipv4Addr::new(192, 168, 1, 20));
    let device = NasDevice::new(addr, ProbeKind::Mdns)
        .with_name("  DiskStation ")
        .reachable();

    assert_eq!(device.display_name.as_deref(), Some("DiskStation"));
    assert!(device.reachable);
    assert_eq!(device.label(), "DiskStation");

    let unnamed = NasDevice::new(addr, ProbeKind::TcpPort).with_name("   ");
    assert_eq!(unnamed.display_name, None);
    assert_eq!(unnamed.label(), "192.168.1.20");
}

// --- credentials.rs tests ---

#[test]
fn test_credentials_debug_redacts_password() {
    let creds = SmbCredentials::new("alice", "hunter2").with_domain("WORKGROUP");
    let printed = format!("{creds:?}");

    assert!(printed.contains("alice"));
    assert!(printed.contains("WORKGROUP"));
    assert!(!printed.contains("hunter2"));
}

#[test]
fn test_credentials_from_parts() {
    assert!(SmbCredentials::from_parts(None, Some("x")).is_anonymous());
    assert!(SmbCredentials::from_parts(Some("  "), None).is_anonymous());
    assert_eq!(SmbCredentials::from_parts(None, Some("x")).password, None);

    let creds = SmbCredentials::from_parts(Some("bob"), Some("pw"));
    assert_eq!(creds, SmbCredentials::new("bob", "pw"));
    assert_eq!(SmbCredentials::guest().username.as_deref(), Some(GUEST_USER));
}
