mod common;

use std::sync::{Arc, Mutex};

use futures::StreamExt;
use smbscout::smb::MountedShareClient;
use smbscout::{
    HostScanner, NasError, ScanConfig, ScanEvent, ShareEnumerator, SmbCredentials,
    VideoTreeScanner,
};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

fn mounted_nas() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    common::write_file(root, "nas/Movies/Heat (1995).mkv", 1024);
    common::write_file(root, "nas/Movies/Heat (1995).srt", 12);
    common::write_file(root, "nas/Movies/Extras/trailer.MP4", 64);
    common::write_file(root, "nas/Home Videos/2019/beach.mov", 256);
    common::write_file(root, "nas/Documents/taxes.pdf", 8);
    std::fs::create_dir_all(root.join("nas/IPC$")).unwrap();
    dir
}

#[tokio::test]
async fn test_enumerate_mounted_shares() {
    common::init_logging();
    let dir = mounted_nas();
    let enumerator = ShareEnumerator::new(Arc::new(MountedShareClient::new(dir.path())));

    let mut shares: Vec<String> = enumerator
        .list_shares("nas", None, None)
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.value)
        .collect();
    shares.sort();

    assert_eq!(shares, vec!["Documents", "Home Videos", "Movies"]);
}

#[tokio::test]
async fn test_enumerate_unmounted_host_fails() {
    let dir = TempDir::new().unwrap();
    let enumerator = ShareEnumerator::new(Arc::new(MountedShareClient::new(dir.path())));

    let err = enumerator
        .list_shares("elsewhere", Some("user"), Some("secret"))
        .await
        .unwrap_err();

    assert!(matches!(err, NasError::EnumerationFailed { .. }));
    assert!(!err.to_string().contains("secret"));
}

#[tokio::test]
async fn test_scan_mounted_host() {
    common::init_logging();
    let dir = mounted_nas();
    let scanner = HostScanner::new(
        Arc::new(MountedShareClient::new(dir.path())),
        ScanConfig::default(),
    );
    let shares = Mutex::new(Vec::new());

    let videos = scanner
        .scan_all_shares(
            "nas",
            Some("me"),
            Some("pw"),
            |share| shares.lock().unwrap().push(share.value.clone()),
            |_| {},
        )
        .await
        .unwrap();

    let mut locators: Vec<&str> = videos.iter().map(|v| v.locator.as_str()).collect();
    locators.sort_unstable();
    assert_eq!(
        locators,
        vec![
            "smb://nas/Home Videos/2019/beach.mov",
            "smb://nas/Movies/Extras/trailer.MP4",
            "smb://nas/Movies/Heat (1995).mkv",
        ]
    );
    assert_eq!(shares.into_inner().unwrap().len(), 3);

    let heat = videos.iter().find(|v| v.name == "Heat (1995).mkv").unwrap();
    assert_eq!(heat.size_bytes, 1024);
    assert!(heat.last_modified_epoch_ms > 0);
    assert_eq!(heat.extension().as_deref(), Some("mkv"));
}

#[tokio::test]
async fn test_scan_events_for_mounted_host() {
    let dir = mounted_nas();
    let scanner = HostScanner::new(
        Arc::new(MountedShareClient::new(dir.path())),
        ScanConfig::default(),
    );

    let events: Vec<ScanEvent> = scanner
        .scan_events("nas", SmbCredentials::anonymous())
        .collect()
        .await;

    let found = events
        .iter()
        .filter(|e| matches!(e, ScanEvent::VideoFound { .. }))
        .count();
    assert_eq!(found, 3);
    assert_eq!(events.last(), Some(&ScanEvent::Completed { total: 3 }));
}

#[tokio::test]
async fn test_tree_scan_from_unc_path() {
    let dir = mounted_nas();
    let scanner = VideoTreeScanner::new(Arc::new(MountedShareClient::new(dir.path())));
    let mut names = Vec::new();

    let videos = scanner
        .scan_videos(r"\\nas\Movies", &SmbCredentials::anonymous(), |v| {
            names.push(v.name.clone());
        })
        .await
        .unwrap();

    assert_eq!(videos.len(), 2);
    // Breadth-first: the share's own files come before Extras/
    assert_eq!(names.last().map(String::as_str), Some("trailer.MP4"));
}

#[tokio::test]
async fn test_tree_scan_cancelled_up_front() {
    let dir = mounted_nas();
    let token = CancellationToken::new();
    token.cancel();
    let scanner = VideoTreeScanner::new(Arc::new(MountedShareClient::new(dir.path())))
        .with_cancellation(token);

    let result = scanner
        .scan_videos("smb://nas/Movies/", &SmbCredentials::anonymous(), |_| {})
        .await;

    assert!(matches!(result, Err(NasError::Cancelled)));
}

#[test]
fn test_normalize_locators() {
    assert_eq!(
        smbscout::normalize_dir_locator(r"\\nas\Movies\Extras").unwrap(),
        "smb://nas/Movies/Extras/"
    );
    assert_eq!(
        smbscout::normalize_dir_locator("SMB://nas//Movies/").unwrap(),
        "smb://nas/Movies/"
    );
    assert!(smbscout::normalize_dir_locator("/mnt/nas").is_err());
}
