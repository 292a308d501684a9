use super::*;
use crate::error::NasError;
use crate::types::SmbCredentials;
use proptest::prelude::*;

#[test]
fn test_normalize_unc_path() {
    assert_eq!(
        normalize_dir_locator(r"\\host\share\dir").unwrap(),
        "smb://host/share/dir/"
    );
    assert_eq!(
        normalize_dir_locator(r"\\nas\Media\").unwrap(),
        "smb://nas/Media/"
    );
}

#[test]
fn test_normalize_is_idempotent() {
    let once = normalize_dir_locator("smb://host/share/dir/").unwrap();
    assert_eq!(once, "smb://host/share/dir/");
    assert_eq!(normalize_dir_locator(&once).unwrap(), once);
}

#[test]
fn test_normalize_mixed_separators_and_scheme_case() {
    assert_eq!(
        normalize_dir_locator(r"SMB://host\share//a\b").unwrap(),
        "smb://host/share/a/b/"
    );
    assert_eq!(normalize_dir_locator("smb://host").unwrap(), "smb://host/");
}

#[test]
fn test_unicode_segments() {
    let locator = SmbLocator::parse(r"\\ナス\映画\アニメ 2024").unwrap();

    assert_eq!(locator.host(), "ナス");
    assert_eq!(locator.share(), Some("映画"));
    assert_eq!(locator.segments(), ["アニメ 2024".to_string()]);
    assert_eq!(locator.dir_url(), "smb://ナス/映画/アニメ 2024/");
}

#[test]
fn test_parse_rejects_bad_input() {
    assert!(matches!(
        SmbLocator::parse("/local/path"),
        Err(NasError::InvalidLocator { .. })
    ));
    assert!(SmbLocator::parse("smb://").is_err());
    assert!(SmbLocator::parse("smb://host/share/../etc").is_err());
}

#[test]
fn test_join_and_urls() {
    let host = SmbLocator::host_root("nas");
    let share = host.join("Media/");
    assert_eq!(share, SmbLocator::share_root("nas", "Media"));

    let file = share.join("Movies").join("movie.mp4");
    assert_eq!(file.file_url(), "smb://nas/Media/Movies/movie.mp4");
    assert_eq!(file.name(), Some("movie.mp4"));
    assert_eq!(share.to_string(), "smb://nas/Media/");
}

proptest! {
    #[test]
    fn prop_normalize_idempotent(
        host in "[a-z0-9][a-z0-9.-]{0,11}",
        parts in prop::collection::vec("[^/\\\\.]{1,8}", 0..5),
        unc in any::<bool>(),
    ) {
        let input = if unc {
            format!(r"\\{host}\{}", parts.join(r"\"))
        } else {
            format!("smb://{host}/{}", parts.join("/"))
        };

        let once = normalize_dir_locator(&input).unwrap();
        prop_assert!(once.ends_with('/'));
        prop_assert_eq!(normalize_dir_locator(&once).unwrap(), once);
    }
}

// --- mounted.rs tests ---

fn mounted_tree() -> (tempfile::TempDir, MountedShareClient) {
    let dir = tempfile::tempdir().unwrap();
    let share = dir.path().join("nas").join("Media");
    std::fs::create_dir_all(share.join("Movies")).unwrap();
    std::fs::write(share.join("Movies").join("movie.mp4"), b"0123456789").unwrap();
    std::fs::write(dir.path().join("nas").join("readme.txt"), b"hi").unwrap();

    let client = MountedShareClient::new(dir.path());
    (dir, client)
}

#[tokio::test]
async fn test_mounted_list_shares() {
    let (_dir, client) = mounted_tree();
    let mut entries = client
        .list_shares("nas", &SmbCredentials::anonymous())
        .await
        .unwrap();
    entries.sort_by(|a, b| a.name.cmp(&b.name));

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].name, "Media");
    assert!(entries[0].is_dir());
    assert_eq!(entries[1].kind, EntryKind::File);
}

#[tokio::test]
async fn test_mounted_unknown_host_is_connection_failure() {
    let (_dir, client) = mounted_tree();
    let err = client
        .list_shares("other", &SmbCredentials::anonymous())
        .await
        .unwrap_err();
    assert!(matches!(err, NasError::ConnectionFailed { .. }));
}

#[tokio::test]
async fn test_mounted_list_dir_and_stat() {
    let (_dir, client) = mounted_tree();
    let creds = SmbCredentials::anonymous();
    let movies = SmbLocator::share_root("nas", "Media").join("Movies");

    let entries = client.list_dir(&movies, &creds).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].name, "movie.mp4");
    assert_eq!(entries[0].size, 10);
    assert!(entries[0].modified_epoch_ms > 0);

    let stat = client.stat(&movies, &creds).await.unwrap().unwrap();
    assert!(stat.is_dir());
    assert!(client
        .stat(&movies.join("missing"), &creds)
        .await
        .unwrap()
        .is_none());

    let err = client
        .list_dir(&movies.join("missing"), &creds)
        .await
        .unwrap_err();
    assert!(matches!(err, NasError::NotFound { .. }));
}
