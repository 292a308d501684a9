use super::{EntryKind, SmbClient, SmbEntry, SmbLocator};
use crate::error::{NasError, Result};
use crate::types::SmbCredentials;
use async_trait::async_trait;
use std::fs::Metadata;
use std::io;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

/// Serves shares from a locally mounted tree laid out as `<root>/<host>/<share>/...`
///
/// Suits hosts already mounted through the OS (CIFS/SMB mounts). The mount
/// carries its own login, so credentials passed in are ignored.
#[derive(Debug, Clone)]
pub struct MountedShareClient {
    root: PathBuf,
}

impl MountedShareClient {
    /// Create a client rooted at `root`
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Mount root
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn local_path(&self, locator: &SmbLocator) -> PathBuf {
        let mut path = self.root.join(locator.host());
        if let Some(share) = locator.share() {
            path.push(share);
        }
        for segment in locator.segments() {
            path.push(segment);
        }
        path
    }

    async fn read_entries(&self, path: &Path, locator: String) -> Result<Vec<SmbEntry>> {
        let mut dir = tokio::fs::read_dir(path)
            .await
            .map_err(|e| list_error(&locator, e))?;

        let mut entries = Vec::new();
        while let Some(entry) = dir.next_entry().await.map_err(|e| list_error(&locator, e))? {
            // DirEntry::metadata does not follow symlinks, so links land in Other
            let metadata = match entry.metadata().await {
                Ok(metadata) => metadata,
                Err(e) => {
                    tracing::debug!(path = %entry.path().display(), error = %e, "Skipping unreadable entry");
                    continue;
                }
            };
            entries.push(to_entry(entry.file_name().to_string_lossy().into_owned(), &metadata));
        }
        Ok(entries)
    }
}

#[async_trait]
impl SmbClient for MountedShareClient {
    async fn list_shares(
        &self,
        host: &str,
        _credentials: &SmbCredentials,
    ) -> Result<Vec<SmbEntry>> {
        let locator = SmbLocator::host_root(host);
        let path = self.local_path(&locator);
        self.read_entries(&path, locator.dir_url())
            .await
            .map_err(|e| match e {
                NasError::NotFound { .. } => NasError::ConnectionFailed {
                    host: host.to_string(),
                    message: "host is not mounted".to_string(),
                    source: None,
                },
                other => other,
            })
    }

    async fn list_dir(
        &self,
        dir: &SmbLocator,
        _credentials: &SmbCredentials,
    ) -> Result<Vec<SmbEntry>> {
        let path = self.local_path(dir);
        self.read_entries(&path, dir.dir_url()).await
    }

    async fn stat(
        &self,
        target: &SmbLocator,
        _credentials: &SmbCredentials,
    ) -> Result<Option<SmbEntry>> {
        let path = self.local_path(target);
        match tokio::fs::symlink_metadata(&path).await {
            Ok(metadata) => {
                let name = target.name().unwrap_or(target.host()).to_string();
                Ok(Some(to_entry(name, &metadata)))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(NasError::NetworkError(e)),
        }
    }
}

fn to_entry(name: String, metadata: &Metadata) -> SmbEntry {
    let kind = if metadata.is_dir() {
        EntryKind::Directory
    } else if metadata.is_file() {
        EntryKind::File
    } else {
        EntryKind::Other
    };
    let modified_epoch_ms = metadata
        .modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .and_then(|d| i64::try_from(d.as_millis()).ok())
        .unwrap_or(0);

    SmbEntry {
        name,
        kind,
        size: if kind == EntryKind::File { metadata.len() } else { 0 },
        modified_epoch_ms,
    }
}

fn list_error(locator: &str, e: io::Error) -> NasError {
    match e.kind() {
        io::ErrorKind::NotFound => NasError::NotFound {
            locator: locator.to_string(),
        },
        _ => NasError::DirectoryListFailed {
            locator: locator.to_string(),
            message: e.to_string(),
            source: Some(Box::new(e)),
        },
    }
}
