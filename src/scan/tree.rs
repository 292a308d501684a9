use crate::error::{NasError, Result};
use crate::smb::{EntryKind, SmbClient, SmbLocator};
use crate::types::{RemoteVideo, SmbCredentials, is_video_file};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Breadth-first walk of one share collecting video files
///
/// Pending directories live in an explicit queue, and the cancellation token
/// is checked before each one is listed.
#[derive(Clone)]
pub struct VideoTreeScanner {
    client: Arc<dyn SmbClient>,
    cancel: CancellationToken,
}

impl VideoTreeScanner {
    /// Create a scanner over `client`
    #[must_use]
    pub fn new(client: Arc<dyn SmbClient>) -> Self {
        Self {
            client,
            cancel: CancellationToken::new(),
        }
    }

    /// Stop walking when `token` is cancelled
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Walk from a UNC path or `smb://` URL
    ///
    /// `on_found` runs on the calling task for every match, before the walk
    /// moves on.
    ///
    /// # Errors
    ///
    /// Returns `NasError::InvalidLocator` for an unparseable root and
    /// `NasError::Cancelled` when the walk is cancelled.
    pub async fn scan_videos<F>(
        &self,
        root: &str,
        credentials: &SmbCredentials,
        on_found: F,
    ) -> Result<Vec<RemoteVideo>>
    where
        F: FnMut(&RemoteVideo) + Send,
    {
        let root = SmbLocator::parse(root)?;
        self.scan_locator(&root, credentials, on_found).await
    }

    /// Walk from an already parsed root
    ///
    /// A root that does not exist or is not a directory yields no videos. A
    /// directory that cannot be listed is treated as empty.
    ///
    /// # Errors
    ///
    /// Returns `NasError::Cancelled` when the walk is cancelled, or the stat
    /// error if the root could not be looked up at all.
    pub async fn scan_locator<F>(
        &self,
        root: &SmbLocator,
        credentials: &SmbCredentials,
        mut on_found: F,
    ) -> Result<Vec<RemoteVideo>>
    where
        F: FnMut(&RemoteVideo) + Send,
    {
        if self.cancel.is_cancelled() {
            return Err(NasError::Cancelled);
        }

        match self.client.stat(root, credentials).await? {
            Some(entry) if entry.is_dir() => {}
            _ => {
                tracing::debug!(root = %root, "Root missing or not a directory");
                return Ok(Vec::new());
            }
        }

        let mut queue = VecDeque::from([root.clone()]);
        let mut videos = Vec::new();
        let mut listed = 0usize;

        while let Some(dir) = queue.pop_front() {
            if self.cancel.is_cancelled() {
                tracing::info!(root = %root, listed, found = videos.len(), "Scan cancelled");
                return Err(NasError::Cancelled);
            }

            let children = match self.client.list_dir(&dir, credentials).await {
                Ok(children) => children,
                Err(e) => {
                    tracing::warn!(dir = %dir, error = %e, "Skipping unlistable directory");
                    continue;
                }
            };
            listed += 1;

            for entry in children {
                let name = entry.name.trim_end_matches('/');
                if name.is_empty() || name == "." || name == ".." {
                    continue;
                }
                match entry.kind {
                    EntryKind::Directory => queue.push_back(dir.join(name)),
                    EntryKind::File if is_video_file(name) => {
                        let video = RemoteVideo {
                            name: name.to_string(),
                            locator: dir.join(name).file_url(),
                            size_bytes: i64::try_from(entry.size).unwrap_or(i64::MAX),
                            last_modified_epoch_ms: entry.modified_epoch_ms,
                        };
                        on_found(&video);
                        videos.push(video);
                    }
                    EntryKind::File | EntryKind::Other => {}
                }
            }
        }

        tracing::debug!(root = %root, listed, found = videos.len(), "Share walk finished");
        Ok(videos)
    }
}
