use super::shares::ShareEnumerator;
use super::tree::VideoTreeScanner;
use crate::error::{NasError, Result};
use crate::smb::{SmbClient, SmbLocator};
use crate::types::{RemoteVideo, ScanConfig, ShareName, SmbCredentials};
use futures::Stream;
use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Receives progress from a host scan
///
/// Calls come from the task driving the scan. For a given share,
/// `share_started` precedes its `video_found` calls; calls for different
/// shares interleave.
pub trait ScanObserver: Sync {
    /// A share's walk is about to start
    fn share_started(&self, _share: &ShareName) {}

    /// A video was found in `share`
    fn video_found(&self, _share: &ShareName, _video: &RemoteVideo) {}

    /// A share's walk completed with `videos` matches
    fn share_finished(&self, _share: &ShareName, _videos: usize) {}

    /// A share's walk failed; the share counts as empty
    fn share_failed(&self, _share: &ShareName, _error: &NasError) {}
}

struct Callbacks<S, V> {
    on_share: S,
    on_found: V,
}

impl<S, V> ScanObserver for Callbacks<S, V>
where
    S: Fn(&ShareName) + Sync,
    V: Fn(&RemoteVideo) + Sync,
{
    fn share_started(&self, share: &ShareName) {
        (self.on_share)(share);
    }

    fn video_found(&self, _share: &ShareName, video: &RemoteVideo) {
        (self.on_found)(video);
    }
}

enum ShareProgress {
    Started(ShareName),
    Found(ShareName, RemoteVideo),
}

/// One share's walk, owned by its task
struct ShareWalk {
    host: String,
    share: ShareName,
    credentials: SmbCredentials,
    tree: VideoTreeScanner,
    cancel: CancellationToken,
    progress: mpsc::UnboundedSender<ShareProgress>,
}

impl ShareWalk {
    async fn run(self) -> (ShareName, Result<Vec<RemoteVideo>>) {
        let Self {
            host,
            share,
            credentials,
            tree,
            cancel,
            progress,
        } = self;

        if cancel.is_cancelled() {
            return (share, Err(NasError::Cancelled));
        }
        let _ = progress.send(ShareProgress::Started(share.clone()));

        let root = SmbLocator::share_root(host, share.as_str());
        let outcome = tree
            .scan_locator(&root, &credentials, |video| {
                let _ = progress.send(ShareProgress::Found(share.clone(), video.clone()));
            })
            .await
            .map_err(|e| match e {
                NasError::Cancelled => e,
                other => NasError::ShareScanFailed {
                    share: share.value.clone(),
                    message: other.to_string(),
                },
            });
        (share, outcome)
    }
}

/// Scans every share on a host for video files
///
/// Each share is walked on its own task, at most `max_concurrent_shares` at a
/// time, so a client that blocks inside its calls still scans shares in
/// parallel on a multi-threaded runtime.
#[derive(Clone)]
pub struct HostScanner {
    client: Arc<dyn SmbClient>,
    config: ScanConfig,
    cancel: CancellationToken,
}

impl HostScanner {
    /// Create a scanner over `client`
    #[must_use]
    pub fn new(client: Arc<dyn SmbClient>, config: ScanConfig) -> Self {
        Self {
            client,
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Stop scanning when `token` is cancelled
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Token that cancels scans started from this scanner
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Scan all shares with callbacks for each share and each video
    ///
    /// # Errors
    ///
    /// Returns `NasError::Cancelled` if the scan was cancelled. Enumeration and
    /// per-share failures only reduce the results.
    pub async fn scan_all_shares<S, V>(
        &self,
        host: &str,
        username: Option<&str>,
        password: Option<&str>,
        on_share: S,
        on_found: V,
    ) -> Result<Vec<RemoteVideo>>
    where
        S: Fn(&ShareName) + Sync,
        V: Fn(&RemoteVideo) + Sync,
    {
        let credentials = SmbCredentials::from_parts(username, password);
        let observer = Callbacks { on_share, on_found };
        self.scan_with_observer(host, &credentials, &observer).await
    }

    /// Scan all shares, reporting progress to `observer`
    ///
    /// # Errors
    ///
    /// Returns `NasError::Cancelled` if the scan was cancelled.
    pub async fn scan_with_observer(
        &self,
        host: &str,
        credentials: &SmbCredentials,
        observer: &dyn ScanObserver,
    ) -> Result<Vec<RemoteVideo>> {
        if self.cancel.is_cancelled() {
            return Err(NasError::Cancelled);
        }

        let shares = match ShareEnumerator::new(Arc::clone(&self.client))
            .list_shares_with(host, credentials)
            .await
        {
            Ok(shares) => shares,
            Err(e) => {
                tracing::warn!(host, error = %e, "Share enumeration failed, trying common share names");
                self.config
                    .seed_shares
                    .iter()
                    .map(|name| ShareName::new(name.as_str()))
                    .collect()
            }
        };

        let tree = VideoTreeScanner::new(Arc::clone(&self.client))
            .with_cancellation(self.cancel.clone());
        let permits = Arc::new(Semaphore::new(self.config.max_concurrent_shares.max(1)));
        let (progress_tx, mut progress) = mpsc::unbounded_channel();
        let mut pending: VecDeque<ShareName> = shares.into();
        let mut tasks = JoinSet::new();
        let mut videos = Vec::new();

        // Share walks run as their own tasks; observer calls stay on this one.
        // Progress is drained before joins and new spawns, so a share's
        // messages are delivered before it counts as finished.
        loop {
            if pending.is_empty() && tasks.is_empty() {
                break;
            }
            tokio::select! {
                biased;
                () = self.cancel.cancelled() => break,
                Some(message) = progress.recv() => match message {
                    ShareProgress::Started(share) => observer.share_started(&share),
                    ShareProgress::Found(share, video) => observer.video_found(&share, &video),
                },
                permit = Arc::clone(&permits).acquire_owned(), if !pending.is_empty() => {
                    let (Ok(permit), Some(share)) = (permit, pending.pop_front()) else {
                        break;
                    };
                    let walk = ShareWalk {
                        host: host.to_string(),
                        share,
                        credentials: credentials.clone(),
                        tree: tree.clone(),
                        cancel: self.cancel.clone(),
                        progress: progress_tx.clone(),
                    };
                    tasks.spawn(async move {
                        let _permit = permit;
                        walk.run().await
                    });
                }
                Some(joined) = tasks.join_next(), if !tasks.is_empty() => match joined {
                    Ok((share, Ok(found))) => {
                        observer.share_finished(&share, found.len());
                        videos.extend(found);
                    }
                    Ok((_, Err(NasError::Cancelled))) => {}
                    Ok((share, Err(e))) => {
                        tracing::warn!(host, share = %share, error = %e, "Share scan failed");
                        observer.share_failed(&share, &e);
                    }
                    Err(e) => {
                        tracing::warn!(host, error = %e, "Share scan task died");
                    }
                },
            }
        }

        if self.cancel.is_cancelled() {
            tasks.shutdown().await;
            tracing::info!(host, found = videos.len(), "Host scan cancelled");
            return Err(NasError::Cancelled);
        }

        tracing::info!(host, videos = videos.len(), "Host scan finished");
        Ok(videos)
    }

    /// Run the scan on a background task and stream its progress
    ///
    /// Must be called from within a Tokio runtime. Dropping the stream
    /// cancels the scan.
    #[must_use]
    pub fn scan_events(
        &self,
        host: impl Into<String>,
        credentials: SmbCredentials,
    ) -> ScanEventStream {
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = self.cancel.child_token();
        let scanner = self.clone().with_cancellation(cancel.clone());
        let host = host.into();

        crate::net::spawn(async move {
            let observer = ChannelObserver { tx: tx.clone() };
            let last = match scanner
                .scan_with_observer(&host, &credentials, &observer)
                .await
            {
                Ok(videos) => ScanEvent::Completed {
                    total: videos.len(),
                },
                Err(_) => ScanEvent::Cancelled,
            };
            let _ = tx.send(last);
        });

        ScanEventStream { rx, cancel }
    }
}

/// Progress of a host scan, as delivered by [`HostScanner::scan_events`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEvent {
    /// A share's walk started
    ShareStarted(ShareName),
    /// A video was found
    VideoFound {
        /// Share holding the video
        share: ShareName,
        /// The video
        video: RemoteVideo,
    },
    /// A share's walk completed
    ShareFinished {
        /// The share
        share: ShareName,
        /// Videos found in it
        videos: usize,
    },
    /// A share could not be scanned
    ShareFailed {
        /// The share
        share: ShareName,
        /// Why it failed
        message: String,
    },
    /// The scan ended normally
    Completed {
        /// Videos found across all shares
        total: usize,
    },
    /// The scan was cancelled
    Cancelled,
}

struct ChannelObserver {
    tx: mpsc::UnboundedSender<ScanEvent>,
}

impl ScanObserver for ChannelObserver {
    fn share_started(&self, share: &ShareName) {
        let _ = self.tx.send(ScanEvent::ShareStarted(share.clone()));
    }

    fn video_found(&self, share: &ShareName, video: &RemoteVideo) {
        let _ = self.tx.send(ScanEvent::VideoFound {
            share: share.clone(),
            video: video.clone(),
        });
    }

    fn share_finished(&self, share: &ShareName, videos: usize) {
        let _ = self.tx.send(ScanEvent::ShareFinished {
            share: share.clone(),
            videos,
        });
    }

    fn share_failed(&self, share: &ShareName, error: &NasError) {
        let _ = self.tx.send(ScanEvent::ShareFailed {
            share: share.clone(),
            message: error.to_string(),
        });
    }
}

/// Stream of [`ScanEvent`]s; ends after `Completed` or `Cancelled`
pub struct ScanEventStream {
    rx: mpsc::UnboundedReceiver<ScanEvent>,
    cancel: CancellationToken,
}

impl ScanEventStream {
    /// Ask the scan to stop
    pub fn cancel(&self) {
        self.cancel.cancel();
    }
}

impl Stream for ScanEventStream {
    type Item = ScanEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

impl Drop for ScanEventStream {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
