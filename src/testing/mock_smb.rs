//! In-memory SMB client
//!
//! Hosts are built up with paths relative to the host root, so `"A/Movies"`
//! is directory `Movies` on share `A`. Parent directories are created on
//! demand.

use crate::error::{NasError, Result};
use crate::smb::{EntryKind, SmbClient, SmbEntry, SmbLocator};
use crate::types::SmbCredentials;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

#[derive(Debug, Default)]
struct MockHost {
    dirs: HashMap<String, Vec<SmbEntry>>,
    failing_dirs: HashSet<String>,
    refuse_shares: bool,
    accepted: Option<Vec<SmbCredentials>>,
}

impl MockHost {
    fn ensure_dir(&mut self, path: &str) {
        if self.dirs.contains_key(path) {
            return;
        }
        self.dirs.insert(path.to_string(), Vec::new());
        if path.is_empty() {
            return;
        }
        let (parent, name) = split_parent(path);
        self.ensure_dir(parent);
        if let Some(entries) = self.dirs.get_mut(parent) {
            entries.push(SmbEntry::dir(name));
        }
    }
}

fn split_parent(path: &str) -> (&str, &str) {
    path.rsplit_once('/').unwrap_or(("", path))
}

fn key_of(locator: &SmbLocator) -> String {
    locator
        .share()
        .into_iter()
        .chain(locator.segments().iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join("/")
}

/// In-memory SMB client with scripted failures
#[derive(Debug, Default)]
pub struct MockSmbClient {
    hosts: HashMap<String, MockHost>,
    list_delay: Option<Duration>,
    list_calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    logins: Mutex<Vec<SmbCredentials>>,
}

impl MockSmbClient {
    /// Create an empty client; unknown hosts are unreachable
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn host_mut(&mut self, host: &str) -> &mut MockHost {
        let entry = self.hosts.entry(host.to_string()).or_default();
        entry.ensure_dir("");
        entry
    }

    /// Add a share (a directory at the host root)
    #[must_use]
    pub fn share(mut self, host: &str, share: &str) -> Self {
        self.host_mut(host).ensure_dir(share);
        self
    }

    /// Add a directory, creating parents
    #[must_use]
    pub fn dir(mut self, host: &str, path: &str) -> Self {
        self.host_mut(host).ensure_dir(path);
        self
    }

    /// Add a file, creating parent directories
    #[must_use]
    pub fn file(mut self, host: &str, path: &str, size: u64) -> Self {
        let state = self.host_mut(host);
        let (parent, name) = split_parent(path);
        state.ensure_dir(parent);
        if let Some(entries) = state.dirs.get_mut(parent) {
            entries.push(SmbEntry::file(name, size, 1_700_000_000_000));
        }
        self
    }

    /// Add an arbitrary entry to the host root listing
    #[must_use]
    pub fn root_entry(mut self, host: &str, entry: SmbEntry) -> Self {
        if let Some(entries) = self.host_mut(host).dirs.get_mut("") {
            entries.push(entry);
        }
        self
    }

    /// Make listing `path` fail with a directory error
    #[must_use]
    pub fn failing_dir(mut self, host: &str, path: &str) -> Self {
        let state = self.host_mut(host);
        state.ensure_dir(path);
        state.failing_dirs.insert(path.to_string());
        self
    }

    /// Make share listing fail for every login
    #[must_use]
    pub fn refuse_share_listing(mut self, host: &str) -> Self {
        self.host_mut(host).refuse_shares = true;
        self
    }

    /// Only accept these logins for share listing
    #[must_use]
    pub fn accept_only(mut self, host: &str, credentials: SmbCredentials) -> Self {
        self.host_mut(host)
            .accepted
            .get_or_insert_with(Vec::new)
            .push(credentials);
        self
    }

    /// Delay every directory listing
    #[must_use]
    pub fn with_list_delay(mut self, delay: Duration) -> Self {
        self.list_delay = Some(delay);
        self
    }

    /// Directory listings performed so far
    #[must_use]
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// Most directory listings ever running at once
    #[must_use]
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Logins attempted against share listing, in order
    #[must_use]
    pub fn logins(&self) -> Vec<SmbCredentials> {
        self.logins
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn host(&self, host: &str) -> Result<&MockHost> {
        self.hosts.get(host).ok_or_else(|| NasError::ConnectionFailed {
            host: host.to_string(),
            message: "host unreachable".to_string(),
            source: None,
        })
    }
}

#[async_trait]
impl SmbClient for MockSmbClient {
    async fn list_shares(
        &self,
        host: &str,
        credentials: &SmbCredentials,
    ) -> Result<Vec<SmbEntry>> {
        self.logins
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(credentials.clone());

        let state = self.host(host)?;
        let refused = state.refuse_shares
            || state
                .accepted
                .as_ref()
                .is_some_and(|accepted| !accepted.contains(credentials));
        if refused {
            return Err(NasError::AuthenticationFailed {
                host: host.to_string(),
                message: "logon failure".to_string(),
            });
        }
        Ok(state.dirs.get("").cloned().unwrap_or_default())
    }

    async fn list_dir(
        &self,
        dir: &SmbLocator,
        _credentials: &SmbCredentials,
    ) -> Result<Vec<SmbEntry>> {
        let state = self.host(dir.host())?;
        let key = key_of(dir);

        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);
        if let Some(delay) = self.list_delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if state.failing_dirs.contains(&key) {
            return Err(NasError::DirectoryListFailed {
                locator: dir.dir_url(),
                message: "access denied".to_string(),
                source: None,
            });
        }
        state
            .dirs
            .get(&key)
            .cloned()
            .ok_or_else(|| NasError::NotFound {
                locator: dir.dir_url(),
            })
    }

    async fn stat(
        &self,
        target: &SmbLocator,
        _credentials: &SmbCredentials,
    ) -> Result<Option<SmbEntry>> {
        let state = self.host(target.host())?;
        let key = key_of(target);
        if state.dirs.contains_key(&key) {
            let name = target.name().unwrap_or_default();
            return Ok(Some(SmbEntry::dir(name)));
        }

        let (parent, name) = split_parent(&key);
        Ok(state.dirs.get(parent).and_then(|entries| {
            entries
                .iter()
                .find(|e| e.name == name && e.kind != EntryKind::Directory)
                .cloned()
        }))
    }
}
