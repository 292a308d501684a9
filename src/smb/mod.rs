//! SMB client seam
//!
//! The scanners never speak SMB themselves. They go through [`SmbClient`],
//! which a connection layer implements on top of a real SMB library. A
//! backend for locally mounted shares ships with the crate.

pub mod locator;
mod mounted;
#[cfg(test)]
mod tests;

pub use locator::{SmbLocator, normalize_dir_locator};
pub use mounted::MountedShareClient;

use crate::error::Result;
use crate::types::SmbCredentials;
use async_trait::async_trait;

/// What a directory entry is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A directory, or a disk share in a host listing
    Directory,
    /// A regular file
    File,
    /// Printers, IPC endpoints, links and anything else
    Other,
}

/// One entry returned by a listing or stat call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmbEntry {
    /// Entry name; servers may append `/` to directories
    pub name: String,
    /// Entry type
    pub kind: EntryKind,
    /// Size in bytes (0 for directories)
    pub size: u64,
    /// Last modification, milliseconds since the Unix epoch
    pub modified_epoch_ms: i64,
}

impl SmbEntry {
    /// A directory entry
    #[must_use]
    pub fn dir(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::Directory,
            size: 0,
            modified_epoch_ms: 0,
        }
    }

    /// A file entry
    #[must_use]
    pub fn file(name: impl Into<String>, size: u64, modified_epoch_ms: i64) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::File,
            size,
            modified_epoch_ms,
        }
    }

    /// Whether this entry is a directory
    #[must_use]
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// Operations the scanners need from an SMB session
///
/// Implementations may block inside these calls. A blocking call holds its
/// runtime worker thread; host scans walk each share on its own task, so
/// shares still scan in parallel on a multi-threaded runtime. Credentials must
/// not be retained or logged.
#[async_trait]
pub trait SmbClient: Send + Sync {
    /// List the entries at the root of `host` (its shares)
    async fn list_shares(&self, host: &str, credentials: &SmbCredentials)
    -> Result<Vec<SmbEntry>>;

    /// List the children of a directory
    async fn list_dir(
        &self,
        dir: &SmbLocator,
        credentials: &SmbCredentials,
    ) -> Result<Vec<SmbEntry>>;

    /// Look up one entry; `Ok(None)` when it does not exist
    async fn stat(
        &self,
        target: &SmbLocator,
        credentials: &SmbCredentials,
    ) -> Result<Option<SmbEntry>>;
}
