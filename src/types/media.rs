use serde::{Deserialize, Serialize};
use std::fmt;

/// Extensions recognized as video files, lowercase and without the dot
pub const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "mkv", "avi", "mov", "flv", "wmv", "ts", "m2ts", "webm",
];

/// Check whether a file name carries a recognized video extension
///
/// The suffix after the last `.` is compared case-insensitively. Names
/// without a dot never match.
#[must_use]
pub fn is_video_file(name: &str) -> bool {
    name.rsplit_once('.').is_some_and(|(_, ext)| {
        let ext = ext.to_lowercase();
        VIDEO_EXTENSIONS.contains(&ext.as_str())
    })
}

/// Name of a share exposed by a host
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShareName {
    /// The share name as the server reports it
    pub value: String,
}

impl ShareName {
    /// Wrap a share name
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    /// Borrow the name
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Administrative and hidden shares end in `$` (`C$`, `IPC$`, `ADMIN$`)
    #[must_use]
    pub fn is_hidden(&self) -> bool {
        self.value.ends_with('$')
    }
}

impl fmt::Display for ShareName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl From<&str> for ShareName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A video file found on a share
///
/// Identity is the locator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteVideo {
    /// File name including extension
    pub name: String,

    /// Fully qualified `smb://host/share/path/file` locator
    pub locator: String,

    /// File size in bytes
    pub size_bytes: i64,

    /// Last modification time, milliseconds since the Unix epoch
    pub last_modified_epoch_ms: i64,
}

impl RemoteVideo {
    /// Lowercase extension of the file
    #[must_use]
    pub fn extension(&self) -> Option<String> {
        self.name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
    }
}
