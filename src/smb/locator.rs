//! UNC path and `smb://` URL handling

use crate::error::NasError;
use std::fmt;

const SCHEME: &str = "smb://";

/// A parsed location on an SMB host: host, optional share, path segments
///
/// Segments are kept as-is, so non-ASCII names survive untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SmbLocator {
    host: String,
    share: Option<String>,
    path: Vec<String>,
}

impl SmbLocator {
    /// Parse a UNC path (`\\host\share\dir`) or an `smb://host/share/dir` URL
    ///
    /// Backslashes become slashes and empty segments are dropped.
    ///
    /// # Errors
    ///
    /// Returns `NasError::InvalidLocator` if the input has neither form, has
    /// no host, or contains a `..` segment.
    pub fn parse(input: &str) -> Result<Self, NasError> {
        let invalid = |reason: &str| NasError::InvalidLocator {
            locator: input.to_string(),
            reason: reason.to_string(),
        };

        let unified = input.trim().replace('\\', "/");
        let rest = if unified
            .get(..SCHEME.len())
            .is_some_and(|s| s.eq_ignore_ascii_case(SCHEME))
        {
            &unified[SCHEME.len()..]
        } else if let Some(rest) = unified.strip_prefix("//") {
            rest
        } else {
            return Err(invalid("expected smb:// URL or UNC path"));
        };

        let mut segments = rest.split('/').filter(|s| !s.is_empty() && *s != ".");
        let host = segments
            .next()
            .ok_or_else(|| invalid("missing host"))?
            .to_string();
        let share = segments.next().map(ToString::to_string);
        let path: Vec<String> = segments.map(ToString::to_string).collect();

        if share.as_deref() == Some("..") || path.iter().any(|s| s == "..") {
            return Err(invalid("parent segments are not allowed"));
        }

        Ok(Self { host, share, path })
    }

    /// Locator for the root of a share
    #[must_use]
    pub fn share_root(host: impl Into<String>, share: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            share: Some(share.into()),
            path: Vec::new(),
        }
    }

    /// Locator for the host itself, where shares are listed
    #[must_use]
    pub fn host_root(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            share: None,
            path: Vec::new(),
        }
    }

    /// Host name or address
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Share name, if the locator points inside a share
    #[must_use]
    pub fn share(&self) -> Option<&str> {
        self.share.as_deref()
    }

    /// Path segments below the share root
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.path
    }

    /// Last segment: the file or directory name
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.path
            .last()
            .map(String::as_str)
            .or(self.share.as_deref())
    }

    /// Locator for an entry inside this directory
    ///
    /// A trailing slash on `name`, as some servers report for directories, is
    /// ignored.
    #[must_use]
    pub fn join(&self, name: &str) -> Self {
        let name = name.trim_end_matches('/');
        let mut child = self.clone();
        if child.share.is_none() {
            child.share = Some(name.to_string());
        } else {
            child.path.push(name.to_string());
        }
        child
    }

    /// URL of this location as a directory, always ending in `/`
    #[must_use]
    pub fn dir_url(&self) -> String {
        let mut url = self.file_url();
        url.push('/');
        url
    }

    /// URL of this location as a file, without a trailing slash
    #[must_use]
    pub fn file_url(&self) -> String {
        let mut url = format!("{SCHEME}{}", self.host);
        for segment in self.share.iter().chain(self.path.iter()) {
            url.push('/');
            url.push_str(segment);
        }
        url
    }
}

impl fmt::Display for SmbLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dir_url())
    }
}

/// Normalize a UNC path or `smb://` URL into a directory URL
///
/// `\\host\share\dir` becomes `smb://host/share/dir/`. Normalizing the output
/// again yields the same string.
///
/// # Errors
///
/// Returns `NasError::InvalidLocator` if the input cannot be parsed.
pub fn normalize_dir_locator(input: &str) -> Result<String, NasError> {
    SmbLocator::parse(input).map(|locator| locator.dir_url())
}
