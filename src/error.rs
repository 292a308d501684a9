use std::io;
use thiserror::Error;

/// Errors that can occur while discovering devices or scanning shares
#[derive(Debug, Error)]
pub enum NasError {
    // ===== Discovery Errors =====
    /// A single discovery probe failed
    ///
    /// Never surfaces from the coordinator; probes log and swallow it.
    #[error("{probe} probe failed: {message}")]
    ProbeFailed {
        /// Name of the probe that failed
        probe: &'static str,
        /// Description of the failure
        message: String,
        /// The underlying source of the error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The local subnet could not be determined
    #[error("no usable local network: {message}")]
    NoLocalNetwork {
        /// Description of the failure
        message: String,
    },

    // ===== Connection Errors =====
    /// Failed to reach the host
    #[error("connection failed to {host}: {message}")]
    ConnectionFailed {
        /// The host that was contacted
        host: String,
        /// Description of the failure
        message: String,
        /// The underlying source of the error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The host rejected the credentials
    #[error("authentication failed for {host}: {message}")]
    AuthenticationFailed {
        /// The host that rejected the login
        host: String,
        /// Description of the failure
        message: String,
    },

    // ===== Share Errors =====
    /// Every credential strategy failed to list the host's shares
    #[error("share enumeration failed on {host}: {source}")]
    EnumerationFailed {
        /// The host whose shares could not be listed
        host: String,
        /// Error from the last strategy attempted
        #[source]
        source: Box<NasError>,
    },

    /// One directory could not be listed
    #[error("cannot list {locator}: {message}")]
    DirectoryListFailed {
        /// Locator of the directory
        locator: String,
        /// Description of the failure
        message: String,
        /// The underlying source of the error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Scanning an entire share failed
    #[error("scan of share {share} failed: {message}")]
    ShareScanFailed {
        /// Name of the share
        share: String,
        /// Description of the failure
        message: String,
    },

    /// The path does not exist on the share
    #[error("not found: {locator}")]
    NotFound {
        /// Locator that was looked up
        locator: String,
    },

    /// A UNC path or `smb://` URL could not be parsed
    #[error("invalid locator: {locator} - {reason}")]
    InvalidLocator {
        /// The offending input
        locator: String,
        /// Reason why it is invalid
        reason: String,
    },

    // ===== Control Errors =====
    /// The caller cancelled the operation
    #[error("operation cancelled")]
    Cancelled,

    /// Operation timed out
    #[error("operation timed out")]
    Timeout,

    // ===== I/O Errors =====
    /// Network I/O error
    #[error("network error: {0}")]
    NetworkError(#[from] io::Error),
}

impl NasError {
    /// Check if this error is recoverable by retrying
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed { .. } | Self::Timeout | Self::NetworkError(_)
        )
    }

    /// Check if this error means the credentials were refused
    #[must_use]
    pub fn is_auth_failure(&self) -> bool {
        match self {
            Self::AuthenticationFailed { .. } => true,
            Self::EnumerationFailed { source, .. } => source.is_auth_failure(),
            Self::NetworkError(e) => e.kind() == io::ErrorKind::PermissionDenied,
            _ => false,
        }
    }

    pub(crate) fn probe(probe: &'static str, source: io::Error) -> Self {
        Self::ProbeFailed {
            probe,
            message: source.to_string(),
            source: Some(Box::new(source)),
        }
    }
}

/// Result type alias for discovery and scanning operations
pub type Result<T> = std::result::Result<T, NasError>;
