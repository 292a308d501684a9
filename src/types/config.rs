use std::time::Duration;

/// Share names commonly exposed by consumer NAS products
///
/// Used when a host refuses to list its shares.
pub const SEED_SHARE_NAMES: &[&str] = &[
    "public", "Public", "share", "shared", "media", "Media", "video", "Videos", "Movies",
    "Multimedia", "homes", "Download", "data", "USB",
];

/// Shortest per-receive timeout the UDP probes will wait
pub const MIN_RECEIVE_TIMEOUT: Duration = Duration::from_millis(10);

/// Configuration for device discovery
#[derive(Debug, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub struct DiscoveryConfig {
    /// Overall soft deadline for a discovery run (default: 4 seconds)
    pub overall_timeout: Duration,

    /// Timeout for a single socket receive (default: 1 second)
    pub receive_timeout: Duration,

    /// How long the mDNS and NetBIOS probes listen for replies (default: 3 seconds)
    pub listen_window: Duration,

    /// Maximum replies a UDP probe collects before returning (default: 16)
    pub max_responses: usize,

    /// Timeout for a single TCP connect attempt (default: 500ms)
    pub connect_timeout: Duration,

    /// Connect attempts in flight during the subnet sweep (default: 64)
    pub sweep_concurrency: usize,

    /// Port probed by the TCP sweep (default: 445)
    pub smb_port: u16,

    /// Run the mDNS probe
    pub enable_mdns: bool,

    /// Run the NetBIOS probe
    pub enable_netbios: bool,

    /// Run the TCP port sweep
    pub enable_tcp: bool,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            overall_timeout: Duration::from_secs(4),
            receive_timeout: Duration::from_secs(1),
            listen_window: Duration::from_secs(3),
            max_responses: 16,
            connect_timeout: Duration::from_millis(500),
            sweep_concurrency: 64,
            smb_port: 445,
            enable_mdns: true,
            enable_netbios: true,
            enable_tcp: true,
        }
    }
}

impl DiscoveryConfig {
    /// Create a new config builder
    #[must_use]
    pub fn builder() -> DiscoveryConfigBuilder {
        DiscoveryConfigBuilder::default()
    }
}

/// Builder for `DiscoveryConfig`
#[derive(Debug, Clone, Default)]
pub struct DiscoveryConfigBuilder {
    config: DiscoveryConfig,
}

impl DiscoveryConfigBuilder {
    /// Set the overall discovery deadline
    #[must_use]
    pub fn overall_timeout(mut self, timeout: Duration) -> Self {
        self.config.overall_timeout = timeout;
        self
    }

    /// Set the per-receive socket timeout, at least [`MIN_RECEIVE_TIMEOUT`]
    #[must_use]
    pub fn receive_timeout(mut self, timeout: Duration) -> Self {
        self.config.receive_timeout = timeout.max(MIN_RECEIVE_TIMEOUT);
        self
    }

    /// Set the UDP listen window
    #[must_use]
    pub fn listen_window(mut self, window: Duration) -> Self {
        self.config.listen_window = window;
        self
    }

    /// Set the reply cap for UDP probes
    #[must_use]
    pub fn max_responses(mut self, max: usize) -> Self {
        self.config.max_responses = max.max(1);
        self
    }

    /// Set the TCP connect timeout
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Set how many connects the sweep keeps in flight
    #[must_use]
    pub fn sweep_concurrency(mut self, concurrency: usize) -> Self {
        self.config.sweep_concurrency = concurrency.max(1);
        self
    }

    /// Set the port probed by the sweep
    #[must_use]
    pub fn smb_port(mut self, port: u16) -> Self {
        self.config.smb_port = port;
        self
    }

    /// Enable or disable the mDNS probe
    #[must_use]
    pub fn mdns(mut self, enable: bool) -> Self {
        self.config.enable_mdns = enable;
        self
    }

    /// Enable or disable the NetBIOS probe
    #[must_use]
    pub fn netbios(mut self, enable: bool) -> Self {
        self.config.enable_netbios = enable;
        self
    }

    /// Enable or disable the TCP sweep
    #[must_use]
    pub fn tcp(mut self, enable: bool) -> Self {
        self.config.enable_tcp = enable;
        self
    }

    /// Build the configuration
    #[must_use]
    pub fn build(self) -> DiscoveryConfig {
        self.config
    }
}

/// Configuration for share and video scanning
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Shares walked at the same time on one host (default: 4)
    pub max_concurrent_shares: usize,

    /// Share names tried when enumeration fails
    pub seed_shares: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_concurrent_shares: 4,
            seed_shares: SEED_SHARE_NAMES.iter().map(ToString::to_string).collect(),
        }
    }
}

impl ScanConfig {
    /// Create a new config builder
    #[must_use]
    pub fn builder() -> ScanConfigBuilder {
        ScanConfigBuilder::default()
    }
}

/// Builder for `ScanConfig`
#[derive(Debug, Clone, Default)]
pub struct ScanConfigBuilder {
    config: ScanConfig,
}

impl ScanConfigBuilder {
    /// Set the share-level parallelism
    #[must_use]
    pub fn max_concurrent_shares(mut self, max: usize) -> Self {
        self.config.max_concurrent_shares = max.max(1);
        self
    }

    /// Replace the fallback share names
    #[must_use]
    pub fn seed_shares<I, S>(mut self, shares: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.seed_shares = shares.into_iter().map(Into::into).collect();
        self
    }

    /// Build the configuration
    #[must_use]
    pub fn build(self) -> ScanConfig {
        self.config
    }
}
