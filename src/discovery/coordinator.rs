use super::mdns::MdnsProbe;
use super::multicast::{MulticastGuard, MulticastLock};
use super::netbios::NetbiosProbe;
use super::probe::{AddressSet, DeviceSink, Probe};
use super::tcp::TcpPortProbe;
use crate::error::Result;
use crate::net::SubnetContext;
use crate::types::{DiscoveryConfig, NasDevice};
use futures::Stream;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;

/// How a discovery run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryOutcome {
    /// Every probe finished before the deadline
    Completed,
    /// The overall deadline expired; still-running probes were stopped
    DeadlineReached,
    /// The caller cancelled or dropped the stream
    Cancelled,
}

/// Runs the discovery probes concurrently and merges their sightings
///
/// Each call to [`discover`](Self::discover) starts an independent session
/// with its own dedup set.
pub struct DiscoveryCoordinator {
    config: DiscoveryConfig,
    probes: Vec<Arc<dyn Probe>>,
    multicast: MulticastLock,
    subnet: Option<SubnetContext>,
}

impl DiscoveryCoordinator {
    /// Coordinator running the probes enabled in `config`
    #[must_use]
    pub fn new(config: DiscoveryConfig) -> Self {
        let mut probes: Vec<Arc<dyn Probe>> = Vec::new();
        if config.enable_mdns {
            probes.push(Arc::new(MdnsProbe::new(&config)));
        }
        if config.enable_netbios {
            probes.push(Arc::new(NetbiosProbe::new(&config)));
        }
        if config.enable_tcp {
            probes.push(Arc::new(TcpPortProbe::new(&config)));
        }
        Self::with_probes(config, probes)
    }

    /// Coordinator running an explicit set of probes
    #[must_use]
    pub fn with_probes(config: DiscoveryConfig, probes: Vec<Arc<dyn Probe>>) -> Self {
        Self {
            config,
            probes,
            multicast: MulticastLock::new(),
            subnet: None,
        }
    }

    /// Share a multicast lock with other coordinators
    #[must_use]
    pub fn with_multicast_lock(mut self, lock: MulticastLock) -> Self {
        self.multicast = lock;
        self
    }

    /// Probe this subnet instead of detecting the local one
    #[must_use]
    pub fn with_subnet(mut self, subnet: SubnetContext) -> Self {
        self.subnet = Some(subnet);
        self
    }

    /// The multicast lock sessions acquire
    #[must_use]
    pub fn multicast_lock(&self) -> &MulticastLock {
        &self.multicast
    }

    /// Start a discovery session
    ///
    /// Must be called from within a Tokio runtime. The returned stream yields
    /// each device the first time its address is seen and ends when every
    /// probe is done, the deadline passes, or the session is cancelled.
    ///
    /// Without a configured or detectable subnet the stream ends at once with
    /// no devices.
    #[must_use]
    pub fn discover(&self) -> DiscoveryStream {
        let subnet = match self.subnet {
            Some(subnet) => Ok(subnet),
            None => SubnetContext::detect(),
        };
        self.start_with(subnet)
    }

    pub(super) fn start_with(&self, subnet: Result<SubnetContext>) -> DiscoveryStream {
        let (tx, rx) = mpsc::unbounded_channel();
        let seen = Arc::new(AddressSet::default());
        let cancel = CancellationToken::new();

        let subnet = match subnet {
            Ok(subnet) => subnet,
            Err(e) => {
                tracing::warn!(error = %e, "No local network, nothing to discover");
                return DiscoveryStream {
                    rx,
                    cancel,
                    outcome: Arc::new(Mutex::new(Some(DiscoveryOutcome::Completed))),
                    seen,
                    handle: None,
                };
            }
        };

        let sink = DeviceSink::new(Arc::clone(&seen), tx);
        let outcome = Arc::new(Mutex::new(None));

        tracing::info!(
            local = %subnet.local(),
            probes = self.probes.len(),
            timeout = ?self.config.overall_timeout,
            "Starting discovery"
        );

        let session = Session {
            probes: self.probes.clone(),
            subnet,
            sink,
            deadline: self.config.overall_timeout,
            cancel: cancel.clone(),
            multicast: self.multicast.acquire(),
            outcome: Arc::clone(&outcome),
        };
        let handle = crate::net::spawn(session.run());

        DiscoveryStream {
            rx,
            cancel,
            outcome,
            seen,
            handle: Some(handle),
        }
    }

    /// Start a session folded into running snapshots
    ///
    /// Each item is the deduplicated list of devices seen so far, in
    /// first-seen order.
    pub fn discover_all(&self) -> impl Stream<Item = Vec<NasDevice>> + use<> {
        use futures::StreamExt;

        self.discover()
            .scan(Vec::new(), |snapshot: &mut Vec<NasDevice>, device| {
                merge_device(snapshot, device);
                futures::future::ready(Some(snapshot.clone()))
            })
    }

    /// Run one session to the end and return every device found
    pub async fn discover_devices(&self) -> Vec<NasDevice> {
        use futures::StreamExt;

        self.discover().collect().await
    }
}

/// Add `device` to `snapshot` unless its address is already present
///
/// The earlier entry, and so its display name, is kept. Returns `true` if
/// the device was added.
pub fn merge_device(snapshot: &mut Vec<NasDevice>, device: NasDevice) -> bool {
    if snapshot.iter().any(|d| d.address == device.address) {
        false
    } else {
        snapshot.push(device);
        true
    }
}

struct Session {
    probes: Vec<Arc<dyn Probe>>,
    subnet: SubnetContext,
    sink: DeviceSink,
    deadline: Duration,
    cancel: CancellationToken,
    multicast: MulticastGuard,
    outcome: Arc<Mutex<Option<DiscoveryOutcome>>>,
}

impl Session {
    async fn run(mut self) -> DiscoveryOutcome {
        let probe_token = self.cancel.child_token();
        let mut tasks = JoinSet::new();

        for probe in self.probes.drain(..) {
            let sink = self.sink.clone();
            let token = probe_token.clone();
            let subnet = self.subnet;
            tasks.spawn(async move {
                let name = probe.name();
                let result = tokio::select! {
                    () = token.cancelled() => Ok(()),
                    result = probe.probe(&subnet, &sink) => result,
                };
                (name, result)
            });
        }

        let deadline = tokio::time::sleep(self.deadline);
        tokio::pin!(deadline);

        let outcome = loop {
            tokio::select! {
                () = self.cancel.cancelled() => break DiscoveryOutcome::Cancelled,
                () = &mut deadline => break DiscoveryOutcome::DeadlineReached,
                joined = tasks.join_next() => match joined {
                    None => break DiscoveryOutcome::Completed,
                    Some(Ok((name, Ok(())))) => {
                        tracing::debug!(probe = name, "Probe finished");
                    }
                    Some(Ok((name, Err(e)))) => {
                        tracing::warn!(probe = name, error = %e, "Probe failed");
                    }
                    Some(Err(e)) => {
                        tracing::warn!(error = %e, "Probe task died");
                    }
                },
            }
        };

        // Soft stop: ask the stragglers to wind down, then make sure they have
        probe_token.cancel();
        tasks.shutdown().await;

        self.multicast.release();
        *self
            .outcome
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(outcome);
        tracing::info!(?outcome, devices = self.sink.seen().len(), "Discovery finished");

        // The stream ends once the last sink, ours, is dropped with `self`
        outcome
    }
}

/// Live stream of devices from one discovery session
///
/// Dropping the stream cancels the session.
pub struct DiscoveryStream {
    rx: mpsc::UnboundedReceiver<NasDevice>,
    cancel: CancellationToken,
    outcome: Arc<Mutex<Option<DiscoveryOutcome>>>,
    seen: Arc<AddressSet>,
    handle: Option<JoinHandle<DiscoveryOutcome>>,
}

impl DiscoveryStream {
    /// Ask the session to stop; the stream ends shortly after
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Cancel the session and wait until it has released its resources
    pub async fn stop(mut self) -> DiscoveryOutcome {
        self.cancel.cancel();
        match self.handle.take() {
            Some(handle) => handle.await.unwrap_or(DiscoveryOutcome::Cancelled),
            None => self.outcome().unwrap_or(DiscoveryOutcome::Cancelled),
        }
    }

    /// How the session ended, once it has
    #[must_use]
    pub fn outcome(&self) -> Option<DiscoveryOutcome> {
        *self.outcome.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Distinct addresses seen so far
    #[must_use]
    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }
}

impl Stream for DiscoveryStream {
    type Item = NasDevice;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

impl Drop for DiscoveryStream {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
