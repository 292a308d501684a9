use crate::error::Result;
use crate::net::{Instant, SubnetContext, UdpSocket, recv_with_timeout};
use crate::types::{MIN_RECEIVE_TIMEOUT, NasDevice, ProbeKind};
use async_trait::async_trait;
use std::collections::HashSet;
use std::net::IpAddr;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::mpsc;

/// A discovery strategy that finds candidate hosts on the local subnet
///
/// Implementations report devices through the sink as soon as they see them,
/// so a run cut short by the coordinator deadline keeps what it found.
#[async_trait]
pub trait Probe: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Probe the subnet, reporting every candidate to `sink`
    ///
    /// An `Err` is logged by the caller; devices already reported stand.
    async fn probe(&self, subnet: &SubnetContext, sink: &DeviceSink) -> Result<()>;
}

/// Address set shared by everything reporting into one discovery session
#[derive(Debug, Default)]
pub struct AddressSet {
    inner: Mutex<HashSet<IpAddr>>,
}

impl AddressSet {
    fn lock(&self) -> MutexGuard<'_, HashSet<IpAddr>> {
        // A panic while holding the lock cannot leave the set half-updated
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Insert `addr`, running `on_new` under the lock if it was not present
    pub fn insert_with(&self, addr: IpAddr, on_new: impl FnOnce()) -> bool {
        let mut seen = self.lock();
        if seen.insert(addr) {
            on_new();
            true
        } else {
            false
        }
    }

    /// Whether `addr` has been seen
    #[must_use]
    pub fn contains(&self, addr: &IpAddr) -> bool {
        self.lock().contains(addr)
    }

    /// Number of distinct addresses seen
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// True when nothing has been seen
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

/// Where probes report devices
///
/// Only the first sighting of an address is forwarded. The check and the send
/// happen under one lock, so the output order is the first-seen order even
/// when several probes report at once.
#[derive(Debug, Clone)]
pub struct DeviceSink {
    seen: Arc<AddressSet>,
    tx: mpsc::UnboundedSender<NasDevice>,
}

impl DeviceSink {
    /// Sink forwarding first sightings to `tx`
    #[must_use]
    pub fn new(seen: Arc<AddressSet>, tx: mpsc::UnboundedSender<NasDevice>) -> Self {
        Self { seen, tx }
    }

    /// Sink with its own address set, plus the receiving end
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<NasDevice>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(Arc::new(AddressSet::default()), tx), rx)
    }

    /// Report a device; returns `true` if this was its first sighting
    pub fn report(&self, device: NasDevice) -> bool {
        let address = device.address;
        let source = device.source;
        let fresh = self.seen.insert_with(address, || {
            // Receiver gone means the session is over; nothing left to do
            let _ = self.tx.send(device);
        });
        if fresh {
            tracing::debug!(%address, probe = %source, "Device discovered");
        } else {
            tracing::trace!(%address, probe = %source, "Duplicate sighting ignored");
        }
        fresh
    }

    /// Addresses seen so far
    #[must_use]
    pub fn seen(&self) -> &AddressSet {
        &self.seen
    }
}

/// Run one probe on its own and return what it found
///
/// Errors are logged and swallowed; the result is whatever was reported
/// before the failure, possibly empty.
pub async fn collect_probe(probe: &dyn Probe, subnet: &SubnetContext) -> Vec<NasDevice> {
    let (sink, mut rx) = DeviceSink::channel();
    if let Err(e) = probe.probe(subnet, &sink).await {
        tracing::warn!(probe = probe.name(), error = %e, "Probe failed");
    }
    drop(sink);

    let mut devices = Vec::new();
    while let Ok(device) = rx.try_recv() {
        devices.push(device);
    }
    devices
}

/// How a UDP probe reads one datagram
pub(crate) enum Reply {
    /// Not an answer (our own query looped back, for instance)
    Ignore,
    /// An answer, with the announced name if one could be parsed
    Device(Option<String>),
}

/// Listening discipline shared by the datagram probes
#[derive(Debug, Clone, Copy)]
pub(crate) struct ListenBudget {
    pub window: Duration,
    pub receive_timeout: Duration,
    pub max_responses: usize,
}

/// Whether a datagram from `ip` can come from a device worth reporting
///
/// Our own address and anything outside private ranges are dropped.
pub(crate) fn is_candidate(ip: IpAddr, subnet: &SubnetContext) -> bool {
    ip != IpAddr::V4(subnet.local()) && crate::net::is_site_local(ip)
}

/// Collect replies until the window closes or the reply cap is hit
///
/// Any site-local responder other than ourselves is reported, even when its
/// reply could not be parsed.
pub(crate) async fn listen_for_replies(
    socket: &UdpSocket,
    subnet: &SubnetContext,
    budget: ListenBudget,
    kind: ProbeKind,
    sink: &DeviceSink,
    parse: impl Fn(&[u8]) -> Reply,
) -> std::io::Result<usize> {
    collect_replies(socket, budget, kind, sink, |ip| is_candidate(ip, subnet), parse).await
}

/// Listen loop behind [`listen_for_replies`], with the sender filter supplied
///
/// Only `Reply::Device` answers from accepted senders count toward
/// `max_responses`.
pub(crate) async fn collect_replies(
    socket: &UdpSocket,
    budget: ListenBudget,
    kind: ProbeKind,
    sink: &DeviceSink,
    accept: impl Fn(IpAddr) -> bool,
    parse: impl Fn(&[u8]) -> Reply,
) -> std::io::Result<usize> {
    let deadline = Instant::now() + budget.window;
    let mut buf = vec![0u8; 1500];
    let mut responses = 0;

    while responses < budget.max_responses {
        let now = Instant::now();
        if now >= deadline {
            break;
        }
        let wait = budget
            .receive_timeout
            .max(MIN_RECEIVE_TIMEOUT)
            .min(deadline - now);
        let Some((len, from)) = recv_with_timeout(socket, &mut buf, wait).await? else {
            continue;
        };

        let ip = from.ip();
        if !accept(ip) {
            continue;
        }
        match parse(&buf[..len]) {
            Reply::Ignore => {}
            Reply::Device(name) => {
                responses += 1;
                let mut device = NasDevice::new(ip, kind);
                if let Some(name) = name {
                    device = device.with_name(name);
                }
                sink.report(device);
            }
        }
    }

    Ok(responses)
}
