//! Multicast DNS probe for `_smb._tcp.local`

use super::probe::{DeviceSink, ListenBudget, Probe, Reply, listen_for_replies};
use super::wire::{self, HEADER_LEN, Header};
use crate::error::{NasError, Result};
use crate::net::{SubnetContext, UdpSocket, bind_udp_any, bind_udp_shared};
use crate::types::{DiscoveryConfig, ProbeKind};
use async_trait::async_trait;
use bytes::{BufMut, BytesMut};
use std::net::{Ipv4Addr, SocketAddr};

/// Service type browsed for SMB hosts
pub const SMB_SERVICE_TYPE: &str = "_smb._tcp.local";

/// Standard mDNS IPv4 group
pub const MDNS_GROUP: Ipv4Addr = Ipv4Addr::new(224, 0, 0, 251);

/// Standard mDNS port
pub const MDNS_PORT: u16 = 5353;

const TYPE_PTR: u16 = 12;
const CLASS_IN: u16 = 1;

/// Build a one-question PTR query for `service`
#[must_use]
pub fn build_query(service: &str) -> Vec<u8> {
    let mut buf = BytesMut::with_capacity(HEADER_LEN + service.len() + 6);

    // mDNS queries carry id 0 and no flags
    buf.put_u16(0);
    buf.put_u16(0);
    buf.put_u16(1);
    buf.put_u16(0);
    buf.put_u16(0);
    buf.put_u16(0);

    for label in service.split('.').filter(|l| !l.is_empty()) {
        let bytes = label.as_bytes();
        let len = u8::try_from(bytes.len().min(63)).unwrap_or(63);
        buf.put_u8(len);
        buf.put_slice(&bytes[..usize::from(len)]);
    }
    buf.put_u8(0);

    buf.put_u16(TYPE_PTR);
    buf.put_u16(CLASS_IN);

    buf.to_vec()
}

/// Pull the service instance label out of a response
///
/// For a PTR answer `_smb._tcp.local -> DiskStation._smb._tcp.local` this
/// returns `DiskStation`.
#[must_use]
pub fn parse_instance_name(buf: &[u8]) -> Option<String> {
    let header = Header::parse(buf)?;
    if !header.is_response() {
        return None;
    }

    let mut pos = wire::skip_questions(buf, &header)?;
    for _ in 0..header.record_count() {
        let (owner, record, next) = wire::read_record(buf, pos)?;
        if record.rtype == TYPE_PTR && owner.eq_ignore_ascii_case(SMB_SERVICE_TYPE) {
            let (target, _) = wire::read_name(buf, record.rdata_start)?;
            let suffix = format!(".{SMB_SERVICE_TYPE}");
            let instance = target
                .len()
                .checked_sub(suffix.len())
                .and_then(|cut| Some((target.get(..cut)?, target.get(cut..)?)))
                .filter(|(_, tail)| tail.eq_ignore_ascii_case(&suffix))
                .map_or_else(
                    || target.split('.').next().unwrap_or_default(),
                    |(head, _)| head,
                );
            if !instance.is_empty() {
                return Some(instance.to_string());
            }
        }
        pos = next;
    }
    None
}

fn classify(buf: &[u8]) -> Reply {
    match Header::parse(buf) {
        Some(header) if !header.is_response() => Reply::Ignore,
        _ => Reply::Device(parse_instance_name(buf)),
    }
}

/// Listen on the mDNS port alongside any system responder
///
/// Falls back to an ephemeral port, where responders still answer unicast,
/// when the shared bind is refused.
async fn bind_socket() -> std::io::Result<UdpSocket> {
    match bind_udp_shared(MDNS_PORT) {
        Ok(socket) => Ok(socket),
        Err(e) => {
            tracing::debug!(
                error = %e,
                port = MDNS_PORT,
                "Shared mDNS bind failed, using an ephemeral port"
            );
            bind_udp_any().await
        }
    }
}

/// Finds hosts answering an mDNS query for SMB services
#[derive(Debug, Clone)]
pub struct MdnsProbe {
    budget: ListenBudget,
    target: SocketAddr,
}

impl MdnsProbe {
    /// Create the probe with timing from `config`
    #[must_use]
    pub fn new(config: &DiscoveryConfig) -> Self {
        Self {
            budget: ListenBudget {
                window: config.listen_window,
                receive_timeout: config.receive_timeout,
                max_responses: config.max_responses,
            },
            target: SocketAddr::from((MDNS_GROUP, MDNS_PORT)),
        }
    }
}

#[async_trait]
impl Probe for MdnsProbe {
    fn name(&self) -> &'static str {
        ProbeKind::Mdns.as_str()
    }

    async fn probe(&self, subnet: &SubnetContext, sink: &DeviceSink) -> Result<()> {
        let fail = |e| NasError::probe(self.name(), e);

        let socket = bind_socket().await.map_err(fail)?;
        // Without the group, only responders that answer unicast are heard
        if let Err(e) = socket.join_multicast_v4(MDNS_GROUP, Ipv4Addr::UNSPECIFIED) {
            tracing::debug!(error = %e, "Could not join mDNS group");
        }
        if let Err(e) = socket.set_multicast_loop_v4(false) {
            tracing::trace!(error = %e, "Could not disable multicast loopback");
        }

        let query = build_query(SMB_SERVICE_TYPE);
        socket.send_to(&query, self.target).await.map_err(fail)?;
        tracing::debug!(target = %self.target, "Sent mDNS query");

        let responses =
            listen_for_replies(&socket, subnet, self.budget, ProbeKind::Mdns, sink, classify)
                .await
                .map_err(fail)?;
        tracing::debug!(responses, "mDNS probe finished");
        Ok(())
    }
}
