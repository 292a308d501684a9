//! NetBIOS name service probe

use super::probe::{DeviceSink, ListenBudget, Probe, Reply, listen_for_replies};
use super::wire::{self, HEADER_LEN, Header};
use crate::error::{NasError, Result};
use crate::net::{SubnetContext, bind_udp_any};
use crate::types::{DiscoveryConfig, ProbeKind};
use async_trait::async_trait;
use bytes::{BufMut, BytesMut};
use std::net::SocketAddr;

/// NetBIOS name service port
pub const NBNS_PORT: u16 = 137;

const TYPE_NBSTAT: u16 = 0x21;
const CLASS_IN: u16 = 1;
const FLAG_BROADCAST: u16 = 0x0010;
const NAME_ENTRY_LEN: usize = 18;
const GROUP_NAME_FLAG: u16 = 0x8000;

/// First-level encode a 16-byte NetBIOS name into 32 letters
#[must_use]
pub fn encode_name(raw: &[u8; 16]) -> [u8; 32] {
    let mut out = [0u8; 32];
    for (i, byte) in raw.iter().enumerate() {
        out[i * 2] = b'A' + (byte >> 4);
        out[i * 2 + 1] = b'A' + (byte & 0x0F);
    }
    out
}

/// Build a node status (NBSTAT) request for the wildcard name `*`
#[must_use]
pub fn build_status_query(transaction_id: u16) -> Vec<u8> {
    let mut wildcard = [0u8; 16];
    wildcard[0] = b'*';

    let mut buf = BytesMut::with_capacity(HEADER_LEN + 34 + 4);
    buf.put_u16(transaction_id);
    buf.put_u16(FLAG_BROADCAST);
    buf.put_u16(1);
    buf.put_u16(0);
    buf.put_u16(0);
    buf.put_u16(0);

    buf.put_u8(32);
    buf.put_slice(&encode_name(&wildcard));
    buf.put_u8(0);

    buf.put_u16(TYPE_NBSTAT);
    buf.put_u16(CLASS_IN);

    buf.to_vec()
}

/// Extract the machine name from a node status response
///
/// The first unique (non-group) name wins; if every name is a group name the
/// first one is used.
#[must_use]
pub fn parse_status_name(buf: &[u8]) -> Option<String> {
    let header = Header::parse(buf)?;
    if !header.is_response() || header.answers == 0 {
        return None;
    }

    let pos = wire::skip_questions(buf, &header)?;
    let (_, record, _) = wire::read_record(buf, pos)?;
    if record.rtype != TYPE_NBSTAT || record.rdata_len == 0 {
        return None;
    }

    let rdata = &buf[record.rdata_start..record.rdata_start + record.rdata_len];
    let count = usize::from(*rdata.first()?);
    let names: Vec<(String, bool)> = rdata[1..]
        .chunks_exact(NAME_ENTRY_LEN)
        .take(count)
        .map(|entry| {
            let name = String::from_utf8_lossy(&entry[..15])
                .trim_end_matches(['\0', ' '])
                .to_string();
            let flags = u16::from_be_bytes([entry[16], entry[17]]);
            (name, flags & GROUP_NAME_FLAG != 0)
        })
        .filter(|(name, _)| !name.is_empty())
        .collect();

    names
        .iter()
        .find(|(_, group)| !group)
        .or_else(|| names.first())
        .map(|(name, _)| name.clone())
}

fn classify(buf: &[u8]) -> Reply {
    match Header::parse(buf) {
        Some(header) if !header.is_response() => Reply::Ignore,
        _ => Reply::Device(parse_status_name(buf)),
    }
}

/// Finds hosts answering a broadcast NetBIOS status query
#[derive(Debug, Clone)]
pub struct NetbiosProbe {
    budget: ListenBudget,
}

impl NetbiosProbe {
    /// Create the probe with timing from `config`
    #[must_use]
    pub fn new(config: &DiscoveryConfig) -> Self {
        Self {
            budget: ListenBudget {
                window: config.listen_window,
                receive_timeout: config.receive_timeout,
                max_responses: config.max_responses,
            },
        }
    }
}

#[async_trait]
impl Probe for NetbiosProbe {
    fn name(&self) -> &'static str {
        ProbeKind::Netbios.as_str()
    }

    async fn probe(&self, subnet: &SubnetContext, sink: &DeviceSink) -> Result<()> {
        let fail = |e| NasError::probe(self.name(), e);

        let socket = bind_udp_any().await.map_err(fail)?;
        socket.set_broadcast(true).map_err(fail)?;

        let target = SocketAddr::from((subnet.broadcast(), NBNS_PORT));
        let query = build_status_query(rand::random());
        socket.send_to(&query, target).await.map_err(fail)?;
        tracing::debug!(%target, "Sent NetBIOS status query");

        let responses =
            listen_for_replies(&socket, subnet, self.budget, ProbeKind::Netbios, sink, classify)
                .await
                .map_err(fail)?;
        tracing::debug!(responses, "NetBIOS probe finished");
        Ok(())
    }
}
