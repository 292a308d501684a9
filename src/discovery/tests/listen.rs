use crate::discovery::DeviceSink;
use crate::discovery::probe::{ListenBudget, Reply, collect_replies, is_candidate};
use crate::net::{SubnetContext, UdpSocket};
use crate::types::ProbeKind;
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;
use tokio::time::Instant;

fn budget(window_ms: u64, max_responses: usize) -> ListenBudget {
    ListenBudget {
        window: Duration::from_millis(window_ms),
        receive_timeout: Duration::from_millis(100),
        max_responses,
    }
}

// Datagrams starting with `q` stand in for queries echoed back to us
fn parse(buf: &[u8]) -> Reply {
    match buf.first() {
        Some(b'q') => Reply::Ignore,
        _ => Reply::Device(std::str::from_utf8(buf).ok().map(str::to_string)),
    }
}

async fn loopback_pair() -> (UdpSocket, UdpSocket) {
    let listener = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let sender = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    sender
        .connect(listener.local_addr().unwrap())
        .await
        .unwrap();
    (listener, sender)
}

#[tokio::test(start_paused = true)]
async fn test_listen_stops_when_window_closes() {
    let (listener, _sender) = loopback_pair().await;
    let (sink, mut rx) = DeviceSink::channel();
    let start = Instant::now();

    let responses = collect_replies(
        &listener,
        budget(3_000, 16),
        ProbeKind::Mdns,
        &sink,
        |ip| ip.is_loopback(),
        parse,
    )
    .await
    .unwrap();

    assert_eq!(responses, 0);
    assert!(start.elapsed() >= Duration::from_millis(3_000));
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_listen_stops_at_response_cap() {
    let (listener, sender) = loopback_pair().await;
    for name in ["alpha", "beta", "gamma"] {
        sender.send(name.as_bytes()).await.unwrap();
    }
    let (sink, mut rx) = DeviceSink::channel();

    let responses = collect_replies(
        &listener,
        budget(5_000, 2),
        ProbeKind::Netbios,
        &sink,
        |ip| ip.is_loopback(),
        parse,
    )
    .await
    .unwrap();

    assert_eq!(responses, 2);
    // Same sender each time, so only the first sighting is forwarded
    let device = rx.try_recv().unwrap();
    assert_eq!(device.address, IpAddr::V4(Ipv4Addr::LOCALHOST));
    assert_eq!(device.display_name.as_deref(), Some("alpha"));
    assert_eq!(device.source, ProbeKind::Netbios);
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_ignored_replies_do_not_count() {
    let (listener, sender) = loopback_pair().await;
    sender.send(b"query").await.unwrap();
    sender.send(b"nas").await.unwrap();
    let (sink, mut rx) = DeviceSink::channel();

    let responses = collect_replies(
        &listener,
        budget(5_000, 1),
        ProbeKind::Mdns,
        &sink,
        |ip| ip.is_loopback(),
        parse,
    )
    .await
    .unwrap();

    assert_eq!(responses, 1);
    assert_eq!(rx.try_recv().unwrap().display_name.as_deref(), Some("nas"));
}

#[tokio::test]
async fn test_rejected_senders_are_dropped() {
    let (listener, sender) = loopback_pair().await;
    sender.send(b"nas").await.unwrap();
    let (sink, mut rx) = DeviceSink::channel();

    let responses = collect_replies(
        &listener,
        budget(300, 16),
        ProbeKind::Mdns,
        &sink,
        |_| false,
        parse,
    )
    .await
    .unwrap();

    assert_eq!(responses, 0);
    assert!(rx.try_recv().is_err());
}

#[test]
fn test_candidate_senders() {
    let subnet = SubnetContext::new(Ipv4Addr::new(192, 168, 1, 50));

    assert!(is_candidate(IpAddr::V4(Ipv4Addr::new(192, 168, 1, 7)), &subnet));
    assert!(is_candidate(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2)), &subnet));
    assert!(!is_candidate(IpAddr::V4(subnet.local()), &subnet));
    assert!(!is_candidate(IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8)), &subnet));
    assert!(!is_candidate(IpAddr::V4(Ipv4Addr::LOCALHOST), &subnet));
}
