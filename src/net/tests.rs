use super::*;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::time::Duration;

#[test]
fn test_subnet_hosts_skip_self() {
    let subnet = SubnetContext::new(Ipv4Addr::new(192, 168, 1, 42));
    let hosts: Vec<_> = subnet.hosts().collect();

    assert_eq!(hosts.len(), 253);
    assert_eq!(hosts.first(), Some(&Ipv4Addr::new(192, 168, 1, 1)));
    assert_eq!(hosts.last(), Some(&Ipv4Addr::new(192, 168, 1, 254)));
    assert!(!hosts.contains(&Ipv4Addr::new(192, 168, 1, 42)));
}

#[test]
fn test_subnet_broadcast_and_contains() {
    let subnet = SubnetContext::new(Ipv4Addr::new(10, 0, 7, 3));

    assert_eq!(subnet.broadcast(), Ipv4Addr::new(10, 0, 7, 255));
    assert!(subnet.contains(IpAddr::V4(Ipv4Addr::new(10, 0, 7, 200))));
    assert!(!subnet.contains(IpAddr::V4(Ipv4Addr::new(10, 0, 8, 200))));
    assert!(!subnet.contains(IpAddr::V6(Ipv6Addr::LOCALHOST)));
}

#[test]
fn test_site_local() {
    assert!(is_site_local(IpAddr::V4(Ipv4Addr::new(192, 168, 0, 10))));
    assert!(is_site_local(IpAddr::V4(Ipv4Addr::new(172, 20, 1, 1))));
    assert!(is_site_local(IpAddr::V4(Ipv4Addr::new(10, 1, 2, 3))));
    assert!(!is_site_local(IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8))));
    assert!(!is_site_local(IpAddr::V4(Ipv4Addr::LOCALHOST)));
    assert!(is_site_local("fec0::1".parse().unwrap()));
    assert!(!is_site_local("fe80::1".parse().unwrap()));
}

#[tokio::test]
async fn test_recv_with_timeout_elapses() {
    let socket = bind_udp_any().await.unwrap();
    let mut buf = [0u8; 64];

    let received = recv_with_timeout(&socket, &mut buf, Duration::from_millis(20))
        .await
        .unwrap();
    assert!(received.is_none());
}

#[tokio::test]
async fn test_can_connect() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    assert!(can_connect(addr, Duration::from_millis(500)).await);

    drop(listener);
    assert!(!can_connect(addr, Duration::from_millis(500)).await);
}

#[tokio::test]
async fn test_runtime_timeout_expired() {
    let result = Runtime::timeout(Duration::from_millis(5), async {
        tokio::time::sleep(Duration::from_secs(5)).await;
    })
    .await;
    assert!(matches!(result, Err(crate::NasError::Timeout)));
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn test_shared_udp_port_binds_twice() {
    let first = bind_udp_shared(0).unwrap();
    let port = first.local_addr().unwrap().port();

    let second = bind_udp_shared(port).unwrap();
    assert_eq!(second.local_addr().unwrap().port(), port);
}
