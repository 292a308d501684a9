//! Tokio runtime implementation

use std::io::Result;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::time::Duration;

use socket2::{Domain, Protocol, Socket, Type};

use super::Runtime;

// Re-export tokio types for convenience
pub use tokio::net::TcpStream;
pub use tokio::net::UdpSocket;
pub use tokio::time::Instant;

/// Bind an ephemeral UDP socket on all IPv4 interfaces
pub async fn bind_udp_any() -> Result<UdpSocket> {
    UdpSocket::bind(("0.0.0.0", 0)).await
}

/// Bind a UDP socket on `port` that other processes can bind as well
///
/// Used for well-known ports, such as mDNS, that a system responder usually
/// holds already. Must be called from within a Tokio runtime.
pub fn bind_udp_shared(port: u16) -> Result<UdpSocket> {
    let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;
    socket.set_reuse_address(true)?;
    socket.bind(&SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, port).into())?;
    socket.set_nonblocking(true)?;
    UdpSocket::from_std(socket.into())
}

/// Receive one datagram, giving up after `wait`
///
/// Returns `Ok(None)` when the wait elapses with nothing received.
pub async fn recv_with_timeout(
    socket: &UdpSocket,
    buf: &mut [u8],
    wait: Duration,
) -> Result<Option<(usize, SocketAddr)>> {
    match tokio::time::timeout(wait, socket.recv_from(buf)).await {
        Ok(Ok(received)) => Ok(Some(received)),
        Ok(Err(e)) => Err(e),
        Err(_) => Ok(None),
    }
}

/// Try a TCP connect, reporting only whether it succeeded in time
pub async fn can_connect(addr: SocketAddr, wait: Duration) -> bool {
    matches!(
        Runtime::timeout(wait, TcpStream::connect(addr)).await,
        Ok(Ok(_))
    )
}

/// Spawn a task
pub fn spawn<F>(future: F) -> tokio::task::JoinHandle<F::Output>
where
    F: std::future::Future + Send + 'static,
    F::Output: Send + 'static,
{
    tokio::spawn(future)
}
