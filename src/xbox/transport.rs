//! Datagram transport seam.
//!
//! Every bridge operation binds a fresh socket through a [`Transport`] and
//! drops it when done; nothing is shared between requests.

use std::future::Future;
use std::io;
use std::net::SocketAddr;

use tokio::net::UdpSocket;

/// Opens per-operation datagram sockets.
pub trait Transport: Send + Sync + 'static {
    type Socket: DatagramSocket;

    /// Bind a new socket, with `SO_BROADCAST` set when `broadcast` is true.
    fn bind(&self, broadcast: bool) -> impl Future<Output = io::Result<Self::Socket>> + Send;
}

/// The two socket calls the bridge needs.
pub trait DatagramSocket: Send + Sync {
    fn send_to(
        &self,
        buf: &[u8],
        target: SocketAddr,
    ) -> impl Future<Output = io::Result<usize>> + Send;

    fn recv_from(
        &self,
        buf: &mut [u8],
    ) -> impl Future<Output = io::Result<(usize, SocketAddr)>> + Send;
}

/// Real UDP over tokio, bound to an ephemeral port on all interfaces.
#[derive(Debug, Clone, Default)]
pub struct UdpTransport;

impl Transport for UdpTransport {
    type Socket = UdpSocket;

    async fn bind(&self, broadcast: bool) -> io::Result<UdpSocket> {
        let socket = UdpSocket::bind(("0.0.0.0", 0)).await?;
        if broadcast {
            socket.set_broadcast(true)?;
        }
        Ok(socket)
    }
}

impl DatagramSocket for UdpSocket {
    async fn send_to(&self, buf: &[u8], target: SocketAddr) -> io::Result<usize> {
        UdpSocket::send_to(self, buf, target).await
    }

    async fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)> {
        UdpSocket::recv_from(self, buf).await
    }
}
