//! UDP transport for the peering server.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::net::UdpSocket;
use tracing::debug;

use crate::domain::TransportError;
use crate::ports::{ServerTransport, TransportFactory};

/// Tokio UDP socket behind the [`ServerTransport`] port.
///
/// `close` flips a flag rather than dropping the socket so that shared
/// handles observe the shutdown instead of racing an invalid fd.
#[derive(Debug)]
pub struct UdpServerTransport {
    socket: UdpSocket,
    local_addr: SocketAddr,
    closed: AtomicBool,
}

impl UdpServerTransport {
    /// Binds a UDP socket on `addr`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Bind`] when the address is unavailable,
    /// typically because another process already owns the port.
    pub async fn bind(addr: SocketAddr) -> Result<Self, TransportError> {
        let socket = UdpSocket::bind(addr)
            .await
            .map_err(|source| TransportError::Bind { addr, source })?;
        let local_addr = socket
            .local_addr()
            .map_err(|source| TransportError::Io { source })?;
        debug!("peering transport bound on {}", local_addr);
        Ok(Self {
            socket,
            local_addr,
            closed: AtomicBool::new(false),
        })
    }
}

#[async_trait]
impl ServerTransport for UdpServerTransport {
    fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    async fn send_to(&self, payload: &[u8], target: SocketAddr) -> Result<usize, TransportError> {
        if self.is_closed() {
            return Err(TransportError::Closed);
        }
        self.socket
            .send_to(payload, target)
            .await
            .map_err(|source| TransportError::Io { source })
    }

    async fn recv_from(&self, buf: &mut [u8]) -> Result<(usize, SocketAddr), TransportError> {
        if self.is_closed() {
            return Err(TransportError::Closed);
        }
        self.socket
            .recv_from(buf)
            .await
            .map_err(|source| TransportError::Io { source })
    }

    fn close(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            debug!("peering transport on {} closed", self.local_addr);
        }
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

/// Binds [`UdpServerTransport`] sockets.
#[derive(Debug, Clone, Copy, Default)]
pub struct UdpTransportFactory;

impl UdpTransportFactory {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TransportFactory for UdpTransportFactory {
    async fn bind(&self, addr: SocketAddr) -> Result<Arc<dyn ServerTransport>, TransportError> {
        Ok(Arc::new(UdpServerTransport::bind(addr).await?))
    }
}
