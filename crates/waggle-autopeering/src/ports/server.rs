//! The server handle shared with protocol engines.

use std::fmt;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::domain::{LocalIdentity, TransportError};

use super::outbound::ServerTransport;

/// Peering server: the local identity bound to a live transport.
///
/// Protocol engines receive this behind an `Arc` when started and must
/// drop their clones when closed. The session keeps ownership of the
/// transport and closes it during teardown, after the server itself was
/// closed.
pub struct PeeringServer {
    local: Arc<LocalIdentity>,
    transport: Arc<dyn ServerTransport>,
    closed: AtomicBool,
}

impl PeeringServer {
    /// Wrap an identity and a bound transport.
    pub fn new(local: Arc<LocalIdentity>, transport: Arc<dyn ServerTransport>) -> Self {
        Self {
            local,
            transport,
            closed: AtomicBool::new(false),
        }
    }

    /// The identity this server speaks as.
    pub fn local(&self) -> &LocalIdentity {
        &self.local
    }

    /// The address the server listens on.
    pub fn local_addr(&self) -> SocketAddr {
        self.transport.local_addr()
    }

    /// Send a protocol datagram.
    ///
    /// # Errors
    ///
    /// Fails with [`TransportError::Closed`] once the server was closed.
    pub async fn send_to(
        &self,
        payload: &[u8],
        target: SocketAddr,
    ) -> Result<usize, TransportError> {
        if self.is_closed() {
            return Err(TransportError::Closed);
        }
        self.transport.send_to(payload, target).await
    }

    /// Receive a protocol datagram.
    ///
    /// # Errors
    ///
    /// Fails with [`TransportError::Closed`] once the server was closed.
    pub async fn recv_from(&self, buf: &mut [u8]) -> Result<(usize, SocketAddr), TransportError> {
        if self.is_closed() {
            return Err(TransportError::Closed);
        }
        self.transport.recv_from(buf).await
    }

    /// Refuse further traffic through this server.
    ///
    /// Idempotent. The underlying transport stays open; the session
    /// closes it separately once the protocol engines are gone.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    /// Whether the server was closed.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

impl fmt::Debug for PeeringServer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PeeringServer")
            .field("local", &self.local.peer_id())
            .field("local_addr", &self.local_addr())
            .field("closed", &self.is_closed())
            .finish()
    }
}
