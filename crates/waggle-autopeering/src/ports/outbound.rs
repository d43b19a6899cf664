//! # Driven Ports (Outbound SPI)
//!
//! Interfaces this subsystem **requires** from the outside: the protocol
//! engines it supervises and the network primitives it runs on.

use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{Peer, ProbeError, ResolveError, TransportError};

use super::server::PeeringServer;

/// Peer discovery engine lifecycle.
///
/// The engine behind this trait runs its own workers once started. The
/// supervisor guarantees `start` and `close` are each invoked exactly
/// once, `start` strictly before `close`, and `close` runs even when
/// later teardown steps would fail.
///
/// Implementations receive the server behind an `Arc` and must drop
/// their clones on `close`; the session owns the transport underneath
/// and closes it afterwards.
pub trait DiscoveryProtocol: Send + Sync {
    /// Begin discovery traffic over the given server.
    fn start(&self, server: Arc<PeeringServer>);

    /// Stop all discovery activity and release the server handle.
    fn close(&self);
}

/// Neighbor selection engine lifecycle.
///
/// Same contract as [`DiscoveryProtocol`]. Selection is only started on
/// nodes with the gossip capability; it closes before discovery during
/// teardown.
pub trait SelectionProtocol: Send + Sync {
    /// Begin neighbor exchange over the given server.
    fn start(&self, server: Arc<PeeringServer>);

    /// Stop all selection activity and release the server handle.
    fn close(&self);
}

/// Predicate deciding whether a discovered peer may become a neighbor.
///
/// Registered with selection engines at construction. Engines call it
/// from their own workers, possibly concurrently, so it must be pure
/// and non-blocking.
pub type NeighborValidator = Arc<dyn Fn(&Peer) -> bool + Send + Sync>;

/// Host name resolution.
///
/// Kept synchronous: resolution happens a handful of times at startup,
/// never on a hot path.
pub trait HostResolver: Send + Sync {
    /// Resolve a host name or IP literal to its addresses.
    ///
    /// # Errors
    ///
    /// Fails when the lookup errors or yields no addresses.
    fn resolve(&self, host: &str) -> Result<Vec<IpAddr>, ResolveError>;
}

/// Pre-flight reachability check of the advertised peering address.
#[async_trait]
pub trait ReachabilityProbe: Send + Sync {
    /// Verify that `advertised` loops back to a socket bound on
    /// `local_bind`.
    ///
    /// Implementations must release any socket they bind before
    /// returning, so the caller can immediately bind `local_bind` for
    /// live traffic.
    async fn check(&self, local_bind: SocketAddr, advertised: SocketAddr)
        -> Result<(), ProbeError>;
}

/// Datagram transport carrying peering traffic.
#[async_trait]
pub trait ServerTransport: Send + Sync {
    /// The address the transport is bound on.
    fn local_addr(&self) -> SocketAddr;

    /// Send one datagram.
    async fn send_to(&self, payload: &[u8], target: SocketAddr) -> Result<usize, TransportError>;

    /// Receive one datagram.
    async fn recv_from(&self, buf: &mut [u8]) -> Result<(usize, SocketAddr), TransportError>;

    /// Stop the transport. Idempotent; later sends and receives fail
    /// with [`TransportError::Closed`].
    fn close(&self);

    /// Whether `close` was called.
    fn is_closed(&self) -> bool;
}

impl fmt::Debug for dyn ServerTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerTransport")
            .field("local_addr", &self.local_addr())
            .finish_non_exhaustive()
    }
}

/// Creates the server transport during startup.
#[async_trait]
pub trait TransportFactory: Send + Sync {
    /// Bind a transport on `addr`.
    ///
    /// # Errors
    ///
    /// Fails when the address cannot be bound, e.g. the port is taken.
    async fn bind(&self, addr: SocketAddr) -> Result<Arc<dyn ServerTransport>, TransportError>;
}
