//! # Ports Layer - Hexagonal Architecture Boundaries
//!
//! Trait contracts between the autopeering subsystem and the outside
//! world.
//!
//! - **Driving Ports (Inbound):** status surfaces the subsystem exposes
//!   to the host.
//! - **Driven Ports (Outbound):** the discovery and selection engines,
//!   host resolution, reachability probing and the datagram transport
//!   the subsystem requires from adapters.
//!
//! [`PeeringServer`] is the handle type passed across the outbound
//! boundary when protocol engines are started.

pub mod inbound;
pub mod outbound;
pub mod server;

pub use inbound::PeeringStatus;
pub use outbound::{
    DiscoveryProtocol, HostResolver, NeighborValidator, ReachabilityProbe, SelectionProtocol,
    ServerTransport, TransportFactory,
};
pub use server::PeeringServer;
