//! # Waggle Autopeering
//!
//! Automatic peer bootstrap and neighbor management for Waggle nodes:
//! entry-node parsing, neighbor validation, a UDP reachability self-test,
//! and a supervised start/serve/shutdown lifecycle around pluggable
//! discovery and selection engines.
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture with:
//! - **Domain Layer:** Pure peering rules (identities, service sets,
//!   entry-node descriptors, neighbor validation)
//! - **Ports Layer:** Trait definitions for protocol engines, resolver,
//!   probe and transport
//! - **Service Layer:** Bootstrap peer construction and the supervised
//!   lifecycle
//! - **Adapters Layer:** UDP transport and probe, system resolver, no-op
//!   engines, TOML settings (feature `config`)
//!
//! ## Example
//!
//! ```rust
//! use waggle_autopeering::{is_valid_neighbor, LocalIdentity};
//!
//! // A peer advertising gossip and peering on the same host is a
//! // usable neighbor.
//! let candidate = LocalIdentity::from_seed([1u8; 32])
//!     .with_peering_service("10.0.0.1:14626")
//!     .with_gossip_service("10.0.0.1:15600")
//!     .build();
//! assert!(is_valid_neighbor(candidate.peer()));
//!
//! // Without the gossip service it is not.
//! let discovery_only = LocalIdentity::from_seed([2u8; 32])
//!     .with_peering_service("10.0.0.2:14626")
//!     .build();
//! assert!(!is_valid_neighbor(discovery_only.peer()));
//! ```

// =============================================================================
// MODULES
// =============================================================================

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

/// Test doubles for the ports (mock engines, fake transport).
/// Requires feature: `test-utils`
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// =============================================================================
// DOMAIN RE-EXPORTS
// =============================================================================

// Entities
pub use domain::{
    EntryNodeDescriptor, LocalIdentity, LocalIdentityBuilder, Peer, PeerId, PublicKey,
    ServiceEndpoint, ServiceSet, SupervisorState,
};

// Errors
pub use domain::{
    EntryNodeError, IdentityError, ProbeError, PublicKeyError, ResolveError, StartupError,
    TransportError,
};

// Domain services and constants
pub use domain::{
    is_valid_neighbor, join_host_port, preferred_address, split_host_port, DEFAULT_PEERING_PORT,
    GOSSIP_SERVICE, NETWORK_TCP, NETWORK_UDP, PEERING_SERVICE, PEER_ID_LEN, PUBLIC_KEY_LEN,
    SEED_LEN,
};

// =============================================================================
// PORT RE-EXPORTS
// =============================================================================

pub use ports::{
    DiscoveryProtocol, HostResolver, NeighborValidator, PeeringServer, PeeringStatus,
    ReachabilityProbe, SelectionProtocol, ServerTransport, TransportFactory,
};

// =============================================================================
// SERVICE RE-EXPORTS
// =============================================================================

pub use service::{
    parse_entry_nodes, AutopeeringSession, AutopeeringSupervisor, AutopeeringSupervisorBuilder,
    SessionHandle, DEFAULT_BIND_HOST,
};

// =============================================================================
// ADAPTER RE-EXPORTS
// =============================================================================

pub use adapters::{
    NoOpDiscoveryProtocol, NoOpReachabilityProbe, NoOpSelectionProtocol, StaticHostResolver,
    SystemHostResolver, UdpReachabilityProbe, UdpServerTransport, UdpTransportFactory,
    DEFAULT_PROBE_TIMEOUT,
};

#[cfg(feature = "config")]
pub use adapters::{AutopeeringSettings, SettingsError, DEFAULT_GOSSIP_PORT};
