//! Adapters Layer - Concrete implementations of the outbound ports.
//!
//! UDP probe and transport, system and static host resolvers, no-op
//! protocol stand-ins, and (feature `config`) TOML settings.

pub mod probe;
pub mod protocols;
pub mod resolver;
pub mod transport;

/// TOML settings.
/// Requires feature: `config`
#[cfg(feature = "config")]
pub mod settings;

pub use probe::{NoOpReachabilityProbe, UdpReachabilityProbe, DEFAULT_PROBE_TIMEOUT};
pub use protocols::{NoOpDiscoveryProtocol, NoOpSelectionProtocol};
pub use resolver::{StaticHostResolver, SystemHostResolver};
pub use transport::{UdpServerTransport, UdpTransportFactory};

#[cfg(feature = "config")]
pub use settings::{AutopeeringSettings, SettingsError, DEFAULT_GOSSIP_PORT};

#[cfg(test)]
mod tests;
