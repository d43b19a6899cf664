//! Advertised service records.
//!
//! Each peer announces a map of named services. Addresses are carried
//! verbatim as announced on the wire, so splitting them into host and
//! port can fail for remote peers and absence of a service is an
//! ordinary lookup outcome, never an error.

use std::collections::BTreeMap;
use std::net::Ipv6Addr;

/// Service name under which peers accept autopeering traffic.
pub const PEERING_SERVICE: &str = "peering";

/// Service name under which peers accept gossip connections.
pub const GOSSIP_SERVICE: &str = "gossip";

/// Network tag for datagram endpoints.
pub const NETWORK_UDP: &str = "udp";

/// Network tag for stream endpoints.
pub const NETWORK_TCP: &str = "tcp";

/// A single advertised service endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEndpoint {
    network: String,
    address: String,
}

impl ServiceEndpoint {
    /// Create an endpoint from its network tag and address string.
    pub fn new(network: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            network: network.into(),
            address: address.into(),
        }
    }

    /// The network tag, e.g. `udp` or `tcp`.
    pub fn network(&self) -> &str {
        &self.network
    }

    /// The address string as announced.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Split the address into host and port.
    ///
    /// Accepts `host:port` and bracketed `[v6]:port`. Returns `None` when
    /// the address carries no port, an unparseable port, an empty host,
    /// or an unbracketed multi-colon string.
    pub fn host_port(&self) -> Option<(String, u16)> {
        split_host_port(&self.address)
    }
}

/// Split an endpoint address into host and port.
pub fn split_host_port(address: &str) -> Option<(String, u16)> {
    let (host, port) = if let Some(rest) = address.strip_prefix('[') {
        let (host, tail) = rest.split_once(']')?;
        (host, tail.strip_prefix(':')?)
    } else {
        address.rsplit_once(':')?
    };
    if host.is_empty() || host.contains(':') {
        return None;
    }
    let port = port.parse::<u16>().ok()?;
    Some((host.to_string(), port))
}

/// Join a host and port, bracketing IPv6 literals.
pub fn join_host_port(host: &str, port: u16) -> String {
    if host.parse::<Ipv6Addr>().is_ok() {
        format!("[{host}]:{port}")
    } else {
        format!("{host}:{port}")
    }
}

/// Ordered map of service name to endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceSet {
    services: BTreeMap<String, ServiceEndpoint>,
}

impl ServiceSet {
    /// Create an empty service set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a service by name. Unregistered names yield `None`.
    pub fn get(&self, name: &str) -> Option<&ServiceEndpoint> {
        self.services.get(name)
    }

    /// Register a service, replacing any previous endpoint of that name.
    pub fn update(
        &mut self,
        name: impl Into<String>,
        network: impl Into<String>,
        address: impl Into<String>,
    ) {
        self.services
            .insert(name.into(), ServiceEndpoint::new(network, address));
    }

    /// Number of registered services.
    pub fn len(&self) -> usize {
        self.services.len()
    }

    /// Whether no service is registered.
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Iterate over `(name, endpoint)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ServiceEndpoint)> {
        self.services
            .iter()
            .map(|(name, endpoint)| (name.as_str(), endpoint))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_of_unregistered_service_is_none() {
        let services = ServiceSet::new();
        assert!(services.get(PEERING_SERVICE).is_none());
        assert!(services.is_empty());
    }

    #[test]
    fn test_update_inserts_then_replaces() {
        let mut services = ServiceSet::new();
        services.update(PEERING_SERVICE, NETWORK_UDP, "10.0.0.1:14626");
        services.update(PEERING_SERVICE, NETWORK_UDP, "10.0.0.2:14626");

        let endpoint = services.get(PEERING_SERVICE).unwrap();
        assert_eq!(endpoint.address(), "10.0.0.2:14626");
        assert_eq!(endpoint.network(), NETWORK_UDP);
        assert_eq!(services.len(), 1);
    }

    #[test]
    fn test_host_port_splits_ipv4_and_names() {
        let endpoint = ServiceEndpoint::new(NETWORK_UDP, "10.0.0.1:14626");
        assert_eq!(endpoint.host_port(), Some(("10.0.0.1".to_string(), 14626)));

        let endpoint = ServiceEndpoint::new(NETWORK_TCP, "node.example.org:15600");
        assert_eq!(
            endpoint.host_port(),
            Some(("node.example.org".to_string(), 15600))
        );
    }

    #[test]
    fn test_host_port_splits_bracketed_ipv6() {
        let endpoint = ServiceEndpoint::new(NETWORK_UDP, "[2001:db8::1]:14626");
        assert_eq!(
            endpoint.host_port(),
            Some(("2001:db8::1".to_string(), 14626))
        );
    }

    #[test]
    fn test_host_port_rejects_malformed_addresses() {
        let malformed = [
            "",
            "no-port",
            ":14626",
            "host:",
            "host:notaport",
            "host:70000",
            "2001:db8::1",
            "[2001:db8::1]",
        ];
        for address in malformed {
            let endpoint = ServiceEndpoint::new(NETWORK_UDP, address);
            assert_eq!(
                endpoint.host_port(),
                None,
                "address {address:?} must not split"
            );
        }
    }

    #[test]
    fn test_join_host_port_brackets_ipv6() {
        assert_eq!(join_host_port("10.0.0.1", 14626), "10.0.0.1:14626");
        assert_eq!(join_host_port("2001:db8::1", 14626), "[2001:db8::1]:14626");
        assert_eq!(
            join_host_port("node.example.org", 15600),
            "node.example.org:15600"
        );
    }
}
