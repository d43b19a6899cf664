//! Pure peering decisions: neighbor validation and address preference.

use std::net::IpAddr;

use super::entities::Peer;
use super::service_set::{GOSSIP_SERVICE, PEERING_SERVICE};

/// Decide whether a discovered peer qualifies as a neighbor candidate.
///
/// A candidate must advertise a gossip service, both its gossip and
/// peering endpoints must split into host and port, and both services
/// must live on the same host. Ports play no role: a neighbor peers on
/// one port and gossips on another, but from one machine.
///
/// Pure and reentrant; selection engines may call it concurrently from
/// their own workers.
pub fn is_valid_neighbor(candidate: &Peer) -> bool {
    let Some(gossip) = candidate.services().get(GOSSIP_SERVICE) else {
        return false;
    };
    let Some((gossip_host, _)) = gossip.host_port() else {
        return false;
    };
    let Some(peering) = candidate.services().get(PEERING_SERVICE) else {
        return false;
    };
    let Some((peering_host, _)) = peering.host_port() else {
        return false;
    };
    gossip_host == peering_host
}

/// Pick one address by family preference.
///
/// Returns the first address of the preferred family, falling back to
/// the first address overall when that family is absent. Deterministic
/// for a given input order.
pub fn preferred_address(addresses: &[IpAddr], prefer_ipv6: bool) -> Option<IpAddr> {
    addresses
        .iter()
        .find(|addr| {
            if prefer_ipv6 {
                addr.is_ipv6()
            } else {
                addr.is_ipv4()
            }
        })
        .or_else(|| addresses.first())
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::PublicKey;
    use crate::domain::service_set::{ServiceSet, NETWORK_TCP, NETWORK_UDP};

    fn candidate(gossip: Option<&str>, peering: Option<&str>) -> Peer {
        let mut services = ServiceSet::new();
        if let Some(address) = peering {
            services.update(PEERING_SERVICE, NETWORK_UDP, address);
        }
        if let Some(address) = gossip {
            services.update(GOSSIP_SERVICE, NETWORK_TCP, address);
        }
        Peer::new(PublicKey::new([9u8; 32]), services)
    }

    #[test]
    fn test_candidate_without_gossip_is_rejected() {
        assert!(!is_valid_neighbor(&candidate(
            None,
            Some("10.0.0.1:14626")
        )));
    }

    #[test]
    fn test_host_mismatch_is_rejected() {
        let peer = candidate(Some("10.0.0.1:15600"), Some("10.0.0.2:14626"));
        assert!(!is_valid_neighbor(&peer));
    }

    #[test]
    fn test_same_host_different_ports_is_accepted() {
        let peer = candidate(Some("10.0.0.1:15600"), Some("10.0.0.1:14626"));
        assert!(is_valid_neighbor(&peer));
    }

    #[test]
    fn test_malformed_endpoints_are_rejected() {
        assert!(!is_valid_neighbor(&candidate(
            Some("garbage"),
            Some("10.0.0.1:14626")
        )));
        assert!(!is_valid_neighbor(&candidate(
            Some("10.0.0.1:15600"),
            Some("garbage")
        )));
        assert!(!is_valid_neighbor(&candidate(
            Some("10.0.0.1:15600"),
            None
        )));
    }

    #[test]
    fn test_validation_is_idempotent() {
        let peer = candidate(Some("10.0.0.1:15600"), Some("10.0.0.1:14626"));
        let first = is_valid_neighbor(&peer);
        for _ in 0..3 {
            assert_eq!(is_valid_neighbor(&peer), first);
        }
    }

    #[test]
    fn test_preferred_address_family_pick() {
        let v4: IpAddr = "10.0.0.1".parse().unwrap();
        let v6: IpAddr = "2001:db8::1".parse().unwrap();

        assert_eq!(preferred_address(&[v4, v6], false), Some(v4));
        assert_eq!(preferred_address(&[v4, v6], true), Some(v6));
        // Fall back to the other family when the preferred one is absent.
        assert_eq!(preferred_address(&[v4], true), Some(v4));
        assert_eq!(preferred_address(&[v6], false), Some(v6));
        assert_eq!(preferred_address(&[], true), None);
    }
}
