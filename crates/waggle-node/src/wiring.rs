//! # Subsystem Wiring
//!
//! Assembles the autopeering supervisor from settings: identity, bootstrap
//! peers, protocol engines and the neighbor filter.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, error};

use waggle_autopeering::{
    is_valid_neighbor, parse_entry_nodes, AutopeeringSettings, AutopeeringSupervisor,
    LocalIdentity, NeighborValidator, NoOpDiscoveryProtocol, NoOpSelectionProtocol, Peer,
    SystemHostResolver,
};

/// Builds an autopeering supervisor from `settings`.
///
/// Entry nodes that fail to parse or resolve are logged and dropped as a
/// whole; the node then starts without bootstrap peers. A bad identity
/// seed, in contrast, is an error: silently generating a fresh identity
/// would change who this node is on the network.
///
/// # Errors
///
/// Fails when the configured identity seed is not valid base64 for a
/// 32-byte seed.
pub fn build_autopeering(settings: &AutopeeringSettings) -> Result<AutopeeringSupervisor> {
    let identity = Arc::new(build_identity(settings)?);
    debug!(
        "autopeering identity: ID={} PublicKey={}",
        identity.peer_id(),
        identity.public_key()
    );

    let discovery =
        Arc::new(NoOpDiscoveryProtocol::new().with_master_peers(bootstrap_peers(settings)));

    let mut builder = AutopeeringSupervisor::builder(identity, discovery)
        .with_bind_host(settings.bind_address.clone());
    if settings.gossip_enabled {
        let validator: NeighborValidator = Arc::new(is_valid_neighbor);
        builder = builder.with_selection(Arc::new(NoOpSelectionProtocol::new(validator)));
    }
    Ok(builder.build())
}

/// The local identity for this node, seeded or freshly generated.
fn build_identity(settings: &AutopeeringSettings) -> Result<LocalIdentity> {
    let builder = match &settings.seed {
        Some(seed) => {
            LocalIdentity::from_base64_seed(seed).context("invalid autopeering seed")?
        }
        None => LocalIdentity::generate(),
    };

    let builder = builder.with_peering_service(settings.advertised_peering_address());
    let builder = if settings.gossip_enabled {
        builder.with_gossip_service(settings.advertised_gossip_address())
    } else {
        builder
    };
    Ok(builder.build())
}

/// Bootstrap peers from the configured entry nodes.
///
/// Invalid descriptors disable bootstrapping entirely instead of peering
/// with half a list.
fn bootstrap_peers(settings: &AutopeeringSettings) -> Vec<Peer> {
    let resolver = SystemHostResolver::new();
    match parse_entry_nodes(&settings.entry_nodes, settings.prefer_ipv6, &resolver) {
        Ok(peers) => {
            debug!("parsed {} entry nodes", peers.len());
            peers
        }
        Err(e) => {
            error!("Invalid entry nodes; ignoring: {}", e);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use waggle_autopeering::{GOSSIP_SERVICE, PEERING_SERVICE};

    fn seeded_settings() -> AutopeeringSettings {
        AutopeeringSettings {
            seed: Some("AQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQE=".to_string()),
            ..AutopeeringSettings::default()
        }
    }

    #[test]
    fn test_identity_is_stable_under_a_seed() {
        let settings = seeded_settings();
        let a = build_identity(&settings).unwrap();
        let b = build_identity(&settings).unwrap();
        assert_eq!(a.peer_id(), b.peer_id());
    }

    #[test]
    fn test_identity_services_follow_gossip_flag() {
        let mut settings = seeded_settings();
        let with_gossip = build_identity(&settings).unwrap();
        assert!(with_gossip.services().get(PEERING_SERVICE).is_some());
        assert!(with_gossip.services().get(GOSSIP_SERVICE).is_some());

        settings.gossip_enabled = false;
        let without_gossip = build_identity(&settings).unwrap();
        assert!(without_gossip.services().get(PEERING_SERVICE).is_some());
        assert!(without_gossip.services().get(GOSSIP_SERVICE).is_none());
    }

    #[test]
    fn test_bad_seed_is_an_error() {
        let settings = AutopeeringSettings {
            seed: Some("???".to_string()),
            ..AutopeeringSettings::default()
        };
        assert!(build_identity(&settings).is_err());
    }

    #[test]
    fn test_invalid_entry_nodes_disable_bootstrapping() {
        let settings = AutopeeringSettings {
            entry_nodes: vec!["not-a-descriptor".to_string()],
            ..AutopeeringSettings::default()
        };
        assert!(bootstrap_peers(&settings).is_empty());
    }

    #[test]
    fn test_literal_entry_nodes_resolve_without_dns() {
        let key = LocalIdentity::from_seed([3u8; 32])
            .build()
            .public_key()
            .to_base64();
        let settings = AutopeeringSettings {
            entry_nodes: vec![format!("{key}@192.0.2.10:14626")],
            ..AutopeeringSettings::default()
        };

        let peers = bootstrap_peers(&settings);
        assert_eq!(peers.len(), 1);
        assert_eq!(
            peers[0].services().get(PEERING_SERVICE).unwrap().address(),
            "192.0.2.10:14626"
        );
    }
}
