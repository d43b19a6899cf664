//! Bootstrap peer list construction.

use std::net::SocketAddr;

use crate::domain::{
    preferred_address, EntryNodeDescriptor, EntryNodeError, Peer, ResolveError, ServiceSet,
    NETWORK_UDP, PEERING_SERVICE,
};
use crate::ports::HostResolver;

/// Parse and resolve entry-node descriptors into bootstrap peers.
///
/// Empty strings are skipped; they are placeholders, not mistakes. The
/// first invalid descriptor aborts the whole call. A caller that wants
/// to come up without bootstrap peers handles the error itself; this
/// function does not log.
///
/// Dual-stack hosts are pinned to one address per `prefer_ipv6`, so the
/// same descriptors and resolver output always produce the same peers.
/// Each returned peer advertises exactly one service: peering over UDP
/// at the resolved address.
///
/// # Errors
///
/// See [`EntryNodeError`] for the per-descriptor failure modes.
pub fn parse_entry_nodes(
    descriptors: &[String],
    prefer_ipv6: bool,
    resolver: &dyn HostResolver,
) -> Result<Vec<Peer>, EntryNodeError> {
    let mut peers = Vec::new();
    for descriptor in descriptors {
        if descriptor.is_empty() {
            continue;
        }

        let parsed = EntryNodeDescriptor::parse(descriptor)?;

        let addresses =
            resolver
                .resolve(parsed.host())
                .map_err(|source| EntryNodeError::HostResolution {
                    host: parsed.host().to_string(),
                    source,
                })?;
        let ip = preferred_address(&addresses, prefer_ipv6).ok_or_else(|| {
            EntryNodeError::HostResolution {
                host: parsed.host().to_string(),
                source: ResolveError::NoAddresses {
                    host: parsed.host().to_string(),
                },
            }
        })?;

        let mut services = ServiceSet::new();
        services.update(
            PEERING_SERVICE,
            NETWORK_UDP,
            SocketAddr::new(ip, parsed.port()).to_string(),
        );
        peers.push(Peer::new(*parsed.public_key(), services));
    }
    Ok(peers)
}
