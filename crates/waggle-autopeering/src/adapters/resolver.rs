//! DNS host resolution backed by the operating system.

use std::collections::HashMap;
use std::net::{IpAddr, ToSocketAddrs};

use crate::domain::ResolveError;
use crate::ports::HostResolver;

/// Resolves hostnames through the system resolver.
///
/// IP literals short-circuit without a lookup, so entry nodes given as
/// raw addresses never touch DNS.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemHostResolver;

impl SystemHostResolver {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl HostResolver for SystemHostResolver {
    fn resolve(&self, host: &str) -> Result<Vec<IpAddr>, ResolveError> {
        if let Ok(ip) = host.parse::<IpAddr>() {
            return Ok(vec![ip]);
        }

        let addresses: Vec<IpAddr> = (host, 0u16)
            .to_socket_addrs()
            .map_err(|source| ResolveError::Lookup {
                host: host.to_string(),
                source,
            })?
            .map(|addr| addr.ip())
            .collect();

        if addresses.is_empty() {
            return Err(ResolveError::NoAddresses {
                host: host.to_string(),
            });
        }
        Ok(addresses)
    }
}

/// Resolver with a fixed host table, for tests and air-gapped setups.
#[derive(Debug, Clone, Default)]
pub struct StaticHostResolver {
    entries: HashMap<String, Vec<IpAddr>>,
}

impl StaticHostResolver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>, addresses: Vec<IpAddr>) -> Self {
        self.entries.insert(host.into(), addresses);
        self
    }
}

impl HostResolver for StaticHostResolver {
    fn resolve(&self, host: &str) -> Result<Vec<IpAddr>, ResolveError> {
        match self.entries.get(host) {
            Some(addresses) if !addresses.is_empty() => Ok(addresses.clone()),
            _ => Err(ResolveError::NoAddresses {
                host: host.to_string(),
            }),
        }
    }
}
