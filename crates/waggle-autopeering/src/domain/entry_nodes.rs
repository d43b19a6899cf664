//! Entry-node descriptor grammar.
//!
//! Bootstrap peers are configured as `<base64-public-key>@<host>[:<port>]`
//! strings. Parsing here is pure string work; the host stays unresolved
//! so callers decide how (and whether) to look it up.

use std::net::Ipv6Addr;

use super::entities::PublicKey;
use super::errors::EntryNodeError;

/// Default UDP port of the peering service, applied when a descriptor
/// omits the port.
pub const DEFAULT_PEERING_PORT: u16 = 14626;

/// A parsed entry-node descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryNodeDescriptor {
    public_key: PublicKey,
    host: String,
    port: u16,
}

impl EntryNodeDescriptor {
    /// Parse a descriptor string.
    ///
    /// # Errors
    ///
    /// - [`EntryNodeError::InvalidFormat`] when the string does not split
    ///   into exactly two parts around `@` (the part count is reported).
    /// - [`EntryNodeError::InvalidPublicKey`] when the key segment is not
    ///   base64 or decodes to the wrong length.
    /// - [`EntryNodeError::InvalidAddress`] when the address segment is
    ///   not `host[:port]`.
    pub fn parse(descriptor: &str) -> Result<Self, EntryNodeError> {
        let parts: Vec<&str> = descriptor.split('@').collect();
        if parts.len() != 2 {
            return Err(EntryNodeError::InvalidFormat {
                descriptor: descriptor.to_string(),
                parts: parts.len(),
            });
        }

        let public_key = PublicKey::from_base64(parts[0])
            .map_err(|source| EntryNodeError::InvalidPublicKey { source })?;

        let (host, port) =
            parse_origin_address(parts[1]).ok_or_else(|| EntryNodeError::InvalidAddress {
                address: parts[1].to_string(),
            })?;

        Ok(Self {
            public_key,
            host,
            port,
        })
    }

    /// The declared public key.
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// The unresolved host name or IP literal.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The peering port, defaulted when the descriptor omitted it.
    pub fn port(&self) -> u16 {
        self.port
    }
}

/// Split the origin-address segment of a descriptor.
///
/// Accepted forms: `host`, `host:port`, `[v6]`, `[v6]:port`, and a bare
/// IPv6 literal without a port. The default peering port fills in when
/// the port is omitted.
fn parse_origin_address(address: &str) -> Option<(String, u16)> {
    if address.is_empty() {
        return None;
    }
    if let Some(rest) = address.strip_prefix('[') {
        let (host, tail) = rest.split_once(']')?;
        if host.is_empty() {
            return None;
        }
        let port = match tail {
            "" => DEFAULT_PEERING_PORT,
            _ => tail.strip_prefix(':')?.parse::<u16>().ok()?,
        };
        return Some((host.to_string(), port));
    }
    match address.rsplit_once(':') {
        None => Some((address.to_string(), DEFAULT_PEERING_PORT)),
        Some((host, port)) => {
            if host.contains(':') {
                // More than one colon: only a full IPv6 literal is valid,
                // and then the whole string is the host.
                if address.parse::<Ipv6Addr>().is_ok() {
                    return Some((address.to_string(), DEFAULT_PEERING_PORT));
                }
                return None;
            }
            if host.is_empty() {
                return None;
            }
            Some((host.to_string(), port.parse::<u16>().ok()?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose, Engine as _};

    fn key_b64(fill: u8) -> String {
        general_purpose::STANDARD.encode([fill; 32])
    }

    #[test]
    fn test_parse_with_explicit_port() {
        let descriptor = format!("{}@entry.example.org:15626", key_b64(7));
        let parsed = EntryNodeDescriptor::parse(&descriptor).unwrap();
        assert_eq!(parsed.public_key(), &PublicKey::new([7u8; 32]));
        assert_eq!(parsed.host(), "entry.example.org");
        assert_eq!(parsed.port(), 15626);
    }

    #[test]
    fn test_parse_defaults_the_port() {
        let parsed = EntryNodeDescriptor::parse(&format!("{}@10.0.0.1", key_b64(1))).unwrap();
        assert_eq!(parsed.host(), "10.0.0.1");
        assert_eq!(parsed.port(), DEFAULT_PEERING_PORT);
    }

    #[test]
    fn test_parse_accepts_ipv6_forms() {
        let parsed =
            EntryNodeDescriptor::parse(&format!("{}@[2001:db8::1]:14627", key_b64(1))).unwrap();
        assert_eq!(parsed.host(), "2001:db8::1");
        assert_eq!(parsed.port(), 14627);

        let parsed = EntryNodeDescriptor::parse(&format!("{}@[2001:db8::1]", key_b64(1))).unwrap();
        assert_eq!(parsed.host(), "2001:db8::1");
        assert_eq!(parsed.port(), DEFAULT_PEERING_PORT);

        let parsed = EntryNodeDescriptor::parse(&format!("{}@2001:db8::1", key_b64(1))).unwrap();
        assert_eq!(parsed.host(), "2001:db8::1");
        assert_eq!(parsed.port(), DEFAULT_PEERING_PORT);
    }

    #[test]
    fn test_parse_counts_parts_on_format_errors() {
        match EntryNodeDescriptor::parse("no-separator").unwrap_err() {
            EntryNodeError::InvalidFormat { parts, .. } => assert_eq!(parts, 1),
            other => panic!("unexpected error: {other}"),
        }
        match EntryNodeDescriptor::parse("a@b@c").unwrap_err() {
            EntryNodeError::InvalidFormat { parts, .. } => assert_eq!(parts, 3),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_rejects_bad_public_keys() {
        assert!(matches!(
            EntryNodeDescriptor::parse("****@10.0.0.1:14626"),
            Err(EntryNodeError::InvalidPublicKey { .. })
        ));
        let short_key = format!(
            "{}@10.0.0.1:14626",
            general_purpose::STANDARD.encode([1u8; 16])
        );
        assert!(matches!(
            EntryNodeDescriptor::parse(&short_key),
            Err(EntryNodeError::InvalidPublicKey { .. })
        ));
    }

    #[test]
    fn test_parse_rejects_bad_addresses() {
        let malformed = [
            "",
            ":14626",
            "host:notaport",
            "host:70000",
            "[2001:db8::1",
            "1.2.3.4:5:6",
        ];
        for address in malformed {
            let descriptor = format!("{}@{}", key_b64(1), address);
            assert!(
                matches!(
                    EntryNodeDescriptor::parse(&descriptor),
                    Err(EntryNodeError::InvalidAddress { .. })
                ),
                "address {address:?} must be rejected"
            );
        }
    }
}
