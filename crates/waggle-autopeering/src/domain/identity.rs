//! The node's own identity.

use std::fmt;

use base64::{engine::general_purpose, Engine as _};
use ed25519_dalek::{Signature, Signer, SigningKey};
use rand::rngs::OsRng;
use rand::RngCore;

use super::entities::{Peer, PeerId, PublicKey};
use super::errors::IdentityError;
use super::service_set::{ServiceSet, GOSSIP_SERVICE, NETWORK_TCP, NETWORK_UDP, PEERING_SERVICE};

/// Number of bytes in an identity seed.
pub const SEED_LEN: usize = 32;

/// The local node's keypair plus its advertised services.
///
/// Immutable once built: the services a node advertises are fixed for
/// the lifetime of a session.
pub struct LocalIdentity {
    signing_key: SigningKey,
    peer: Peer,
}

impl LocalIdentity {
    /// Start building an identity around a freshly generated keypair.
    pub fn generate() -> LocalIdentityBuilder {
        let mut seed = [0u8; SEED_LEN];
        OsRng.fill_bytes(&mut seed);
        Self::from_seed(seed)
    }

    /// Start building an identity from a 32-byte seed.
    ///
    /// The same seed always yields the same keypair, which keeps node
    /// identity stable across restarts.
    pub fn from_seed(seed: [u8; SEED_LEN]) -> LocalIdentityBuilder {
        LocalIdentityBuilder::new(SigningKey::from_bytes(&seed))
    }

    /// Start building an identity from a base64-encoded 32-byte seed.
    ///
    /// # Errors
    ///
    /// Fails when the text is not valid base64 or decodes to the wrong
    /// length.
    pub fn from_base64_seed(seed: &str) -> Result<LocalIdentityBuilder, IdentityError> {
        let bytes = general_purpose::STANDARD
            .decode(seed)
            .map_err(|source| IdentityError::MalformedSeed { source })?;
        let bytes: [u8; SEED_LEN] = bytes
            .try_into()
            .map_err(|rejected: Vec<u8>| IdentityError::SeedLength {
                len: rejected.len(),
            })?;
        Ok(Self::from_seed(bytes))
    }

    /// The local public key.
    pub fn public_key(&self) -> &PublicKey {
        self.peer.public_key()
    }

    /// Short identifier derived from the public key.
    pub fn peer_id(&self) -> PeerId {
        self.peer.id()
    }

    /// The local node viewed as a peer of the overlay.
    pub fn peer(&self) -> &Peer {
        &self.peer
    }

    /// The services this node advertises.
    pub fn services(&self) -> &ServiceSet {
        self.peer.services()
    }

    /// Sign a message with the identity key.
    pub fn sign(&self, message: &[u8]) -> Signature {
        self.signing_key.sign(message)
    }
}

// Keeps the secret key out of logs.
impl fmt::Debug for LocalIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalIdentity")
            .field("peer_id", &self.peer_id())
            .field("public_key", &self.public_key())
            .finish_non_exhaustive()
    }
}

/// Collects the advertised endpoints before the identity is frozen.
pub struct LocalIdentityBuilder {
    signing_key: SigningKey,
    services: ServiceSet,
}

impl LocalIdentityBuilder {
    fn new(signing_key: SigningKey) -> Self {
        Self {
            signing_key,
            services: ServiceSet::new(),
        }
    }

    /// Advertise the peering service at `address` over UDP.
    #[must_use]
    pub fn with_peering_service(mut self, address: impl Into<String>) -> Self {
        self.services.update(PEERING_SERVICE, NETWORK_UDP, address);
        self
    }

    /// Advertise the gossip service at `address` over TCP.
    #[must_use]
    pub fn with_gossip_service(mut self, address: impl Into<String>) -> Self {
        self.services.update(GOSSIP_SERVICE, NETWORK_TCP, address);
        self
    }

    /// Freeze the identity.
    pub fn build(self) -> LocalIdentity {
        let public_key = PublicKey::new(self.signing_key.verifying_key().to_bytes());
        let peer = Peer::new(public_key, self.services);
        LocalIdentity {
            signing_key: self.signing_key,
            peer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_identity_is_deterministic() {
        let a = LocalIdentity::from_seed([3u8; SEED_LEN]).build();
        let b = LocalIdentity::from_seed([3u8; SEED_LEN]).build();
        assert_eq!(a.public_key(), b.public_key());
        assert_eq!(a.peer_id(), b.peer_id());
    }

    #[test]
    fn test_generated_identities_differ() {
        let a = LocalIdentity::generate().build();
        let b = LocalIdentity::generate().build();
        assert_ne!(a.public_key(), b.public_key());
    }

    #[test]
    fn test_base64_seed_round_trip() {
        let seed = general_purpose::STANDARD.encode([4u8; SEED_LEN]);
        let from_text = LocalIdentity::from_base64_seed(&seed).unwrap().build();
        let from_bytes = LocalIdentity::from_seed([4u8; SEED_LEN]).build();
        assert_eq!(from_text.public_key(), from_bytes.public_key());
    }

    #[test]
    fn test_bad_seeds_are_rejected() {
        assert!(matches!(
            LocalIdentity::from_base64_seed("???"),
            Err(IdentityError::MalformedSeed { .. })
        ));
        let short = general_purpose::STANDARD.encode([1u8; 8]);
        assert!(matches!(
            LocalIdentity::from_base64_seed(&short),
            Err(IdentityError::SeedLength { len: 8 })
        ));
    }

    #[test]
    fn test_identity_registers_advertised_services() {
        let identity = LocalIdentity::from_seed([5u8; SEED_LEN])
            .with_peering_service("198.51.100.7:14626")
            .with_gossip_service("198.51.100.7:15600")
            .build();

        let peering = identity.services().get(PEERING_SERVICE).unwrap();
        assert_eq!(peering.network(), NETWORK_UDP);
        assert_eq!(peering.address(), "198.51.100.7:14626");

        let gossip = identity.services().get(GOSSIP_SERVICE).unwrap();
        assert_eq!(gossip.network(), NETWORK_TCP);
        assert_eq!(gossip.address(), "198.51.100.7:15600");
    }

    #[test]
    fn test_peering_only_identity_has_no_gossip_record() {
        let identity = LocalIdentity::from_seed([5u8; SEED_LEN])
            .with_peering_service("198.51.100.7:14626")
            .build();
        assert!(identity.services().get(GOSSIP_SERVICE).is_none());
    }

    #[test]
    fn test_signatures_verify_with_the_public_key() {
        use ed25519_dalek::Verifier;

        let identity = LocalIdentity::from_seed([6u8; SEED_LEN]).build();
        let signature = identity.sign(b"peering-request");
        let verifying = identity.public_key().verifying_key().unwrap();
        assert!(verifying.verify(b"peering-request", &signature).is_ok());
    }
}
