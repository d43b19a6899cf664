//! Core identity entities for the autopeering overlay.

use std::fmt;
use std::hash::{Hash, Hasher};

use base64::{engine::general_purpose, Engine as _};
use sha2::{Digest, Sha256};

use super::errors::PublicKeyError;
use super::service_set::ServiceSet;

/// Number of bytes in an Ed25519 public key.
pub const PUBLIC_KEY_LEN: usize = 32;

/// Number of bytes in a short peer identifier.
pub const PEER_ID_LEN: usize = 8;

/// Ed25519 public key identifying a peer.
///
/// Keys travel as standard base64 in entry-node descriptors, settings and
/// logs. Equality and hashing are over the raw key bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PublicKey([u8; PUBLIC_KEY_LEN]);

impl PublicKey {
    /// Create a public key from raw bytes.
    pub fn new(bytes: [u8; PUBLIC_KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Decode a public key from its standard base64 text form.
    ///
    /// # Errors
    ///
    /// Fails when the input is not valid base64 or does not decode to
    /// exactly [`PUBLIC_KEY_LEN`] bytes.
    pub fn from_base64(text: &str) -> Result<Self, PublicKeyError> {
        let bytes = general_purpose::STANDARD.decode(text)?;
        let bytes: [u8; PUBLIC_KEY_LEN] = bytes
            .try_into()
            .map_err(|rejected: Vec<u8>| PublicKeyError::Length {
                len: rejected.len(),
            })?;
        Ok(Self(bytes))
    }

    /// Standard base64 text form of the key.
    pub fn to_base64(&self) -> String {
        general_purpose::STANDARD.encode(self.0)
    }

    /// Get the underlying key bytes.
    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_LEN] {
        &self.0
    }

    /// View the key as an Ed25519 verifying key.
    ///
    /// # Errors
    ///
    /// Fails when the bytes are not a valid curve point.
    pub fn verifying_key(&self) -> Result<ed25519_dalek::VerifyingKey, PublicKeyError> {
        ed25519_dalek::VerifyingKey::from_bytes(&self.0)
            .map_err(|source| PublicKeyError::InvalidKey { source })
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base64())
    }
}

impl AsRef<[u8]> for PublicKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Short peer identifier: the first [`PEER_ID_LEN`] bytes of
/// SHA-256(public key), shown as lowercase hex.
///
/// Log- and status-facing only; the full key stays authoritative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PeerId([u8; PEER_ID_LEN]);

impl PeerId {
    /// Derive the identifier from a public key.
    pub fn from_public_key(key: &PublicKey) -> Self {
        let digest = Sha256::digest(key.as_bytes());
        let mut id = [0u8; PEER_ID_LEN];
        id.copy_from_slice(&digest[..PEER_ID_LEN]);
        Self(id)
    }

    /// Get the underlying identifier bytes.
    pub fn as_bytes(&self) -> &[u8; PEER_ID_LEN] {
        &self.0
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// A peer of the overlay: public key plus advertised services.
///
/// Immutable once constructed. Two peers are equal iff their public keys
/// are equal; the service set never participates in equality or hashing,
/// so a peer re-announcing itself with changed addresses is still the
/// same peer.
#[derive(Debug, Clone)]
pub struct Peer {
    public_key: PublicKey,
    services: ServiceSet,
}

impl Peer {
    /// Create a peer from its key and advertised services.
    pub fn new(public_key: PublicKey, services: ServiceSet) -> Self {
        Self {
            public_key,
            services,
        }
    }

    /// The peer's public key.
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// The peer's advertised services.
    pub fn services(&self) -> &ServiceSet {
        &self.services
    }

    /// Short identifier derived from the public key.
    pub fn id(&self) -> PeerId {
        PeerId::from_public_key(&self.public_key)
    }
}

impl PartialEq for Peer {
    fn eq(&self, other: &Self) -> bool {
        self.public_key == other.public_key
    }
}

impl Eq for Peer {}

// Hash must follow eq: key bytes only, services excluded.
impl Hash for Peer {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.public_key.hash(state);
    }
}

impl fmt::Display for Peer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}
