//! Error taxonomy for the autopeering subsystem.
//!
//! Configuration-shaped errors ([`EntryNodeError`], [`IdentityError`])
//! are plain values the host may log and survive. [`StartupError`] is
//! fatal by contract: the host logs it and terminates instead of
//! retrying. Neighbor-validation rejections are no error at all.

use std::io;
use std::net::SocketAddr;

use thiserror::Error;

/// Errors decoding a public key from text.
#[derive(Debug, Error)]
pub enum PublicKeyError {
    /// The text is not valid standard base64.
    #[error("malformed base64: {0}")]
    Base64(#[from] base64::DecodeError),
    /// The decoded key has the wrong length.
    #[error("public key must be 32 bytes, got {len}")]
    Length { len: usize },
    /// The bytes are not a valid Ed25519 key.
    #[error("not a valid Ed25519 public key")]
    InvalidKey {
        #[source]
        source: ed25519_dalek::SignatureError,
    },
}

/// Errors building the local identity.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// The configured seed is not valid base64.
    #[error("identity seed is not valid base64")]
    MalformedSeed {
        #[source]
        source: base64::DecodeError,
    },
    /// The decoded seed has the wrong length.
    #[error("identity seed must be 32 bytes, got {len}")]
    SeedLength { len: usize },
}

/// Errors parsing and resolving an entry-node descriptor list.
///
/// The first bad descriptor aborts the whole parse; empty strings are
/// skipped and never reach these variants.
#[derive(Debug, Error)]
pub enum EntryNodeError {
    /// The descriptor did not split into key and address around `@`.
    #[error(
        "entry node `{descriptor}` must have the form \
         <public-key>@<host>[:<port>], found {parts} part(s)"
    )]
    InvalidFormat { descriptor: String, parts: usize },
    /// The public-key segment did not decode.
    #[error("entry node public key is invalid")]
    InvalidPublicKey {
        #[source]
        source: PublicKeyError,
    },
    /// The address segment did not split into host and optional port.
    #[error("entry node address `{address}` is invalid")]
    InvalidAddress { address: String },
    /// The host did not resolve to any IP address.
    #[error("entry node host `{host}` did not resolve")]
    HostResolution {
        host: String,
        #[source]
        source: ResolveError,
    },
}

/// Errors from host name resolution.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The resolver itself failed.
    #[error("lookup of `{host}` failed")]
    Lookup {
        host: String,
        #[source]
        source: io::Error,
    },
    /// Resolution succeeded but produced no addresses.
    #[error("lookup of `{host}` returned no addresses")]
    NoAddresses { host: String },
}

/// Errors from the reachability probe.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The probe socket could not be bound locally.
    #[error("probe socket bind on {addr} failed")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
    /// Sending the probe datagram failed.
    #[error("probe send to {addr} failed")]
    Send {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
    /// Reading from the probe socket failed.
    #[error("probe receive failed")]
    Recv {
        #[source]
        source: io::Error,
    },
    /// No echo arrived before the deadline.
    #[error("no response from {addr} within {timeout_ms} ms")]
    Timeout { addr: SocketAddr, timeout_ms: u64 },
    /// The echo arrived from an unexpected source port.
    #[error("response arrived from port {got}, expected {expected}")]
    PortMismatch { expected: u16, got: u16 },
}

/// Errors from the peering transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Binding the socket failed, e.g. the port is taken.
    #[error("bind on {addr} failed")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
    /// The transport was used after close.
    #[error("transport is closed")]
    Closed,
    /// A socket operation failed.
    #[error("transport i/o failed")]
    Io {
        #[source]
        source: io::Error,
    },
}

/// Fatal errors raised while bringing the subsystem up.
///
/// Returned to the host, which logs and terminates; there is no
/// in-process retry path.
#[derive(Debug, Error)]
pub enum StartupError {
    /// The local identity advertises no peering service.
    #[error("local identity advertises no peering service")]
    MissingPeeringService,
    /// The local peering endpoint is not a `host:port` string.
    #[error("local peering endpoint `{address}` is not host:port")]
    MalformedPeeringEndpoint { address: String },
    /// The configured bind host did not resolve.
    #[error("bind host `{host}` did not resolve")]
    BindAddress {
        host: String,
        #[source]
        source: ResolveError,
    },
    /// The advertised peering address did not resolve.
    #[error("advertised peering address `{address}` did not resolve")]
    AdvertisedAddress {
        address: String,
        #[source]
        source: ResolveError,
    },
    /// The reachability self-test failed.
    #[error("the node must be publicly reachable at {address}/{network}")]
    Unreachable {
        address: String,
        network: String,
        #[source]
        source: ProbeError,
    },
    /// Binding the peering transport failed.
    #[error("listening on {addr} failed")]
    Listen {
        addr: SocketAddr,
        #[source]
        source: TransportError,
    },
}
