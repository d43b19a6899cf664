//! UDP reachability probe.
//!
//! Sends a random nonce from the peering bind address to the advertised
//! address and waits for it to come back. A node that cannot echo its own
//! advertised endpoint is invisible to the rest of the network, so the
//! supervisor treats a failed probe as fatal.

use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use rand::RngCore;
use tokio::net::UdpSocket;
use tokio::time::{timeout_at, Instant};
use tracing::debug;

use crate::domain::ProbeError;
use crate::ports::ReachabilityProbe;

const NONCE_LEN: usize = 16;

/// How long the probe waits for its nonce to come back.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(1);

/// Probes the advertised peering endpoint over UDP.
///
/// The source address of the echoed datagram is deliberately not verified:
/// NAT rewrites it for most home and datacenter deployments. The source
/// port must match the advertised port, since a mismatch means the port
/// mapping is broken even though some path back exists.
#[derive(Debug, Clone, Copy)]
pub struct UdpReachabilityProbe {
    timeout: Duration,
}

impl UdpReachabilityProbe {
    #[must_use]
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for UdpReachabilityProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReachabilityProbe for UdpReachabilityProbe {
    async fn check(&self, local_bind: SocketAddr, advertised: SocketAddr) -> Result<(), ProbeError> {
        let socket = UdpSocket::bind(local_bind)
            .await
            .map_err(|source| ProbeError::Bind {
                addr: local_bind,
                source,
            })?;

        let mut nonce = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce);

        socket
            .send_to(&nonce, advertised)
            .await
            .map_err(|source| ProbeError::Send {
                addr: advertised,
                source,
            })?;

        let deadline = Instant::now() + self.timeout;
        let mut buf = [0u8; NONCE_LEN + 1];
        loop {
            let received = timeout_at(deadline, socket.recv_from(&mut buf))
                .await
                .map_err(|_| ProbeError::Timeout {
                    addr: advertised,
                    timeout_ms: self.timeout.as_millis() as u64,
                })?;
            let (len, from) = received.map_err(|source| ProbeError::Recv { source })?;

            // Unrelated traffic can land on the socket while we wait.
            if buf[..len] != nonce {
                debug!("ignoring {} stray bytes from {}", len, from);
                continue;
            }
            if from.port() != advertised.port() {
                return Err(ProbeError::PortMismatch {
                    expected: advertised.port(),
                    got: from.port(),
                });
            }
            return Ok(());
        }
    }
}

/// Probe that reports every endpoint as reachable.
///
/// For single-node development setups where no echo path exists.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpReachabilityProbe;

impl NoOpReachabilityProbe {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ReachabilityProbe for NoOpReachabilityProbe {
    async fn check(&self, _local_bind: SocketAddr, _advertised: SocketAddr) -> Result<(), ProbeError> {
        Ok(())
    }
}
