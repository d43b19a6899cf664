//! No-op discovery and selection engines.
//!
//! Real engines are injected through the protocol ports. These stand-ins
//! let a node run the full autopeering lifecycle without one, which is
//! what integration tests and single-node setups need.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::debug;

use crate::domain::Peer;
use crate::ports::{DiscoveryProtocol, NeighborValidator, PeeringServer, SelectionProtocol};

/// Discovery engine that holds its master peers and does nothing else.
#[derive(Debug, Default)]
pub struct NoOpDiscoveryProtocol {
    master_peers: Vec<Peer>,
    running: AtomicBool,
}

impl NoOpDiscoveryProtocol {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_master_peers(mut self, master_peers: Vec<Peer>) -> Self {
        self.master_peers = master_peers;
        self
    }

    pub fn master_peers(&self) -> &[Peer] {
        &self.master_peers
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

impl DiscoveryProtocol for NoOpDiscoveryProtocol {
    fn start(&self, server: Arc<PeeringServer>) {
        self.running.store(true, Ordering::Release);
        debug!(
            "no-op discovery started on {} with {} master peers",
            server.local_addr(),
            self.master_peers.len()
        );
    }

    fn close(&self) {
        self.running.store(false, Ordering::Release);
        debug!("no-op discovery closed");
    }
}

/// Selection engine that validates candidates but never peers with them.
pub struct NoOpSelectionProtocol {
    validator: NeighborValidator,
    running: AtomicBool,
}

impl NoOpSelectionProtocol {
    #[must_use]
    pub fn new(validator: NeighborValidator) -> Self {
        Self {
            validator,
            running: AtomicBool::new(false),
        }
    }

    /// Runs a candidate through the injected neighbor filter.
    pub fn is_valid(&self, candidate: &Peer) -> bool {
        (self.validator)(candidate)
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

impl SelectionProtocol for NoOpSelectionProtocol {
    fn start(&self, server: Arc<PeeringServer>) {
        self.running.store(true, Ordering::Release);
        debug!("no-op selection started on {}", server.local_addr());
    }

    fn close(&self) {
        self.running.store(false, Ordering::Release);
        debug!("no-op selection closed");
    }
}
