//! The running session and its teardown discipline.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;

use crate::domain::SupervisorState;
use crate::ports::{
    DiscoveryProtocol, PeeringServer, PeeringStatus, SelectionProtocol, ServerTransport,
};

/// A live autopeering session.
///
/// Owns every resource acquired during startup. Teardown runs exactly
/// once, in strict reverse acquisition order: selection, discovery,
/// server, transport. `run_until_shutdown` tears down after the
/// shutdown signal fires; dropping the session without ever awaiting
/// the signal tears down too, so no exit path leaks a socket or a
/// running engine.
pub struct AutopeeringSession {
    discovery: Arc<dyn DiscoveryProtocol>,
    selection: Option<Arc<dyn SelectionProtocol>>,
    server: Arc<PeeringServer>,
    transport: Arc<dyn ServerTransport>,
    node_id: String,
    public_key: String,
    state_tx: watch::Sender<SupervisorState>,
    torn_down: AtomicBool,
}

impl fmt::Debug for AutopeeringSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AutopeeringSession")
            .field("node_id", &self.node_id)
            .field("public_key", &self.public_key)
            .field("torn_down", &self.torn_down)
            .finish_non_exhaustive()
    }
}

impl AutopeeringSession {
    pub(crate) fn new(
        discovery: Arc<dyn DiscoveryProtocol>,
        selection: Option<Arc<dyn SelectionProtocol>>,
        server: Arc<PeeringServer>,
        transport: Arc<dyn ServerTransport>,
        node_id: String,
        public_key: String,
        state_tx: watch::Sender<SupervisorState>,
    ) -> Self {
        Self {
            discovery,
            selection,
            server,
            transport,
            node_id,
            public_key,
            state_tx,
            torn_down: AtomicBool::new(false),
        }
    }

    /// Short node identifier (hex) of the local peer.
    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    /// Base64 public key of the local peer.
    pub fn public_key(&self) -> &str {
        &self.public_key
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SupervisorState {
        *self.state_tx.borrow()
    }

    /// Observe lifecycle transitions.
    pub fn subscribe_state(&self) -> watch::Receiver<SupervisorState> {
        self.state_tx.subscribe()
    }

    /// Cheap cloneable view for host status surfaces.
    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            node_id: self.node_id.clone(),
            public_key: self.public_key.clone(),
            state_rx: self.state_tx.subscribe(),
        }
    }

    /// Park until `shutdown` fires, then tear the session down.
    ///
    /// The wait burns no CPU. A closed channel counts as a signal, so a
    /// host that drops its sender still gets a clean stop.
    pub async fn run_until_shutdown(self, mut shutdown: watch::Receiver<bool>) {
        loop {
            if *shutdown.borrow_and_update() {
                break;
            }
            if shutdown.changed().await.is_err() {
                break;
            }
        }
        self.teardown();
    }

    /// Release everything, exactly once.
    fn teardown(&self) {
        if self.torn_down.swap(true, Ordering::AcqRel) {
            return;
        }
        info!("Stopping autopeering ...");
        self.state_tx.send_replace(SupervisorState::ShuttingDown);

        if let Some(selection) = &self.selection {
            selection.close();
        }
        self.discovery.close();
        self.server.close();
        self.transport.close();

        self.state_tx.send_replace(SupervisorState::Stopped);
        info!("Stopping autopeering ... done");
    }
}

impl Drop for AutopeeringSession {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Cloneable status view of a session.
///
/// Stays valid after the session itself is gone; it then reports the
/// last state reached (normally [`SupervisorState::Stopped`]).
#[derive(Debug, Clone)]
pub struct SessionHandle {
    node_id: String,
    public_key: String,
    state_rx: watch::Receiver<SupervisorState>,
}

impl SessionHandle {
    /// Current lifecycle state.
    pub fn state(&self) -> SupervisorState {
        *self.state_rx.borrow()
    }

    /// Short node identifier (hex).
    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    /// Full public key (base64).
    pub fn public_key(&self) -> &str {
        &self.public_key
    }
}

impl PeeringStatus for SessionHandle {
    fn state(&self) -> SupervisorState {
        SessionHandle::state(self)
    }

    fn node_id(&self) -> String {
        self.node_id.clone()
    }

    fn public_key(&self) -> String {
        self.public_key.clone()
    }
}
