//! # Driving Ports (Inbound API)
//!
//! Surfaces this subsystem exposes to the host.

use crate::domain::SupervisorState;

/// Read-only status of an autopeering session.
///
/// Implemented by the session handle so host status endpoints can report
/// identity and lifecycle without owning the session.
pub trait PeeringStatus: Send + Sync {
    /// Current lifecycle state.
    fn state(&self) -> SupervisorState;

    /// Short node identifier (hex).
    fn node_id(&self) -> String;

    /// Full public key (base64).
    fn public_key(&self) -> String;
}
