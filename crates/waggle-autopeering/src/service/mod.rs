//! # Autopeering Service Layer
//!
//! Wires the domain rules to the ports: building the bootstrap peer
//! list from entry-node descriptors, and driving the supervised
//! start/serve/shutdown lifecycle around the injected protocol engines.

mod entry_nodes;
mod session;
mod supervisor;

pub use entry_nodes::parse_entry_nodes;
pub use session::{AutopeeringSession, SessionHandle};
pub use supervisor::{AutopeeringSupervisor, AutopeeringSupervisorBuilder, DEFAULT_BIND_HOST};
