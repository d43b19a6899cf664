//! # Waggle Node Library
//!
//! This library exposes the internal modules of the node runtime for testing.
//! The main entry point is the `main.rs` binary.
//!
//! ## Modular Structure
//!
//! - `container` - Node configuration (file and environment)
//! - `wiring` - Assembly of the autopeering subsystem from settings
//! - `runtime` - The running node: startup, status, graceful shutdown

pub mod container;
pub mod runtime;
pub mod wiring;

pub use container::{ConfigError, NodeConfig};
pub use runtime::NodeRuntime;
