//! Domain Layer - Pure identity and peering rules with no I/O
//!
//! This module contains:
//! - Peer identity (public keys, derived short ids, advertised services)
//! - The local node identity and its service records
//! - The entry-node descriptor grammar
//! - Neighbor validation and address-family preference
//! - Lifecycle vocabulary and the error taxonomy

pub mod entities;
pub mod entry_nodes;
pub mod errors;
pub mod identity;
pub mod lifecycle;
pub mod service_set;
pub mod services;

pub use entities::*;
pub use entry_nodes::*;
pub use errors::*;
pub use identity::*;
pub use lifecycle::*;
pub use service_set::*;
pub use services::*;
