//! TOML-backed autopeering settings.
//!
//! Requires feature: `config`

use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::domain::{join_host_port, DEFAULT_PEERING_PORT};

/// Default TCP port for the gossip service.
pub const DEFAULT_GOSSIP_PORT: u16 = 15600;

/// Settings for one autopeering node.
///
/// Every field has a default, so an empty TOML document is a valid
/// configuration. Unknown entry node descriptors are kept as strings
/// here; parsing and resolution happen at startup.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AutopeeringSettings {
    /// Entry node descriptors, `<public-key>@<host>[:<port>]` each.
    pub entry_nodes: Vec<String>,
    /// Host or IP the peering socket binds on.
    pub bind_address: String,
    /// Host or IP other peers should reach this node at.
    pub advertised_address: String,
    /// UDP port for the peering service.
    pub peering_port: u16,
    /// Prefer IPv6 addresses when an entry node host resolves to both families.
    pub prefer_ipv6: bool,
    /// Whether this node carries the gossip service.
    pub gossip_enabled: bool,
    /// TCP port for the gossip service.
    pub gossip_port: u16,
    /// Base64 identity seed. A fresh identity is generated when absent.
    pub seed: Option<String>,
}

impl Default for AutopeeringSettings {
    fn default() -> Self {
        Self {
            entry_nodes: Vec::new(),
            bind_address: "0.0.0.0".to_string(),
            advertised_address: "127.0.0.1".to_string(),
            peering_port: DEFAULT_PEERING_PORT,
            prefer_ipv6: false,
            gossip_enabled: true,
            gossip_port: DEFAULT_GOSSIP_PORT,
            seed: None,
        }
    }
}

impl AutopeeringSettings {
    /// Parses settings from a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Parse`] when the document is not valid TOML
    /// or a field has the wrong type.
    pub fn parse(toml_str: &str) -> Result<Self, SettingsError> {
        toml::from_str(toml_str).map_err(|source| SettingsError::Parse { source })
    }

    /// Reads and parses settings from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Io`] when the file cannot be read and
    /// [`SettingsError::Parse`] when its contents are not valid TOML.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let contents = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents)
    }

    /// Advertised `host:port` for the peering service.
    #[must_use]
    pub fn advertised_peering_address(&self) -> String {
        join_host_port(&self.advertised_address, self.peering_port)
    }

    /// Advertised `host:port` for the gossip service.
    #[must_use]
    pub fn advertised_gossip_address(&self) -> String {
        join_host_port(&self.advertised_address, self.gossip_port)
    }
}

/// Failures while loading settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse settings")]
    Parse {
        #[source]
        source: toml::de::Error,
    },
}
