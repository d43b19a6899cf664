//! # Node Configuration
//!
//! Unified configuration for the node runtime, read from an optional TOML
//! file and overridden by environment variables.
//!
//! A broken or missing configuration file is not fatal: the node logs the
//! problem and comes up on defaults. Startup failures are reserved for
//! conditions that leave the node unable to serve at all.

use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use waggle_autopeering::AutopeeringSettings;

/// Complete node configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Human-readable node name, for log banners only.
    pub name: String,
    /// Autopeering subsystem settings.
    pub autopeering: AutopeeringSettings,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            name: "waggle-node".to_string(),
            autopeering: AutopeeringSettings::default(),
        }
    }
}

impl NodeConfig {
    /// Parses a configuration from a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the document is not valid TOML
    /// or a field has the wrong type.
    pub fn parse(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|source| ConfigError::Parse { source })
    }

    /// Reads and parses a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the file cannot be read and
    /// [`ConfigError::Parse`] when its contents are not valid TOML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents)
    }

    /// Loads configuration from `WAGGLE_CONFIG` (if set) and the environment.
    ///
    /// An unreadable or malformed file downgrades to defaults with a
    /// warning. Environment variables win over the file:
    ///
    /// - `WAGGLE_NODE_NAME` - node name
    /// - `WAGGLE_ENTRY_NODES` - comma-separated entry node descriptors
    /// - `WAGGLE_BIND_ADDRESS` - peering bind host
    /// - `WAGGLE_ADVERTISED_ADDRESS` - advertised host
    /// - `WAGGLE_PEERING_PORT` - peering UDP port
    /// - `WAGGLE_SEED` - base64 identity seed
    pub fn load() -> Self {
        let mut config = match std::env::var("WAGGLE_CONFIG") {
            Ok(path) => match Self::from_file(Path::new(&path)) {
                Ok(config) => {
                    info!("Loaded configuration from {}", path);
                    config
                }
                Err(e) => {
                    warn!("Failed to load {}: {}; using defaults", path, e);
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        };

        if let Ok(name) = std::env::var("WAGGLE_NODE_NAME") {
            config.name = name;
        }
        if let Ok(nodes) = std::env::var("WAGGLE_ENTRY_NODES") {
            config.autopeering.entry_nodes = nodes.split(',').map(str::to_string).collect();
        }
        if let Ok(host) = std::env::var("WAGGLE_BIND_ADDRESS") {
            config.autopeering.bind_address = host;
        }
        if let Ok(host) = std::env::var("WAGGLE_ADVERTISED_ADDRESS") {
            config.autopeering.advertised_address = host;
        }
        if let Ok(port) = std::env::var("WAGGLE_PEERING_PORT") {
            if let Ok(p) = port.parse() {
                config.autopeering.peering_port = p;
            }
        }
        if let Ok(seed) = std::env::var("WAGGLE_SEED") {
            config.autopeering.seed = Some(seed);
        }

        config
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The configuration file is not valid TOML.
    #[error("failed to parse configuration")]
    Parse {
        #[source]
        source: toml::de::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = NodeConfig::default();
        assert_eq!(config.name, "waggle-node");
        assert!(config.autopeering.entry_nodes.is_empty());
        assert!(config.autopeering.gossip_enabled);
    }

    #[test]
    fn test_parse_overrides_defaults() {
        let toml_str = r#"
            name = "relay-a"

            [autopeering]
            entry_nodes = ["key@entry.example.org:14626"]
            peering_port = 24626
            gossip_enabled = false
        "#;

        let config = NodeConfig::parse(toml_str).unwrap();
        assert_eq!(config.name, "relay-a");
        assert_eq!(config.autopeering.peering_port, 24626);
        assert!(!config.autopeering.gossip_enabled);
        assert_eq!(
            config.autopeering.entry_nodes,
            vec!["key@entry.example.org:14626"]
        );
        // Untouched fields keep their defaults.
        assert_eq!(config.autopeering.bind_address, "0.0.0.0");
    }

    #[test]
    fn test_parse_rejects_bad_toml() {
        let err = NodeConfig::parse("name = [").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }), "got {err:?}");
    }
}
