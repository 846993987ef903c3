//! Noise filter configuration.
//!
//! The built-in defaults describe a stock realm export. A TOML file can
//! override any of the three lists; omitted keys keep their defaults:
//!
//! ```toml
//! excluded_top_level_fields = ["users", "authenticationFlows"]
//! reserved_client_id = "security-admin-console"
//! excluded_client_fields = ["redirectUris", "baseUrl"]
//! ```

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

const EXCLUDED_TOP_LEVEL_FIELDS: &[&str] = &[
    "authenticatorConfig",
    "authenticationFlows",
    "adminEventsEnabled",
    "eventsEnabled",
    "eventsExpiration",
    "enabledEventTypes",
    "users",
];

const RESERVED_CLIENT_ID: &str = "security-admin-console";

const EXCLUDED_CLIENT_FIELDS: &[&str] =
    &["authorizationSettings", "redirectUris", "baseUrl", "adminUrl"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read noise config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid noise config: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Which fields [`crate::noise::filter_noise`] strips before diffing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NoiseFilterConfig {
    /// Root fields removed outright (flows, event settings, users, ...).
    pub excluded_top_level_fields: BTreeSet<String>,
    /// `clientId` of the client dropped from the `clients` collection.
    pub reserved_client_id: String,
    /// Fields removed from every remaining client.
    pub excluded_client_fields: BTreeSet<String>,
}

impl Default for NoiseFilterConfig {
    fn default() -> Self {
        Self {
            excluded_top_level_fields: EXCLUDED_TOP_LEVEL_FIELDS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            reserved_client_id: RESERVED_CLIENT_ID.to_string(),
            excluded_client_fields: EXCLUDED_CLIENT_FIELDS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl NoiseFilterConfig {
    pub fn from_toml_str(src: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(src)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let src = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&src)?;
        tracing::debug!(path = %path.display(), "loaded noise config");
        Ok(config)
    }
}
