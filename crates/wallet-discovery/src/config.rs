//! Discovery configuration
//!
//! Stored as a plain camelCase JSON file. Every field has a default, so a
//! missing file or a partial file is valid.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

use wallet_standard::WALLET_STANDARD_VERSION;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Settings for the app-side wallet registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DiscoveryConfig {
    /// Wallet Standard version accepted from registering wallets
    pub supported_version: String,
    /// Skip wallets whose version differs from `supported_version`
    pub enforce_version: bool,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            supported_version: WALLET_STANDARD_VERSION.to_string(),
            enforce_version: true,
        }
    }
}

impl DiscoveryConfig {
    /// Load configuration from a JSON file, using defaults if it does not exist
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!("No discovery config at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        debug!("Loaded discovery config from {:?}", path);
        Ok(config)
    }
}
