//! Load-order scenarios
//!
//! A scenario is the order in which wallet scripts and the app script run on
//! a page, written as JSON:
//!
//! ```json
//! { "steps": [
//!     { "type": "registerWallet", "wallet": { "name": "Mock Wallet" } },
//!     { "type": "attachApp" },
//!     { "type": "unregisterWallet", "name": "Mock Wallet" }
//! ] }
//! ```

use indexmap::IndexMap;
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use wallet_standard::{ReadonlyWalletAccount, StaticWallet, WALLET_STANDARD_VERSION};

/// Scenario errors
#[derive(Error, Debug)]
pub enum ScenarioError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid scenario: {0}")]
    InvalidScenario(#[from] serde_json::Error),

    #[error("Registry error: {0}")]
    Registry(#[from] wallet_standard::WalletStandardError),

    #[error("Invalid public key for account {address}: {source}")]
    InvalidPublicKey {
        address: String,
        source: hex::FromHexError,
    },
}

/// Scenario used when none is given on the command line
const BUILTIN_SCENARIO: &str = r#"{
  "steps": [
    {
      "type": "registerWallet",
      "wallet": {
        "name": "Mock:Wallet",
        "icon": "data:image/svg+xml;base64,PHN2Zy8+",
        "chains": ["solana:mainnet", "solana:devnet"],
        "features": {
          "standard:connect": { "version": "1.0.0" },
          "standard:events": { "version": "1.0.0" },
          "solana:signMessage": { "version": "1.0.0" }
        },
        "accounts": [
          {
            "address": "abc",
            "publicKey": "0102030405060708",
            "chains": ["solana:mainnet"],
            "features": ["standard:connect", "solana:signMessage"],
            "label": "Main"
          },
          {
            "address": "def",
            "publicKey": "0a0b0c0d",
            "chains": ["solana:mainnet"],
            "features": ["standard:connect"],
            "label": "Hardware"
          }
        ]
      }
    },
    {
      "type": "registerWallet",
      "wallet": { "name": "Legacy Wallet", "version": "0.9.0" }
    },
    { "type": "attachApp" },
    {
      "type": "registerWallet",
      "wallet": {
        "name": "Late Wallet",
        "chains": ["solana:mainnet"],
        "features": { "standard:connect": { "version": "1.0.0" } }
      }
    },
    { "type": "attachApp" }
  ]
}"#;

/// An ordered list of page events
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub steps: Vec<Step>,
}

impl Scenario {
    pub fn builtin() -> Result<Self, ScenarioError> {
        Ok(serde_json::from_str(BUILTIN_SCENARIO)?)
    }

    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }
}

/// One page event
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Step {
    /// A wallet script runs and pushes its registration
    RegisterWallet { wallet: WalletDescriptor },
    /// The app script runs and starts listening
    AttachApp,
    /// A wallet calls the unregister handle it received for a registration
    UnregisterWallet { name: String },
}

/// Properties of a wallet in a scenario
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletDescriptor {
    pub name: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub chains: Vec<String>,
    /// Feature payloads are kept as raw JSON
    #[serde(default)]
    pub features: IndexMap<String, serde_json::Value>,
    #[serde(default)]
    pub accounts: Vec<AccountDescriptor>,
}

fn default_version() -> String {
    WALLET_STANDARD_VERSION.to_string()
}

impl WalletDescriptor {
    pub fn build(&self) -> Result<StaticWallet, ScenarioError> {
        let mut wallet = StaticWallet::new(&self.name, &self.icon).with_version(&self.version);

        for chain in &self.chains {
            wallet = wallet.with_chain(chain);
        }
        for (name, payload) in &self.features {
            wallet = wallet.with_feature(name, Arc::new(payload.clone()));
        }
        for account in &self.accounts {
            wallet = wallet.with_account(Arc::new(account.build()?));
        }

        Ok(wallet)
    }
}

/// Properties of an account in a scenario
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountDescriptor {
    pub address: String,
    /// Hex-encoded public key
    #[serde(default)]
    pub public_key: String,
    #[serde(default)]
    pub chains: Vec<String>,
    #[serde(default)]
    pub features: Vec<String>,
    pub label: Option<String>,
    pub icon: Option<String>,
}

impl AccountDescriptor {
    pub fn build(&self) -> Result<ReadonlyWalletAccount, ScenarioError> {
        let public_key =
            hex::decode(&self.public_key).map_err(|source| ScenarioError::InvalidPublicKey {
                address: self.address.clone(),
                source,
            })?;

        let mut account = ReadonlyWalletAccount::new(
            &self.address,
            public_key,
            self.chains.clone(),
            self.features.clone(),
        );
        if let Some(label) = &self.label {
            account = account.with_label(label);
        }
        if let Some(icon) = &self.icon {
            account = account.with_icon(icon);
        }
        Ok(account)
    }
}
