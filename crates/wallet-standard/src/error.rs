//! Error types for the Wallet Standard core

use thiserror::Error;

use crate::identifier::IdentifierString;

/// Result type alias for Wallet Standard operations
pub type Result<T> = std::result::Result<T, WalletStandardError>;

/// Wallet Standard error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletStandardError {
    /// A second consumer tried to take over a discovery channel.
    #[error("Discovery channel already finalized - only one app may listen for wallet registrations")]
    ChannelAlreadyFinalized,

    /// The handle has no live association (never registered, removed, or its wallet was dropped).
    #[error("No underlying wallet found for handle - it may have been unregistered")]
    HandleNotFound,

    #[error(
        "Wallet \"{wallet_name}\" does not implement feature \"{feature_name}\" \
         (supported features: {supported_features:?}, supported chains: {supported_chains:?})"
    )]
    WalletFeatureUnimplemented {
        feature_name: IdentifierString,
        wallet_name: String,
        supported_chains: Vec<IdentifierString>,
        supported_features: Vec<IdentifierString>,
    },

    #[error(
        "Wallet account {address} does not implement feature \"{feature_name}\" \
         (supported features: {supported_features:?}, supported chains: {supported_chains:?})"
    )]
    WalletAccountFeatureUnimplemented {
        feature_name: IdentifierString,
        address: String,
        supported_chains: Vec<IdentifierString>,
        supported_features: Vec<IdentifierString>,
    },

    #[error("Wallet account {address} not found in wallet \"{wallet_name}\"")]
    WalletAccountNotFound { address: String, wallet_name: String },

    #[error("Wallet \"{wallet_name}\" implements Wallet Standard version {actual}, expected {expected}")]
    WalletVersionMismatch {
        wallet_name: String,
        expected: String,
        actual: String,
    },
}

impl WalletStandardError {
    /// Whether the caller can recover by dropping a stale reference or hiding a capability
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::ChannelAlreadyFinalized)
    }
}
