//! # wallet-standard
//!
//! Shared contracts for the Wallet Standard:
//! - `Wallet` and `WalletAccount` traits consumed by discovery and UI code
//! - Feature maps keyed by namespaced identifiers
//! - Value helpers for wallets and accounts whose properties never change
//! - The error taxonomy shared by the discovery and registry crates

mod account;
mod error;
pub mod identifier;
mod wallet;

pub use account::ReadonlyWalletAccount;
pub use error::{Result, WalletStandardError};
pub use identifier::{IdentifierString, WALLET_STANDARD_VERSION};
pub use wallet::{same_account, same_wallet, Feature, FeatureMap, StaticWallet, Wallet, WalletAccount};
