//! # wallet-ui-registry
//!
//! Indirection between discovered wallets and UI code:
//! - Opaque, identity-stable handles for wallets and accounts
//! - A non-owning handle to wallet association only this crate dereferences
//! - Cached read-only projections (`UiWallet`, `UiWalletAccount`)
//! - Feature lookup gated by wallet and account support

mod features;
mod handle;
mod projection;
mod registry;
mod table;
mod ui_registry;

pub use handle::UiWalletHandle;
pub use projection::{UiWallet, UiWalletAccount};
pub use registry::HandleRegistry;
pub use ui_registry::{storage_key, UiRegistry};

use std::sync::Arc;
use wallet_standard::{Feature, Result, Wallet};

/// Get or create the UI wrapper for `wallet` in the process-wide registry
pub fn get_or_create_ui_wallet(wallet: &Arc<dyn Wallet>) -> Arc<UiWallet> {
    UiRegistry::global().get_or_create_ui_wallet(wallet)
}

/// Get a wallet feature through a handle in the process-wide registry
pub fn get_wallet_feature(handle: &impl AsRef<UiWalletHandle>, feature_name: &str) -> Result<Feature> {
    UiRegistry::global().get_wallet_feature(handle, feature_name)
}

/// Get an account feature through the process-wide registry
pub fn get_wallet_account_feature(account: &UiWalletAccount, feature_name: &str) -> Result<Feature> {
    UiRegistry::global().get_wallet_account_feature(account, feature_name)
}
