//! Feature lookup through UI handles
//!
//! A wallet may expose a feature globally while only some of its accounts
//! support it, so account lookups check the account's own feature list
//! before consulting the wallet.

use tracing::debug;

use super::handle::UiWalletHandle;
use super::projection::UiWalletAccount;
use super::ui_registry::UiRegistry;
use wallet_standard::{Feature, Result, WalletStandardError};

impl UiRegistry {
    /// Get a feature object from the wallet behind `handle`.
    ///
    /// The payload is returned unchanged; callers downcast it to the type
    /// defined for `feature_name`.
    pub fn get_wallet_feature(
        &self,
        handle: &impl AsRef<UiWalletHandle>,
        feature_name: &str,
    ) -> Result<Feature> {
        let wallet = self.resolve_handle(handle)?;
        let features = wallet.features();

        match features.get(feature_name) {
            Some(feature) => Ok(feature.clone()),
            None => {
                debug!(
                    "Wallet \"{}\" lacks feature {}",
                    wallet.name(),
                    feature_name
                );
                Err(WalletStandardError::WalletFeatureUnimplemented {
                    feature_name: feature_name.to_string(),
                    wallet_name: wallet.name().to_string(),
                    supported_chains: wallet.chains(),
                    supported_features: features.keys().cloned().collect(),
                })
            }
        }
    }

    /// Get a feature object for an account, checking the account supports it first
    pub fn get_wallet_account_feature(
        &self,
        account: &UiWalletAccount,
        feature_name: &str,
    ) -> Result<Feature> {
        if !account.features().iter().any(|f| f == feature_name) {
            debug!("Account {} lacks feature {}", account.address(), feature_name);
            return Err(WalletStandardError::WalletAccountFeatureUnimplemented {
                feature_name: feature_name.to_string(),
                address: account.address().to_string(),
                supported_chains: account.chains().to_vec(),
                supported_features: account.features().to_vec(),
            });
        }

        self.get_wallet_feature(account, feature_name)
    }
}
