//! Read-only UI projections of wallets and accounts

use serde::{Serialize, Serializer};
use std::sync::Arc;

use super::handle::UiWalletHandle;
use wallet_standard::{IdentifierString, Wallet, WalletAccount};

/// The UI-safe view of a wallet
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UiWallet {
    #[serde(skip)]
    handle: UiWalletHandle,
    name: String,
    icon: String,
    version: String,
    chains: Vec<IdentifierString>,
    features: Vec<IdentifierString>,
    accounts: Vec<Arc<UiWalletAccount>>,
}

impl UiWallet {
    pub(crate) fn project(
        wallet: &dyn Wallet,
        handle: UiWalletHandle,
        accounts: Vec<Arc<UiWalletAccount>>,
    ) -> Self {
        Self {
            handle,
            name: wallet.name().to_string(),
            icon: wallet.icon().to_string(),
            version: wallet.version().to_string(),
            chains: wallet.chains(),
            features: wallet.features().keys().cloned().collect(),
            accounts,
        }
    }

    /// Whether this projection still matches `wallet`, whose accounts are
    /// now wrapped by `accounts`
    pub(crate) fn is_current(&self, wallet: &dyn Wallet, accounts: &[Arc<UiWalletAccount>]) -> bool {
        self.name == wallet.name()
            && self.icon == wallet.icon()
            && self.version == wallet.version()
            && self.chains == wallet.chains()
            && self.features.iter().eq(wallet.features().keys())
            && self.accounts.len() == accounts.len()
            && self.accounts.iter().zip(accounts).all(|(a, b)| Arc::ptr_eq(a, b))
    }

    pub fn handle(&self) -> &UiWalletHandle {
        &self.handle
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn icon(&self) -> &str {
        &self.icon
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn chains(&self) -> &[IdentifierString] {
        &self.chains
    }

    pub fn features(&self) -> &[IdentifierString] {
        &self.features
    }

    pub fn accounts(&self) -> &[Arc<UiWalletAccount>] {
        &self.accounts
    }
}

impl AsRef<UiWalletHandle> for UiWallet {
    fn as_ref(&self) -> &UiWalletHandle {
        &self.handle
    }
}

/// The UI-safe view of a wallet account.
///
/// Its handle resolves to the account's owning wallet.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UiWalletAccount {
    #[serde(skip)]
    handle: UiWalletHandle,
    address: String,
    #[serde(serialize_with = "serialize_hex")]
    public_key: Vec<u8>,
    chains: Vec<IdentifierString>,
    features: Vec<IdentifierString>,
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    icon: Option<String>,
}

impl UiWalletAccount {
    pub(crate) fn project(account: &dyn WalletAccount, handle: UiWalletHandle) -> Self {
        Self {
            handle,
            address: account.address().to_string(),
            public_key: account.public_key().to_vec(),
            chains: account.chains().to_vec(),
            features: account.features().to_vec(),
            label: account.label().map(str::to_string),
            icon: account.icon().map(str::to_string),
        }
    }

    /// Whether this projection still matches `account`
    pub(crate) fn is_current(&self, account: &dyn WalletAccount) -> bool {
        self.address == account.address()
            && self.public_key == account.public_key()
            && self.chains == account.chains()
            && self.features == account.features()
            && self.label.as_deref() == account.label()
            && self.icon.as_deref() == account.icon()
    }

    pub fn handle(&self) -> &UiWalletHandle {
        &self.handle
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn public_key(&self) -> &[u8] {
        &self.public_key
    }

    pub fn chains(&self) -> &[IdentifierString] {
        &self.chains
    }

    pub fn features(&self) -> &[IdentifierString] {
        &self.features
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }
}

impl AsRef<UiWalletHandle> for UiWalletAccount {
    fn as_ref(&self) -> &UiWalletHandle {
        &self.handle
    }
}

fn serialize_hex<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&hex::encode(bytes))
}
