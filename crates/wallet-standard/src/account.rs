//! Read-only wallet account

use crate::identifier::IdentifierString;
use crate::wallet::WalletAccount;

/// An immutable snapshot of a wallet account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadonlyWalletAccount {
    address: String,
    public_key: Vec<u8>,
    chains: Vec<IdentifierString>,
    features: Vec<IdentifierString>,
    label: Option<String>,
    icon: Option<String>,
}

impl ReadonlyWalletAccount {
    pub fn new(
        address: impl Into<String>,
        public_key: Vec<u8>,
        chains: Vec<IdentifierString>,
        features: Vec<IdentifierString>,
    ) -> Self {
        Self {
            address: address.into(),
            public_key,
            chains,
            features,
            label: None,
            icon: None,
        }
    }

    /// Copy every property of another account
    pub fn from_account(account: &dyn WalletAccount) -> Self {
        Self {
            address: account.address().to_string(),
            public_key: account.public_key().to_vec(),
            chains: account.chains().to_vec(),
            features: account.features().to_vec(),
            label: account.label().map(str::to_string),
            icon: account.icon().map(str::to_string),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }
}

impl WalletAccount for ReadonlyWalletAccount {
    fn address(&self) -> &str {
        &self.address
    }

    fn public_key(&self) -> &[u8] {
        &self.public_key
    }

    fn chains(&self) -> &[IdentifierString] {
        &self.chains
    }

    fn features(&self) -> &[IdentifierString] {
        &self.features
    }

    fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }
}
