//! Wallet and account contracts

use indexmap::IndexMap;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::identifier::{IdentifierString, WALLET_STANDARD_VERSION};

/// A capability-specific feature object.
///
/// The core never inspects feature payloads; consumers downcast to the
/// concrete type they expect for a given identifier.
pub type Feature = Arc<dyn Any + Send + Sync>;

/// Features keyed by namespaced identifier, in declaration order
pub type FeatureMap = IndexMap<IdentifierString, Feature>;

/// A wallet provider discovered through the discovery channel.
///
/// Identity is `Arc` pointer identity: a wallet whose properties change is
/// expected to either mutate behind this trait or be replaced by a new object.
pub trait Wallet: Send + Sync {
    /// Wallet Standard version implemented by the wallet
    fn version(&self) -> &str;

    /// Human-readable name
    fn name(&self) -> &str;

    /// Data URI of the wallet icon
    fn icon(&self) -> &str;

    /// Chains supported by the wallet
    fn chains(&self) -> Vec<IdentifierString>;

    /// Features supported by the wallet
    fn features(&self) -> FeatureMap;

    /// Accounts the app has been authorized to use
    fn accounts(&self) -> Vec<Arc<dyn WalletAccount>>;
}

/// An account belonging to a wallet.
pub trait WalletAccount: Send + Sync {
    /// Address of the account, opaque to the core
    fn address(&self) -> &str;

    /// Raw public key bytes
    fn public_key(&self) -> &[u8];

    /// Subset of the wallet's chains supported by this account
    fn chains(&self) -> &[IdentifierString];

    /// Subset of the wallet's features supported by this account
    fn features(&self) -> &[IdentifierString];

    fn label(&self) -> Option<&str> {
        None
    }

    fn icon(&self) -> Option<&str> {
        None
    }
}

impl fmt::Debug for dyn Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet")
            .field("name", &self.name())
            .field("version", &self.version())
            .field("chains", &self.chains())
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for dyn WalletAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletAccount")
            .field("address", &self.address())
            .field("chains", &self.chains())
            .field("features", &self.features())
            .finish_non_exhaustive()
    }
}

/// Whether two wallet references point at the same wallet object
pub fn same_wallet(a: &Arc<dyn Wallet>, b: &Arc<dyn Wallet>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

/// Whether two account references point at the same account object
pub fn same_account(a: &Arc<dyn WalletAccount>, b: &Arc<dyn WalletAccount>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

/// A wallet whose properties are fixed at construction
#[derive(Clone)]
pub struct StaticWallet {
    version: String,
    name: String,
    icon: String,
    chains: Vec<IdentifierString>,
    features: FeatureMap,
    accounts: Vec<Arc<dyn WalletAccount>>,
}

impl StaticWallet {
    /// Create a wallet implementing the current standard version with no chains, features or accounts
    pub fn new(name: impl Into<String>, icon: impl Into<String>) -> Self {
        Self {
            version: WALLET_STANDARD_VERSION.to_string(),
            name: name.into(),
            icon: icon.into(),
            chains: Vec::new(),
            features: FeatureMap::new(),
            accounts: Vec::new(),
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_chain(mut self, chain: impl Into<IdentifierString>) -> Self {
        self.chains.push(chain.into());
        self
    }

    /// Add a feature; re-adding an identifier replaces its payload
    pub fn with_feature(mut self, name: impl Into<IdentifierString>, feature: Feature) -> Self {
        self.features.insert(name.into(), feature);
        self
    }

    pub fn with_account(mut self, account: Arc<dyn WalletAccount>) -> Self {
        self.accounts.push(account);
        self
    }
}

impl Wallet for StaticWallet {
    fn version(&self) -> &str {
        &self.version
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn icon(&self) -> &str {
        &self.icon
    }

    fn chains(&self) -> Vec<IdentifierString> {
        self.chains.clone()
    }

    fn features(&self) -> FeatureMap {
        self.features.clone()
    }

    fn accounts(&self) -> Vec<Arc<dyn WalletAccount>> {
        self.accounts.clone()
    }
}

impl fmt::Debug for StaticWallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticWallet")
            .field("version", &self.version)
            .field("name", &self.name)
            .field("chains", &self.chains)
            .field("features", &self.features.keys().collect::<Vec<_>>())
            .field("accounts", &self.accounts)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::ReadonlyWalletAccount;
    use crate::identifier::STANDARD_CONNECT;

    #[test]
    fn test_static_wallet_properties() {
        let account: Arc<dyn WalletAccount> = Arc::new(ReadonlyWalletAccount::new(
            "abc",
            vec![1, 2, 3],
            vec!["solana:mainnet".to_string()],
            vec![STANDARD_CONNECT.to_string()],
        ));
        let wallet = StaticWallet::new("Mock Wallet", "data:image/svg+xml;base64,")
            .with_chain("solana:mainnet")
            .with_feature(STANDARD_CONNECT, Arc::new(()))
            .with_account(account);

        assert_eq!(wallet.version(), WALLET_STANDARD_VERSION);
        assert_eq!(wallet.name(), "Mock Wallet");
        assert_eq!(wallet.chains(), vec!["solana:mainnet".to_string()]);
        assert!(wallet.features().contains_key(STANDARD_CONNECT));
        assert_eq!(wallet.accounts().len(), 1);
        assert_eq!(wallet.accounts()[0].address(), "abc");
    }

    #[test]
    fn test_feature_order_preserved() {
        let wallet = StaticWallet::new("Mock Wallet", "")
            .with_feature("standard:events", Arc::new(()))
            .with_feature("standard:connect", Arc::new(()))
            .with_feature("solana:signMessage", Arc::new(()));

        let keys: Vec<_> = wallet.features().keys().cloned().collect();
        assert_eq!(
            keys,
            vec!["standard:events", "standard:connect", "solana:signMessage"]
        );
    }

    #[test]
    fn test_trait_objects_debug_by_properties() {
        let account: Arc<dyn WalletAccount> = Arc::new(ReadonlyWalletAccount::new(
            "abc",
            vec![1],
            vec!["solana:mainnet".to_string()],
            vec![],
        ));
        let wallet: Arc<dyn Wallet> = Arc::new(
            StaticWallet::new("Mock Wallet", "")
                .with_chain("solana:mainnet")
                .with_account(account.clone()),
        );

        let wallet_debug = format!("{:?}", wallet);
        assert!(wallet_debug.starts_with("Wallet {"));
        assert!(wallet_debug.contains("\"Mock Wallet\""));
        assert!(format!("{:?}", account).contains("\"abc\""));
    }

    #[test]
    fn test_same_wallet_is_identity_not_value() {
        let a: Arc<dyn Wallet> = Arc::new(StaticWallet::new("Mock Wallet", ""));
        let b: Arc<dyn Wallet> = Arc::new(StaticWallet::new("Mock Wallet", ""));

        assert!(same_wallet(&a, &a.clone()));
        assert!(!same_wallet(&a, &b));
    }
}
