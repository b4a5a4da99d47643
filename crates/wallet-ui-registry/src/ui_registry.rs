//! Registry of UI wrappers for discovered wallets
//!
//! Wrappers are cached by the identity of the underlying wallet or account,
//! so asking twice for the same unchanged object yields the same `Arc`. A
//! wrapper whose object has changed since it was projected is replaced by a
//! fresh projection that keeps the original handle. Cache entries never keep
//! a wallet or account alive.

use std::sync::{Arc, Mutex, MutexGuard, OnceLock, Weak};
use tracing::debug;

use super::handle::UiWalletHandle;
use super::projection::{UiWallet, UiWalletAccount};
use super::registry::HandleRegistry;
use super::table::{LiveTable, Liveness};
use wallet_standard::{
    same_account, same_wallet, Result, Wallet, WalletAccount, WalletStandardError,
};

struct CachedWallet {
    wallet: Weak<dyn Wallet>,
    ui: Arc<UiWallet>,
}

struct CachedAccount {
    wallet: Weak<dyn Wallet>,
    account: Weak<dyn WalletAccount>,
    ui: Arc<UiWalletAccount>,
}

impl Liveness for CachedWallet {
    fn is_live(&self) -> bool {
        self.wallet.strong_count() > 0
    }
}

impl Liveness for CachedAccount {
    fn is_live(&self) -> bool {
        self.wallet.strong_count() > 0 && self.account.strong_count() > 0
    }
}

/// Address of the object behind an `Arc`, used as its identity key
fn identity<T: ?Sized>(arc: &Arc<T>) -> usize {
    Arc::as_ptr(arc) as *const () as usize
}

/// Process-wide registry of handles and UI wrappers
#[derive(Default)]
pub struct UiRegistry {
    handles: HandleRegistry,
    wallets: Mutex<LiveTable<usize, CachedWallet>>,
    /// Keyed by (wallet identity, account identity)
    accounts: Mutex<LiveTable<(usize, usize), CachedAccount>>,
}

impl UiRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry
    pub fn global() -> &'static UiRegistry {
        static GLOBAL: OnceLock<UiRegistry> = OnceLock::new();
        GLOBAL.get_or_init(UiRegistry::new)
    }

    /// The handle association table backing this registry
    pub fn handles(&self) -> &HandleRegistry {
        &self.handles
    }

    /// Look up the wallet behind a wallet or account handle
    pub fn resolve_handle(&self, handle: &impl AsRef<UiWalletHandle>) -> Result<Arc<dyn Wallet>> {
        self.handles.resolve_handle(handle.as_ref())
    }

    /// Return the cached wrapper for `wallet`, creating it on first use.
    ///
    /// If the wallet's properties or accounts changed since the wrapper was
    /// made, a new wrapper replaces it under the same handle.
    pub fn get_or_create_ui_wallet(&self, wallet: &Arc<dyn Wallet>) -> Arc<UiWallet> {
        let key = identity(wallet);
        let accounts: Vec<_> = wallet
            .accounts()
            .iter()
            .map(|account| self.account_wrapper(wallet, account))
            .collect();

        let Some(cached) = self.cached_wallet(key, wallet) else {
            let handle = self.handles.issue_handle(wallet);
            let ui = Arc::new(UiWallet::project(wallet.as_ref(), handle, accounts));
            let mut wallets = lock(&self.wallets);
            let cached = wallets.get_or_insert_with(key, || {
                debug!("Created UI wallet for \"{}\"", wallet.name());
                CachedWallet {
                    wallet: Arc::downgrade(wallet),
                    ui,
                }
            });
            return cached.ui.clone();
        };

        if cached.is_current(wallet.as_ref(), &accounts) {
            return cached;
        }

        let handle = cached.handle().clone();
        self.handles.register_handle(&handle, wallet);
        let ui = Arc::new(UiWallet::project(wallet.as_ref(), handle, accounts));
        debug!("Refreshed UI wallet for \"{}\"", wallet.name());
        lock(&self.wallets).insert(
            key,
            CachedWallet {
                wallet: Arc::downgrade(wallet),
                ui: ui.clone(),
            },
        );
        ui
    }

    /// Return the cached wrapper for one of `wallet`'s accounts, creating it on first use.
    ///
    /// Fails with `WalletAccountNotFound` if `account` is not currently one of
    /// the wallet's accounts.
    pub fn get_or_create_ui_wallet_account(
        &self,
        wallet: &Arc<dyn Wallet>,
        account: &Arc<dyn WalletAccount>,
    ) -> Result<Arc<UiWalletAccount>> {
        if !wallet.accounts().iter().any(|a| same_account(a, account)) {
            return Err(WalletStandardError::WalletAccountNotFound {
                address: account.address().to_string(),
                wallet_name: wallet.name().to_string(),
            });
        }

        Ok(self.account_wrapper(wallet, account))
    }

    /// Recover the account behind a UI account wrapper
    pub fn get_wallet_account_for_ui_wallet_account(
        &self,
        ui_account: &UiWalletAccount,
    ) -> Result<Arc<dyn WalletAccount>> {
        let wallet = self.resolve_handle(ui_account)?;

        let account = lock(&self.accounts)
            .values()
            .find(|cached| cached.ui.handle() == ui_account.handle())
            .and_then(|cached| cached.account.upgrade());

        account.ok_or_else(|| WalletStandardError::WalletAccountNotFound {
            address: ui_account.address().to_string(),
            wallet_name: wallet.name().to_string(),
        })
    }

    /// Whether two account wrappers stand for the same address in the same wallet
    pub fn ui_wallet_accounts_are_same(
        &self,
        a: &UiWalletAccount,
        b: &UiWalletAccount,
    ) -> Result<bool> {
        if a.address() != b.address() {
            return Ok(false);
        }

        let wallet_a = self.resolve_handle(a)?;
        let wallet_b = self.resolve_handle(b)?;
        Ok(same_wallet(&wallet_a, &wallet_b))
    }

    /// Whether an account wrapper belongs to the wallet behind a wallet wrapper
    pub fn ui_wallet_account_belongs_to_ui_wallet(
        &self,
        account: &UiWalletAccount,
        wallet: &UiWallet,
    ) -> Result<bool> {
        let account_wallet = self.resolve_handle(account)?;
        let wallet = self.resolve_handle(wallet)?;
        Ok(same_wallet(&account_wallet, &wallet))
    }

    /// Key under which a UI may persist its selected account
    pub fn wallet_account_storage_key(&self, account: &UiWalletAccount) -> Result<String> {
        let wallet = self.resolve_handle(account)?;
        Ok(storage_key(wallet.name(), account.address()))
    }

    fn cached_wallet(&self, key: usize, wallet: &Arc<dyn Wallet>) -> Option<Arc<UiWallet>> {
        lock(&self.wallets).get(&key).and_then(|cached| {
            let alive = cached.wallet.upgrade()?;
            same_wallet(&alive, wallet).then(|| cached.ui.clone())
        })
    }

    fn account_wrapper(
        &self,
        wallet: &Arc<dyn Wallet>,
        account: &Arc<dyn WalletAccount>,
    ) -> Arc<UiWalletAccount> {
        let key = (identity(wallet), identity(account));
        let mut accounts = lock(&self.accounts);

        let handle = match accounts.get(&key) {
            Some(cached) if cached.ui.is_current(account.as_ref()) => return cached.ui.clone(),
            Some(cached) => {
                debug!("Refreshing UI account {}", account.address());
                cached.ui.handle().clone()
            }
            None => {
                debug!(
                    "Creating UI account {} for wallet \"{}\"",
                    account.address(),
                    wallet.name()
                );
                UiWalletHandle::allocate(account.features().to_vec())
            }
        };
        self.handles.register_handle(&handle, wallet);
        let ui = Arc::new(UiWalletAccount::project(account.as_ref(), handle));

        accounts.insert(
            key,
            CachedAccount {
                wallet: Arc::downgrade(wallet),
                account: Arc::downgrade(account),
                ui: ui.clone(),
            },
        );
        ui
    }
}

/// `<wallet name with ':' replaced by '_'>:<address>`
pub fn storage_key(wallet_name: &str, address: &str) -> String {
    format!("{}:{}", wallet_name.replace(':', "_"), address)
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use wallet_standard::{FeatureMap, IdentifierString, ReadonlyWalletAccount, StaticWallet};

    /// A wallet whose features and accounts can change after registration
    pub(crate) struct MutableWallet {
        pub(crate) name: String,
        pub(crate) features: Mutex<FeatureMap>,
        pub(crate) accounts: Mutex<Vec<Arc<dyn WalletAccount>>>,
    }

    impl Wallet for MutableWallet {
        fn version(&self) -> &str {
            "1.0.0"
        }

        fn name(&self) -> &str {
            &self.name
        }

        fn icon(&self) -> &str {
            "data:image/svg+xml;base64,"
        }

        fn chains(&self) -> Vec<IdentifierString> {
            vec!["solana:mainnet".to_string()]
        }

        fn features(&self) -> FeatureMap {
            self.features.lock().unwrap().clone()
        }

        fn accounts(&self) -> Vec<Arc<dyn WalletAccount>> {
            self.accounts.lock().unwrap().clone()
        }
    }

    pub(crate) fn mock_account(address: &str, features: &[&str]) -> Arc<dyn WalletAccount> {
        Arc::new(ReadonlyWalletAccount::new(
            address,
            vec![1; 32],
            vec!["solana:mainnet".to_string()],
            features.iter().map(|f| f.to_string()).collect(),
        ))
    }

    fn mock_wallet(name: &str, accounts: Vec<Arc<dyn WalletAccount>>) -> Arc<dyn Wallet> {
        let wallet = accounts.into_iter().fold(
            StaticWallet::new(name, "data:image/svg+xml;base64,")
                .with_chain("solana:mainnet")
                .with_feature("standard:connect", Arc::new(())),
            |wallet, account| wallet.with_account(account),
        );
        Arc::new(wallet)
    }

    #[test]
    fn test_wrapper_identity_stable_for_same_wallet() {
        let registry = UiRegistry::new();
        let wallet = mock_wallet("Mock Wallet", vec![mock_account("abc", &[])]);

        let first = registry.get_or_create_ui_wallet(&wallet);
        let second = registry.get_or_create_ui_wallet(&wallet);

        assert!(Arc::ptr_eq(&first, &second));
        assert!(Arc::ptr_eq(&first.accounts()[0], &second.accounts()[0]));
    }

    #[test]
    fn test_wrapper_differs_for_lookalike_wallet() {
        let registry = UiRegistry::new();
        let a = mock_wallet("Mock Wallet", vec![]);
        let b = mock_wallet("Mock Wallet", vec![]);

        let ui_a = registry.get_or_create_ui_wallet(&a);
        let ui_b = registry.get_or_create_ui_wallet(&b);

        assert!(!Arc::ptr_eq(&ui_a, &ui_b));
        assert_ne!(ui_a.handle(), ui_b.handle());
        assert_eq!(ui_a.name(), ui_b.name());
    }

    #[test]
    fn test_projection_fields() {
        let registry = UiRegistry::new();
        let wallet = mock_wallet(
            "Mock Wallet",
            vec![mock_account("abc", &["standard:connect"])],
        );

        let ui = registry.get_or_create_ui_wallet(&wallet);

        assert_eq!(ui.name(), "Mock Wallet");
        assert_eq!(ui.icon(), "data:image/svg+xml;base64,");
        assert_eq!(ui.version(), "1.0.0");
        assert_eq!(ui.chains(), ["solana:mainnet".to_string()]);
        assert_eq!(ui.features(), ["standard:connect".to_string()]);
        assert_eq!(ui.accounts().len(), 1);
        assert_eq!(ui.accounts()[0].address(), "abc");
        assert_eq!(ui.accounts()[0].public_key(), &[1; 32]);
    }

    #[test]
    fn test_handles_resolve_to_wallet() {
        let registry = UiRegistry::new();
        let wallet = mock_wallet("Mock Wallet", vec![mock_account("abc", &[])]);

        let ui = registry.get_or_create_ui_wallet(&wallet);

        assert!(same_wallet(&registry.resolve_handle(&*ui).unwrap(), &wallet));
        assert!(same_wallet(
            &registry.resolve_handle(&*ui.accounts()[0]).unwrap(),
            &wallet
        ));
    }

    #[test]
    fn test_account_wrapper_shared_with_wallet_wrapper() {
        let registry = UiRegistry::new();
        let account = mock_account("abc", &[]);
        let wallet = mock_wallet("Mock Wallet", vec![account.clone()]);

        let direct = registry
            .get_or_create_ui_wallet_account(&wallet, &account)
            .unwrap();
        let ui = registry.get_or_create_ui_wallet(&wallet);

        assert!(Arc::ptr_eq(&direct, &ui.accounts()[0]));
    }

    #[test]
    fn test_account_outside_wallet_not_found() {
        let registry = UiRegistry::new();
        let wallet = mock_wallet("Mock Wallet", vec![mock_account("abc", &[])]);
        let stranger = mock_account("xyz", &[]);

        let err = registry
            .get_or_create_ui_wallet_account(&wallet, &stranger)
            .unwrap_err();

        assert_eq!(
            err,
            WalletStandardError::WalletAccountNotFound {
                address: "xyz".to_string(),
                wallet_name: "Mock Wallet".to_string(),
            }
        );
    }

    #[test]
    fn test_recover_underlying_account() {
        let registry = UiRegistry::new();
        let account = mock_account("abc", &[]);
        let mutable = Arc::new(MutableWallet {
            name: "Mock Wallet".to_string(),
            features: Mutex::new(FeatureMap::new()),
            accounts: Mutex::new(vec![account.clone()]),
        });
        let wallet: Arc<dyn Wallet> = mutable.clone();

        let ui_account = registry
            .get_or_create_ui_wallet_account(&wallet, &account)
            .unwrap();
        let recovered = registry
            .get_wallet_account_for_ui_wallet_account(&ui_account)
            .unwrap();
        assert!(same_account(&recovered, &account));

        // Once the wallet forgets the account nothing keeps it alive
        drop(recovered);
        drop(account);
        mutable.accounts.lock().unwrap().clear();

        assert_eq!(
            registry
                .get_wallet_account_for_ui_wallet_account(&ui_account)
                .unwrap_err(),
            WalletStandardError::WalletAccountNotFound {
                address: "abc".to_string(),
                wallet_name: "Mock Wallet".to_string(),
            }
        );
    }

    #[test]
    fn test_accounts_are_same() {
        let registry = UiRegistry::new();
        let wallet = mock_wallet(
            "Mock Wallet",
            vec![mock_account("abc", &[]), mock_account("def", &[])],
        );
        let other = mock_wallet("Other Wallet", vec![mock_account("abc", &[])]);

        let ui = registry.get_or_create_ui_wallet(&wallet);
        let ui_other = registry.get_or_create_ui_wallet(&other);

        let abc = &ui.accounts()[0];
        let def = &ui.accounts()[1];
        let other_abc = &ui_other.accounts()[0];

        assert!(registry.ui_wallet_accounts_are_same(abc, abc).unwrap());
        assert!(!registry.ui_wallet_accounts_are_same(abc, def).unwrap());
        assert!(!registry.ui_wallet_accounts_are_same(abc, other_abc).unwrap());
    }

    #[test]
    fn test_account_belongs_to_wallet() {
        let registry = UiRegistry::new();
        let wallet = mock_wallet("Mock Wallet", vec![mock_account("abc", &[])]);
        let other = mock_wallet("Other Wallet", vec![]);

        let ui = registry.get_or_create_ui_wallet(&wallet);
        let ui_other = registry.get_or_create_ui_wallet(&other);

        assert!(registry
            .ui_wallet_account_belongs_to_ui_wallet(&ui.accounts()[0], &ui)
            .unwrap());
        assert!(!registry
            .ui_wallet_account_belongs_to_ui_wallet(&ui.accounts()[0], &ui_other)
            .unwrap());
    }

    #[test]
    fn test_storage_key() {
        let registry = UiRegistry::new();
        let wallet = mock_wallet("Mock:Wallet", vec![mock_account("abc", &[])]);

        let ui = registry.get_or_create_ui_wallet(&wallet);

        assert_eq!(
            registry.wallet_account_storage_key(&ui.accounts()[0]).unwrap(),
            "Mock_Wallet:abc"
        );
    }

    #[test]
    fn test_storage_key_for_dropped_wallet() {
        let registry = UiRegistry::new();
        let wallet = mock_wallet("Mock Wallet", vec![mock_account("abc", &[])]);
        let ui = registry.get_or_create_ui_wallet(&wallet);

        drop(wallet);

        assert_eq!(
            registry.wallet_account_storage_key(&ui.accounts()[0]).unwrap_err(),
            WalletStandardError::HandleNotFound
        );
    }

    #[test]
    fn test_new_accounts_get_new_wrappers() {
        let registry = UiRegistry::new();
        let first = mock_account("abc", &[]);
        let mutable = Arc::new(MutableWallet {
            name: "Mock Wallet".to_string(),
            features: Mutex::new(FeatureMap::new()),
            accounts: Mutex::new(vec![first.clone()]),
        });
        let wallet: Arc<dyn Wallet> = mutable.clone();

        let before = registry
            .get_or_create_ui_wallet_account(&wallet, &first)
            .unwrap();
        let second = mock_account("def", &[]);
        mutable.accounts.lock().unwrap().push(second.clone());
        let after = registry
            .get_or_create_ui_wallet_account(&wallet, &second)
            .unwrap();

        assert!(!Arc::ptr_eq(&before, &after));
        assert!(Arc::ptr_eq(
            &before,
            &registry
                .get_or_create_ui_wallet_account(&wallet, &first)
                .unwrap()
        ));
    }

    #[test]
    fn test_changed_accounts_refresh_wrapper_under_same_handle() {
        let registry = UiRegistry::new();
        let mutable = Arc::new(MutableWallet {
            name: "Mock Wallet".to_string(),
            features: Mutex::new(FeatureMap::new()),
            accounts: Mutex::new(vec![mock_account("abc", &[])]),
        });
        let wallet: Arc<dyn Wallet> = mutable.clone();

        let before = registry.get_or_create_ui_wallet(&wallet);
        mutable.accounts.lock().unwrap().push(mock_account("def", &[]));
        let after = registry.get_or_create_ui_wallet(&wallet);

        let addresses: Vec<_> = after.accounts().iter().map(|a| a.address()).collect();
        assert_eq!(addresses, ["abc", "def"]);
        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(before.handle(), after.handle());
        assert!(Arc::ptr_eq(&before.accounts()[0], &after.accounts()[0]));
        assert!(Arc::ptr_eq(&after, &registry.get_or_create_ui_wallet(&wallet)));
        assert!(same_wallet(&registry.resolve_handle(&*before).unwrap(), &wallet));
    }

    #[test]
    fn test_removed_account_drops_from_refreshed_wrapper() {
        let registry = UiRegistry::new();
        let mutable = Arc::new(MutableWallet {
            name: "Mock Wallet".to_string(),
            features: Mutex::new(FeatureMap::new()),
            accounts: Mutex::new(vec![mock_account("abc", &[]), mock_account("def", &[])]),
        });
        let wallet: Arc<dyn Wallet> = mutable.clone();

        let before = registry.get_or_create_ui_wallet(&wallet);
        mutable.accounts.lock().unwrap().remove(0);
        let after = registry.get_or_create_ui_wallet(&wallet);

        assert_eq!(after.accounts().len(), 1);
        assert_eq!(after.accounts()[0].address(), "def");
        assert!(Arc::ptr_eq(&before.accounts()[1], &after.accounts()[0]));
    }

    #[test]
    fn test_changed_features_refresh_wrapper() {
        let registry = UiRegistry::new();
        let mutable = Arc::new(MutableWallet {
            name: "Mock Wallet".to_string(),
            features: Mutex::new(FeatureMap::new()),
            accounts: Mutex::new(vec![]),
        });
        let wallet: Arc<dyn Wallet> = mutable.clone();

        let before = registry.get_or_create_ui_wallet(&wallet);
        assert!(before.features().is_empty());

        mutable
            .features
            .lock()
            .unwrap()
            .insert("standard:connect".to_string(), Arc::new(()));
        let after = registry.get_or_create_ui_wallet(&wallet);

        assert_eq!(after.features(), ["standard:connect".to_string()]);
        assert_eq!(before.handle(), after.handle());
        assert!(registry.get_wallet_feature(&*before, "standard:connect").is_ok());
    }

    #[test]
    fn test_storage_key_format() {
        assert_eq!(storage_key("Mock:Wallet", "abc"), "Mock_Wallet:abc");
        assert_eq!(storage_key("Plain", "abc"), "Plain:abc");
    }
}
