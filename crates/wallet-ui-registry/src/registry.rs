//! Handle to wallet association

use std::sync::{Arc, Mutex, MutexGuard, Weak};
use tracing::debug;
use uuid::Uuid;

use super::handle::{HandleInner, UiWalletHandle};
use super::table::{LiveTable, Liveness};
use wallet_standard::{Result, Wallet, WalletStandardError};

/// A non-owning link from a handle to its wallet
struct Association {
    handle: Weak<HandleInner>,
    wallet: Weak<dyn Wallet>,
}

impl Liveness for Association {
    fn is_live(&self) -> bool {
        self.handle.strong_count() > 0 && self.wallet.strong_count() > 0
    }
}

/// Associates handles with the wallets they stand for.
///
/// Neither handles nor wallets are kept alive by the registry: once every
/// clone of a handle is dropped, or the wallet itself is dropped, the entry
/// behaves as absent and is swept once the table has grown enough.
#[derive(Default)]
pub struct HandleRegistry {
    associations: Mutex<LiveTable<Uuid, Association>>,
}

impl HandleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a fresh handle for `wallet`, advertising the wallet's features
    pub fn issue_handle(&self, wallet: &Arc<dyn Wallet>) -> UiWalletHandle {
        let handle = UiWalletHandle::allocate(wallet.features().keys().cloned().collect());
        self.register_handle(&handle, wallet);
        handle
    }

    /// Associate `handle` with `wallet`, replacing any previous association
    pub fn register_handle(&self, handle: &UiWalletHandle, wallet: &Arc<dyn Wallet>) {
        let replaced = self.lock().insert(
            handle.id(),
            Association {
                handle: handle.downgrade(),
                wallet: Arc::downgrade(wallet),
            },
        );

        debug!(
            replaced,
            "Registered handle {} for wallet \"{}\"",
            handle.id(),
            wallet.name()
        );
    }

    /// Look up the wallet behind `handle`.
    ///
    /// Fails with `HandleNotFound` when the handle was never registered, was
    /// unregistered, or its wallet no longer exists.
    pub fn resolve_handle(&self, handle: &UiWalletHandle) -> Result<Arc<dyn Wallet>> {
        self.lock()
            .get(&handle.id())
            .and_then(|association| association.wallet.upgrade())
            .ok_or_else(|| {
                debug!("Stale handle {}", handle.id());
                WalletStandardError::HandleNotFound
            })
    }

    /// Remove the association for `handle`, returning whether one existed
    pub fn unregister_handle(&self, handle: &UiWalletHandle) -> bool {
        self.lock().remove(&handle.id()).is_some()
    }

    /// Number of associations whose handle and wallet are both alive
    pub fn live_count(&self) -> usize {
        self.lock().values().count()
    }

    fn lock(&self) -> MutexGuard<'_, LiveTable<Uuid, Association>> {
        self.associations.lock().unwrap_or_else(|e| e.into_inner())
    }
}
