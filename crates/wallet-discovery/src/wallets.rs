//! App-side registry of discovered wallets

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, Weak};
use tracing::{debug, error, info, warn};

use super::channel::{global_channel, DiscoveryChannel, RegistrationCommand, Unregister};
use crate::config::DiscoveryConfig;
use wallet_standard::{same_wallet, Result, Wallet, WalletStandardError};

/// Events emitted by the wallets registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WalletsEvent {
    /// Wallets were added; the listener receives only the new wallets
    Register,
    /// Wallets were removed; the listener receives only the removed wallets
    Unregister,
}

type Listener = Arc<dyn Fn(&[Arc<dyn Wallet>]) + Send + Sync>;

/// Registry of wallets known to the app
pub struct Wallets {
    /// Settings applied to registrations arriving through a channel
    config: DiscoveryConfig,
    /// Registered wallets in registration order
    registered: Mutex<Vec<Arc<dyn Wallet>>>,
    /// Listeners per event, tagged with their subscription id
    listeners: Mutex<HashMap<WalletsEvent, Vec<(u64, Listener)>>>,
    next_listener_id: AtomicU64,
}

impl Wallets {
    /// Create a registry with default configuration
    pub fn new() -> Arc<Self> {
        Self::with_config(DiscoveryConfig::default())
    }

    pub fn with_config(config: DiscoveryConfig) -> Arc<Self> {
        Arc::new(Self {
            config,
            registered: Mutex::new(Vec::new()),
            listeners: Mutex::new(HashMap::new()),
            next_listener_id: AtomicU64::new(0),
        })
    }

    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    /// Register wallets, skipping any already registered.
    ///
    /// Emits `Register` with the newly added wallets. The returned handle
    /// removes exactly those wallets and emits `Unregister`.
    pub fn register(self: &Arc<Self>, wallets: impl IntoIterator<Item = Arc<dyn Wallet>>) -> Unregister {
        let added = {
            let mut registered = lock(&self.registered);
            let mut added: Vec<Arc<dyn Wallet>> = Vec::new();
            for wallet in wallets {
                let known = registered.iter().any(|r| same_wallet(r, &wallet));
                if !known {
                    registered.push(wallet.clone());
                    added.push(wallet);
                }
            }
            added
        };

        if added.is_empty() {
            debug!("All wallets in registration already registered");
            return Unregister::noop();
        }

        info!(
            "Registered {} wallet(s): {:?}",
            added.len(),
            added.iter().map(|w| w.name()).collect::<Vec<_>>()
        );
        self.emit(WalletsEvent::Register, &added);

        let registry = Arc::downgrade(self);
        Unregister::new(move || {
            if let Some(registry) = registry.upgrade() {
                registry.remove(&added);
            }
        })
    }

    /// Registered wallets in registration order
    pub fn get(&self) -> Vec<Arc<dyn Wallet>> {
        lock(&self.registered).clone()
    }

    /// Listen for an event until the returned subscription is turned off
    pub fn on(
        self: &Arc<Self>,
        event: WalletsEvent,
        listener: impl Fn(&[Arc<dyn Wallet>]) + Send + Sync + 'static,
    ) -> Subscription {
        let id = self.next_listener_id.fetch_add(1, Ordering::Relaxed);
        lock(&self.listeners)
            .entry(event)
            .or_default()
            .push((id, Arc::new(listener)));

        Subscription {
            registry: Arc::downgrade(self),
            event,
            id,
        }
    }

    /// Check a wallet's standard version against the configured one
    pub fn check_version(&self, wallet: &dyn Wallet) -> Result<()> {
        if !self.config.enforce_version || wallet.version() == self.config.supported_version {
            return Ok(());
        }

        Err(WalletStandardError::WalletVersionMismatch {
            wallet_name: wallet.name().to_string(),
            expected: self.config.supported_version.clone(),
            actual: wallet.version().to_string(),
        })
    }

    /// Become the consumer of `channel`, flushing everything queued on it
    pub fn listen(self: &Arc<Self>, channel: &DiscoveryChannel) -> Result<()> {
        let registry = Arc::downgrade(self);
        channel.attach(move |command| match registry.upgrade() {
            Some(registry) => registry.handle_command(command),
            None => debug!("Wallets registry dropped, discarding {}", command.method()),
        })
    }

    fn handle_command(self: &Arc<Self>, command: RegistrationCommand) {
        match command {
            RegistrationCommand::Register { wallets, callback } => {
                let compatible: Vec<_> = wallets
                    .into_iter()
                    .filter(|wallet| match self.check_version(wallet.as_ref()) {
                        Ok(()) => true,
                        Err(e) => {
                            warn!("Skipping wallet registration: {}", e);
                            false
                        }
                    })
                    .collect();

                let unregister = self.register(compatible);
                if let Some(callback) = callback {
                    callback(unregister);
                }
            }
        }
    }

    fn remove(&self, wallets: &[Arc<dyn Wallet>]) {
        let removed: Vec<_> = {
            let mut registered = lock(&self.registered);
            let (removed, kept): (Vec<_>, Vec<_>) = registered
                .drain(..)
                .partition(|r| wallets.iter().any(|w| same_wallet(r, w)));
            *registered = kept;
            removed
        };

        if removed.is_empty() {
            return;
        }

        info!("Unregistered {} wallet(s)", removed.len());
        self.emit(WalletsEvent::Unregister, &removed);
    }

    fn off(&self, event: WalletsEvent, id: u64) {
        if let Some(listeners) = lock(&self.listeners).get_mut(&event) {
            listeners.retain(|(listener_id, _)| *listener_id != id);
        }
    }

    /// Call every listener for `event`; a panicking listener is logged and skipped
    fn emit(&self, event: WalletsEvent, wallets: &[Arc<dyn Wallet>]) {
        let listeners: Vec<Listener> = lock(&self.listeners)
            .get(&event)
            .map(|listeners| listeners.iter().map(|(_, l)| l.clone()).collect())
            .unwrap_or_default();

        for listener in listeners {
            if catch_unwind(AssertUnwindSafe(|| listener(wallets))).is_err() {
                error!("Wallets {:?} listener panicked", event);
            }
        }
    }
}

/// An active event listener
#[derive(Debug)]
pub struct Subscription {
    registry: Weak<Wallets>,
    event: WalletsEvent,
    id: u64,
}

impl Subscription {
    /// Stop receiving events
    pub fn off(self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.off(self.event, self.id);
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

static GLOBAL_WALLETS: OnceLock<Arc<Wallets>> = OnceLock::new();

/// The process-wide wallets registry.
///
/// The first call attaches it to the process-wide channel and flushes every
/// wallet registered so far; concurrent callers wait for that flush. If
/// another consumer already owns the channel the failure is logged and the
/// registry is returned anyway. Registration callbacks run during the first
/// call and must not call this function.
pub fn get_wallets() -> Arc<Wallets> {
    GLOBAL_WALLETS
        .get_or_init(|| {
            let wallets = Wallets::new();
            if let Err(e) = wallets.listen(global_channel()) {
                error!("Wallets registry could not listen for registrations: {}", e);
            }
            wallets
        })
        .clone()
}
