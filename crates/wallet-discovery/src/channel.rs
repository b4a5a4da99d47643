//! Discovery channel between wallet providers and apps
//!
//! Wallets and apps load in no particular order. Wallets push registration
//! commands into the channel; until an app attaches, commands are queued.
//! When the app attaches, the queue is flushed to it in arrival order and
//! every later push is forwarded directly. Only one app may ever attach.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};
use tracing::{debug, info, warn};

use wallet_standard::{Result, Wallet, WalletStandardError};

/// Well-known name of the process-wide discovery slot
pub const DISCOVERY_SLOT_NAME: &str = "navigator.wallets";

/// Callback handed the unregister handle once a registration is processed
pub type RegisterCallback = Box<dyn FnOnce(Unregister) + Send>;

type Consumer = Arc<dyn Fn(RegistrationCommand) + Send + Sync>;

/// A message pushed through the discovery channel.
///
/// New command kinds may be added; consumers outside this crate must match
/// with a wildcard arm and ignore what they do not understand.
#[non_exhaustive]
pub enum RegistrationCommand {
    Register {
        wallets: Vec<Arc<dyn Wallet>>,
        callback: Option<RegisterCallback>,
    },
}

impl RegistrationCommand {
    /// A `register` command without an acknowledgment callback
    pub fn register(wallets: Vec<Arc<dyn Wallet>>) -> Self {
        Self::Register {
            wallets,
            callback: None,
        }
    }

    /// A `register` command whose callback receives the unregister handle
    pub fn register_with_callback(
        wallets: Vec<Arc<dyn Wallet>>,
        callback: impl FnOnce(Unregister) + Send + 'static,
    ) -> Self {
        Self::Register {
            wallets,
            callback: Some(Box::new(callback)),
        }
    }

    /// Method name of the command
    pub fn method(&self) -> &'static str {
        match self {
            Self::Register { .. } => "register",
        }
    }
}

impl fmt::Debug for RegistrationCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Register { wallets, callback } => f
                .debug_struct("Register")
                .field("wallets", &wallets.iter().map(|w| w.name()).collect::<Vec<_>>())
                .field("callback", &callback.is_some())
                .finish(),
        }
    }
}

/// Removes the wallets of a registration from the registry that accepted them
#[must_use = "dropping an Unregister leaves the wallets registered"]
pub struct Unregister(Option<Box<dyn FnOnce() + Send>>);

impl Unregister {
    pub fn new(unregister: impl FnOnce() + Send + 'static) -> Self {
        Self(Some(Box::new(unregister)))
    }

    /// An unregister handle that does nothing
    pub fn noop() -> Self {
        Self(None)
    }

    pub fn unregister(mut self) {
        if let Some(unregister) = self.0.take() {
            unregister();
        }
    }
}

impl fmt::Debug for Unregister {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Unregister").field(&self.0.is_some()).finish()
    }
}

enum ChannelState {
    /// No app yet; commands wait in arrival order
    Pending(VecDeque<RegistrationCommand>),
    /// An app took over; `backlog` holds commands not yet handed to it
    Attached {
        consumer: Consumer,
        backlog: VecDeque<RegistrationCommand>,
        delivering: bool,
    },
}

/// Rendezvous point between wallet providers and a single consuming app
pub struct DiscoveryChannel {
    state: Mutex<ChannelState>,
}

impl Default for DiscoveryChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl DiscoveryChannel {
    /// Create a channel with no consumer and an empty queue
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ChannelState::Pending(VecDeque::new())),
        }
    }

    /// Push registration commands.
    ///
    /// Commands are queued while no app is attached, and forwarded to the app
    /// otherwise. Commands pushed from inside the consumer are delivered after
    /// the command currently being handled.
    pub fn push(&self, commands: impl IntoIterator<Item = RegistrationCommand>) {
        {
            let mut state = self.lock();
            match &mut *state {
                ChannelState::Pending(queue) => {
                    let before = queue.len();
                    queue.extend(commands);
                    debug!(
                        queued = queue.len() - before,
                        pending = queue.len(),
                        "Queued registration commands until an app listens"
                    );
                    return;
                }
                ChannelState::Attached { backlog, .. } => backlog.extend(commands),
            }
        }

        self.drain();
    }

    /// Push a `register` command for a single wallet
    pub fn register_wallet(&self, wallet: Arc<dyn Wallet>) {
        debug!("Wallet \"{}\" pushing registration", wallet.name());
        self.push([RegistrationCommand::register(vec![wallet])]);
    }

    /// Take over the channel as its only consumer.
    ///
    /// The caller drains the channel until it is empty: every queued command,
    /// and every command pushed while the flush runs, reaches `consumer` in
    /// arrival order before this returns. Fails with `ChannelAlreadyFinalized`
    /// if an app already attached; the original consumer keeps receiving pushes.
    pub fn attach(&self, consumer: impl Fn(RegistrationCommand) + Send + Sync + 'static) -> Result<()> {
        let flushed = {
            let mut state = self.lock();
            let ChannelState::Pending(queue) = &mut *state else {
                warn!("Rejected second consumer for {}", DISCOVERY_SLOT_NAME);
                return Err(WalletStandardError::ChannelAlreadyFinalized);
            };

            let backlog = std::mem::take(queue);
            let flushed = backlog.len();
            *state = ChannelState::Attached {
                consumer: Arc::new(consumer),
                backlog,
                delivering: true,
            };
            flushed
        };

        info!(flushed, "App attached to {}", DISCOVERY_SLOT_NAME);
        self.deliver();
        Ok(())
    }

    /// Whether an app has taken over the channel
    pub fn is_finalized(&self) -> bool {
        matches!(*self.lock(), ChannelState::Attached { .. })
    }

    /// Number of commands waiting for an app
    pub fn pending(&self) -> usize {
        match &*self.lock() {
            ChannelState::Pending(queue) => queue.len(),
            ChannelState::Attached { backlog, .. } => backlog.len(),
        }
    }

    /// Take the drain role if nobody holds it and deliver the backlog. Anyone
    /// else leaves their commands in the backlog for the active drainer.
    fn drain(&self) {
        {
            let mut state = self.lock();
            match &mut *state {
                ChannelState::Attached { delivering, .. } if !*delivering => *delivering = true,
                _ => return,
            }
        }

        self.deliver();
    }

    /// Deliver the backlog one command at a time without holding the lock
    /// across the consumer call. The caller must hold the drain role, which
    /// is released once the backlog is empty.
    fn deliver(&self) {
        let _guard = DeliveryGuard(self);
        loop {
            let (consumer, command) = {
                let mut state = self.lock();
                let ChannelState::Attached {
                    consumer,
                    backlog,
                    delivering,
                } = &mut *state
                else {
                    return;
                };
                match backlog.pop_front() {
                    Some(command) => (consumer.clone(), command),
                    None => {
                        *delivering = false;
                        return;
                    }
                }
            };

            debug!("Delivering {:?}", command);
            consumer(command);
        }
    }

    fn lock(&self) -> MutexGuard<'_, ChannelState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Releases the drain role if a consumer panics mid-delivery
struct DeliveryGuard<'a>(&'a DiscoveryChannel);

impl Drop for DeliveryGuard<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            if let ChannelState::Attached { delivering, .. } = &mut *self.0.lock() {
                *delivering = false;
            }
        }
    }
}

static GLOBAL_CHANNEL: OnceLock<DiscoveryChannel> = OnceLock::new();

/// The process-wide discovery channel.
///
/// Installed by whichever wallet or app touches it first; every later call
/// returns the same channel. It is never torn down.
pub fn global_channel() -> &'static DiscoveryChannel {
    GLOBAL_CHANNEL.get_or_init(|| {
        debug!("Installed {}", DISCOVERY_SLOT_NAME);
        DiscoveryChannel::new()
    })
}

/// Register a wallet with the process-wide channel
pub fn register_wallet(wallet: Arc<dyn Wallet>) {
    global_channel().register_wallet(wallet);
}
