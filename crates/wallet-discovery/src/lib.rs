//! # wallet-discovery
//!
//! Discovery of Wallet Standard wallets within a single process:
//! - A race-safe discovery channel that queues wallet registrations until an app listens
//! - The process-wide channel slot and the wallet-side `register_wallet` helper
//! - The app-side `Wallets` registry with register/unregister events
//! - Discovery configuration (supported standard version)

mod channel;
pub mod config;
mod wallets;

pub use channel::{
    global_channel, register_wallet, DiscoveryChannel, RegisterCallback, RegistrationCommand,
    Unregister, DISCOVERY_SLOT_NAME,
};
pub use config::{ConfigError, DiscoveryConfig};
pub use wallets::{get_wallets, Subscription, Wallets, WalletsEvent};
