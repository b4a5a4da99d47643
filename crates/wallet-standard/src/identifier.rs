//! Namespaced identifiers and well-known constants
//!
//! Chains and features are identified by strings of the form
//! `namespace:reference`. The core never parses the namespace; identifiers
//! are opaque map keys.

/// A namespaced `namespace:reference` identifier
pub type IdentifierString = String;

/// Version of the Wallet Standard implemented by this workspace
pub const WALLET_STANDARD_VERSION: &str = "1.0.0";

/// Feature used to request authorization to a wallet's accounts
pub const STANDARD_CONNECT: &str = "standard:connect";

/// Feature used to relinquish authorization
pub const STANDARD_DISCONNECT: &str = "standard:disconnect";

/// Feature used to observe wallet property changes
pub const STANDARD_EVENTS: &str = "standard:events";
