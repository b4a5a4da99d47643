//! # wallet-discovery-cli
//!
//! Replays the order in which wallet scripts and an app script run on a page
//! through a discovery channel, then reports what the app discovered.

pub mod scenario;

use serde::Serialize;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

use scenario::{Scenario, ScenarioError, Step};
use wallet_discovery::{DiscoveryChannel, DiscoveryConfig, RegistrationCommand, Unregister, Wallets};
use wallet_standard::Wallet;
use wallet_ui_registry::{UiRegistry, UiWallet};

/// A wallet visible to the app at the end of a scenario
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveredWallet {
    #[serde(flatten)]
    pub wallet: Arc<UiWallet>,
    /// Storage key per account, in account order
    pub storage_keys: Vec<String>,
}

/// Outcome of a scenario run
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioReport {
    pub wallets: Vec<DiscoveredWallet>,
    /// Registrations still waiting for an app
    pub pending: usize,
    /// Failures reported by individual steps
    pub errors: Vec<String>,
}

/// Run every step of `scenario` against a fresh channel
pub fn run_scenario(scenario: &Scenario, config: DiscoveryConfig) -> Result<ScenarioReport, ScenarioError> {
    let channel = DiscoveryChannel::new();
    let wallets = Wallets::with_config(config);
    let acknowledged: Arc<Mutex<HashMap<String, Unregister>>> = Arc::new(Mutex::new(HashMap::new()));
    let mut errors = Vec::new();

    for step in &scenario.steps {
        match step {
            Step::RegisterWallet { wallet } => {
                let name = wallet.name.clone();
                let wallet: Arc<dyn Wallet> = Arc::new(wallet.build()?);
                let acknowledged = acknowledged.clone();
                channel.push([RegistrationCommand::register_with_callback(
                    vec![wallet],
                    move |unregister| {
                        acknowledged
                            .lock()
                            .unwrap_or_else(|e| e.into_inner())
                            .insert(name, unregister);
                    },
                )]);
            }
            Step::AttachApp => {
                if let Err(e) = wallets.listen(&channel) {
                    warn!("App could not attach: {}", e);
                    errors.push(e.to_string());
                }
            }
            Step::UnregisterWallet { name } => {
                let unregister = acknowledged
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .remove(name);
                match unregister {
                    Some(unregister) => unregister.unregister(),
                    None => {
                        warn!("No acknowledged registration for \"{}\"", name);
                        errors.push(format!("No acknowledged registration for \"{}\"", name));
                    }
                }
            }
        }
    }

    let registry = UiRegistry::new();
    let discovered = wallets
        .get()
        .iter()
        .map(|wallet| {
            let ui = registry.get_or_create_ui_wallet(wallet);
            let storage_keys = ui
                .accounts()
                .iter()
                .map(|account| registry.wallet_account_storage_key(account))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(DiscoveredWallet {
                wallet: ui,
                storage_keys,
            })
        })
        .collect::<Result<Vec<_>, ScenarioError>>()?;

    info!(
        "Scenario finished: {} wallet(s) discovered, {} pending",
        discovered.len(),
        channel.pending()
    );

    Ok(ScenarioReport {
        wallets: discovered,
        pending: channel.pending(),
        errors,
    })
}

/// Human-readable report
pub fn render_text(report: &ScenarioReport) -> String {
    let mut out = String::new();

    for discovered in &report.wallets {
        let wallet = &discovered.wallet;
        let _ = writeln!(out, "{} (v{})", wallet.name(), wallet.version());
        let _ = writeln!(out, "  chains:   {}", wallet.chains().join(", "));
        let _ = writeln!(out, "  features: {}", wallet.features().join(", "));
        for (account, key) in wallet.accounts().iter().zip(&discovered.storage_keys) {
            let label = account.label().unwrap_or("-");
            let _ = writeln!(
                out,
                "  account {} [{}] features: {} key: {}",
                account.address(),
                label,
                account.features().join(", "),
                key
            );
        }
    }

    if report.pending > 0 {
        let _ = writeln!(out, "{} registration(s) waiting for an app", report.pending);
    }
    for error in &report.errors {
        let _ = writeln!(out, "error: {}", error);
    }

    out
}
