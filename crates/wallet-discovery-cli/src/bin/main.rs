//! Wallet discovery CLI - replays wallet/app load orders through the discovery channel
//!
//! Without `--scenario` a built-in scenario runs: two wallets register before
//! the app listens (one with an outdated standard version), one registers
//! after, and a second app tries to take over the channel.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use wallet_discovery::DiscoveryConfig;
use wallet_discovery_cli::scenario::Scenario;
use wallet_discovery_cli::{render_text, run_scenario};

/// Wallet Standard discovery - replay script load orders and inspect what an app discovers
#[derive(Parser, Debug)]
#[command(name = "wallet-discovery")]
#[command(author = "Symbia Labs")]
#[command(version)]
#[command(about = "Replay wallet and app script load orders through the Wallet Standard discovery channel")]
struct Args {
    /// Scenario JSON file (defaults to a built-in scenario)
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Discovery config JSON file
    #[arg(long, env = "WALLET_DISCOVERY_CONFIG")]
    config: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Logs go to stderr so JSON output stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match &args.config {
        Some(path) => DiscoveryConfig::load(path)
            .with_context(|| format!("Failed to load config from {:?}", path))?,
        None => DiscoveryConfig::default(),
    };

    let scenario = match &args.scenario {
        Some(path) => Scenario::load(path)
            .with_context(|| format!("Failed to load scenario from {:?}", path))?,
        None => Scenario::builtin()?,
    };
    info!("Running scenario with {} step(s)", scenario.steps.len());

    let report = run_scenario(&scenario, config)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_text(&report));
    }

    Ok(())
}
