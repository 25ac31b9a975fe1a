//! wallet-gateway - Multi-chain wallet connection orchestration
//!
//! Loads gateways from a configuration file and enables chains on them.

use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use wallet_gateway::store::selectors;
use wallet_gateway::{EventFilter, WalletConfig, WalletError, WalletGateway, WalletRuntime};

/// wallet-gateway: connect wallet gateways to blockchain networks
#[derive(Parser)]
#[command(name = "wallet-gateway")]
#[command(about = "Multi-chain wallet connection orchestration", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Enable one or more chains on a gateway and print the resulting state
    Enable {
        /// Path to the gateway configuration (JSON)
        #[arg(short, long, value_name = "FILE")]
        config: PathBuf,

        /// Gateway id
        #[arg(short, long)]
        gateway: String,

        /// Chain ids to enable, in order
        #[arg(long = "chain", value_name = "CHAIN_ID", required = true)]
        chains: Vec<String>,

        /// Interleave the attempts instead of running them one by one
        #[arg(long)]
        concurrent: bool,
    },

    /// List the gateways declared in a configuration file
    ListGateways {
        /// Path to the gateway configuration (JSON)
        #[arg(short, long, value_name = "FILE")]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }

    let result = match cli.command {
        Commands::Enable {
            config,
            gateway,
            chains,
            concurrent,
        } => enable(&config, &gateway, &chains, concurrent).await,
        Commands::ListGateways { config } => list_gateways(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn enable(
    config: &Path,
    gateway: &str,
    chains: &[String],
    concurrent: bool,
) -> Result<(), WalletError> {
    let runtime = WalletRuntime::from_config(&WalletConfig::from_file(config)?)?;
    let mut events = runtime.subscribe(EventFilter::all());

    info!(gateway, chains = ?chains, concurrent, "Enabling wallet");
    if concurrent {
        runtime.enable_chains_concurrently(gateway, chains).await;
    } else {
        runtime.enable_chains(gateway, chains).await;
    }

    let state = runtime.store().snapshot().await;
    info!(
        published = runtime.bus().events_published(),
        connected = selectors::connected_chains(&state).len(),
        "Wallet enable finished"
    );
    let output = json!({
        "state": state,
        "events": events.drain(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn list_gateways(config: &Path) -> Result<(), WalletError> {
    let runtime = WalletRuntime::from_config(&WalletConfig::from_file(config)?)?;

    for id in runtime.registry().ids() {
        if let Some(gateway) = runtime.registry().find(&id) {
            println!(
                "{:<20} available={:<5} connected={}",
                id,
                gateway.is_available(),
                gateway.is_connected()
            );
        }
    }
    Ok(())
}
