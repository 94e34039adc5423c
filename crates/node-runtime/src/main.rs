//! # Proof-Chain Node
//!
//! ## Startup Sequence
//!
//! 1. Parse flags and load configuration (defaults, file, env, flags)
//! 2. Initialize logging
//! 3. Load or create the node key
//! 4. Start the ledger and transport workers
//! 5. Read console commands until `exit`, end of input or Ctrl+C

use anyhow::{Context, Result};
use clap::Parser;
use node_runtime::console::{self, Command};
use node_runtime::{CliArgs, NodeConfig, NodeRuntime};
use pc_04_ledger::{Clock, SystemClock};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    let config = NodeConfig::load(&args, |key| std::env::var(key).ok())?;

    // RUST_LOG wins over the debug flag.
    let default_level = if config.logging.debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("===========================================");
    info!("  Proof-Chain Node v{}", env!("CARGO_PKG_VERSION"));
    info!("===========================================");

    let mut wallet = node_runtime::container::load_wallet(config.mining.key_file.as_deref())
        .context("Failed to load node key")?;
    let mut runtime = NodeRuntime::start(&config, &wallet)
        .await
        .context("Failed to start node")?;
    println!("{}", console::HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.context("Failed to read console")?,
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                None
            }
        };
        let Some(line) = line else {
            break;
        };

        let command = match console::parse_command(&line, &wallet, SystemClock.now()) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                println!("error: {e:#}");
                continue;
            }
        };
        match command {
            Command::ShowKey => println!("{}", hex::encode(runtime.public_key())),
            Command::ExportKey => println!("{}", hex::encode(wallet.keypair().to_seed())),
            Command::ImportKey(keypair) => {
                match runtime
                    .import_key(keypair, config.mining.key_file.as_deref())
                    .await
                {
                    Ok(imported) => wallet = imported,
                    Err(e) => println!("error: {e:#}"),
                }
            }
            Command::Help => println!("{}", console::HELP),
            command if command.is_exit() => break,
            command => {
                if let Err(e) = runtime.dispatch(command).await {
                    warn!("{e:#}");
                    break;
                }
            }
        }
    }

    runtime.shutdown().await?;
    Ok(())
}
