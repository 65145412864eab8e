//! token-bank server.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌──────────────────────────────────────────────────┐
//!                 │                   TOKEN BANK                     │
//!   HTTP request  │  ┌────────┐   ┌─────────────┐   ┌─────────────┐  │
//!   ──────────────┼─▶│  http  │──▶│    bank     │──▶│   chain     │──┼──▶ RPC node(s)
//!                 │  │ axum   │   │ service +   │   │ client +    │  │
//!                 │  └────────┘   │ transfers + │   │ signing     │  │
//!                 │               │ faucet      │   └─────────────┘  │
//!                 │               └──────┬──────┘                    │
//!                 │                      ▼                           │
//!                 │          ┌──────────────────────┐                │
//!                 │          │ accounts (sled) +    │                │
//!                 │          │ vault (AES-256-GCM)  │                │
//!                 │          └──────────────────────┘                │
//!                 │  config · observability · security · lifecycle   │
//!                 └──────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

use token_bank::accounts::open_store;
use token_bank::chain::{ChainClient, ChainError, RpcChainClient};
use token_bank::config::loader::CONFIG_PATH_ENV_VAR;
use token_bank::config::{load_config, Secrets};
use token_bank::lifecycle::{spawn_signal_handler, Shutdown};
use token_bank::observability::{init_logging, init_metrics};
use token_bank::{BankService, HttpServer};

#[derive(Parser)]
#[command(name = "token-bank", version, about = "Custodial ERC-20 bank service")]
struct Args {
    /// Path to the TOML configuration file. Falls back to $BANK_CONFIG, then
    /// built-in defaults.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config_path = args
        .config
        .or_else(|| std::env::var(CONFIG_PATH_ENV_VAR).ok().map(PathBuf::from));

    let config = load_config(config_path.as_deref())?;
    init_logging(&config.observability)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = ?config_path,
        bind_address = %config.server.bind_address,
        rpc_url = %config.chain.rpc_url,
        chain_id = config.chain.chain_id,
        "token-bank starting"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => init_metrics(addr)?,
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let secrets = Secrets::from_env()?;
    let store = open_store(&config.database)?;

    let chain = RpcChainClient::new(&config.chain)?;
    if config.chain.verify_chain_id {
        match chain.verify_chain_id().await {
            Ok(()) => tracing::info!(chain_id = config.chain.chain_id, "Chain id verified"),
            Err(e @ ChainError::ChainMismatch { .. }) => {
                tracing::error!(error = %e, "Refusing to start against the wrong chain");
                return Err(e.into());
            }
            Err(e) => tracing::warn!(error = %e, "Chain unreachable at startup, continuing"),
        }
    }
    let chain: Arc<dyn ChainClient> = Arc::new(chain);

    let bind_address = config.server.bind_address.clone();
    let bank = Arc::new(BankService::new(config, secrets, store, chain)?);
    tracing::info!(
        master_address = %bank.faucet().master_address(),
        "Bank service ready"
    );

    let listener = TcpListener::bind(&bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    spawn_signal_handler(&shutdown);

    HttpServer::new(bank).run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
