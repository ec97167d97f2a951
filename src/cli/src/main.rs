//! Command-line client for the TON trader relay.

use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;
use structopt::StructOpt;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use ttc_cli::commands::{balance, init_config, send};
use ttc_cli::commands::send::SendArgs;
use ttc_cli::{CliError, ClientConfig};
use ttc_core::types::format_tons;
use ttc_core::WalletKind;

/// Command line arguments for the client.
#[derive(Debug, StructOpt)]
#[structopt(name = "ttc", about = "TON trader API client")]
struct Opt {
    /// Path to the configuration file
    #[structopt(long, parse(from_os_str))]
    config: Option<PathBuf>,

    /// Log level, ignored when RUST_LOG is set
    #[structopt(
        long = "log-level",
        default_value = "info",
        possible_values = &["debug", "info", "warn", "error"]
    )]
    log_level: String,

    /// Subcommand to run
    #[structopt(subcommand)]
    cmd: Command,
}

/// Subcommands for the client.
#[derive(Debug, StructOpt)]
enum Command {
    /// Send a transfer plus relay tip
    #[structopt(name = "send")]
    Send(SendArgs),

    /// Show the address and balance of a wallet
    #[structopt(name = "balance")]
    Balance {
        /// File with the seed phrase
        #[structopt(long, parse(from_os_str))]
        wallet: PathBuf,

        /// Wallet type
        #[structopt(long = "wallet-type")]
        wallet_type: Option<WalletKind>,
    },

    /// Write the default configuration
    #[structopt(name = "init-config")]
    InitConfig {
        /// Destination path [default: <config dir>/ttc/config.json]
        #[structopt(parse(from_os_str))]
        path: Option<PathBuf>,
    },
}

fn default_config_path() -> PathBuf {
    let mut dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    dir.push("ttc");
    dir.push("config.json");
    dir
}

fn load_config(path: Option<&PathBuf>) -> Result<ClientConfig, CliError> {
    match path {
        Some(path) => ClientConfig::from_file(path),
        None => {
            let path = default_config_path();
            if path.exists() {
                ClientConfig::from_file(path)
            } else {
                Ok(ClientConfig::default())
            }
        }
    }
}

/// Cancels `cancel` on SIGINT or SIGTERM.
fn watch_signals(cancel: CancellationToken) {
    tokio::spawn(async move {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            match signal(SignalKind::terminate()) {
                Ok(mut term) => {
                    tokio::select! {
                        _ = tokio::signal::ctrl_c() => {}
                        _ = term.recv() => {}
                    }
                }
                Err(e) => {
                    warn!("Failed to install SIGTERM handler: {}", e);
                    let _ = tokio::signal::ctrl_c().await;
                }
            }
        }
        #[cfg(not(unix))]
        {
            let _ = tokio::signal::ctrl_c().await;
        }
        warn!("Interrupted, cancelling");
        cancel.cancel();
    });
}

async fn run(opt: Opt, cancel: CancellationToken) -> Result<(), CliError> {
    let config = load_config(opt.config.as_ref())?;

    match opt.cmd {
        Command::Send(args) => {
            let hash = send::run(&config, &args, &cancel).await?;
            println!("{} {}", "Transaction sent, msg body hash:".green(), hash);
        }
        Command::Balance { wallet, wallet_type } => {
            let kind = wallet_type.unwrap_or(config.wallet_type);
            let (address, balance) = balance::run(&config, &wallet, kind, &cancel).await?;
            println!("{} {}", "Address:".green(), address);
            println!("{} {} TON", "Balance:".green(), format_tons(balance));
        }
        Command::InitConfig { path } => {
            let path = path.unwrap_or_else(default_config_path);
            init_config::run(&path)?;
            println!("{} {}", "Config written:".green(), path.display());
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let opt = Opt::from_args();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&opt.log_level));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;
    info!("version = ttc::{}", env!("CARGO_PKG_VERSION"));

    let cancel = CancellationToken::new();
    watch_signals(cancel.clone());

    match run(opt, cancel).await {
        Ok(()) => {
            info!("client terminated without errors");
            Ok(())
        }
        Err(e) => {
            error!("client terminated with an error: {}", e);
            Err(e.into())
        }
    }
}
