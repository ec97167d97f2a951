//! Send command: one tipped transfer through the relay.

use crate::config::ClientConfig;
use crate::errors::CliError;
use crate::seed::read_phrase;
use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use structopt::StructOpt;
use tokio_util::sync::CancellationToken;
use tracing::info;
use ttc_core::chain::{balance_of, chain_info};
use ttc_core::jitter::{pause, Jitter};
use ttc_core::types::format_tons;
use ttc_core::{
    compose, resolve_label, select_sender, ChainClient, ClientError, Nanotons, SeedWallet,
    WalletHandle, WalletKind,
};
use ttc_network::{RelayClient, TonCenterClient};

/// Arguments of the send command.
#[derive(Debug, StructOpt)]
pub struct SendArgs {
    /// Relay auth header
    #[structopt(long = "auth-header", env = "TTC_AUTH_HEADER", hide_env_values = true)]
    pub auth_header: String,

    /// Transaction destination address (single-wallet mode)
    #[structopt(long = "destination-address", short = "d")]
    pub destination_address: Option<String>,

    /// File with the seed phrase for the sending wallet
    #[structopt(long = "from-wallet", parse(from_os_str))]
    pub from_wallet: PathBuf,

    /// File with the seed phrase for a second wallet; the richer of the two sends to the other
    #[structopt(long = "to-wallet", parse(from_os_str))]
    pub to_wallet: Option<PathBuf>,

    /// Wallet type: v3, v4r2, v5r1beta, v5r1final, highloadv2r2, highloadv3
    #[structopt(long = "wallet-type")]
    pub wallet_type: Option<WalletKind>,

    /// Amount in nanotons [default: 250000000, i.e. 0.25 TON]
    #[structopt(long, short = "a")]
    pub amount: Option<Nanotons>,

    /// Tip in nanotons [default: 15000000, i.e. 0.015 TON]
    #[structopt(long, short = "t")]
    pub tip: Option<Nanotons>,

    /// Transfer comment
    #[structopt(long, short = "c")]
    pub comment: Option<String>,

    /// Upper bound of a random pause before sending, in seconds (0 disables)
    #[structopt(long = "max-pause")]
    pub max_pause: Option<u64>,

    /// Upper bound of a random addon to the amount, in nanotons (0 disables)
    #[structopt(long = "max-addon")]
    pub max_addon: Option<Nanotons>,

    /// Relay endpoint
    #[structopt(long = "uri")]
    pub uri: Option<String>,

    /// Chain JSON-RPC endpoint
    #[structopt(long = "rpc-uri")]
    pub rpc_uri: Option<String>,
}

/// What to send, after config and flags are merged.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferPlan {
    /// Destination in single-wallet mode; ignored when a second wallet is given
    pub destination: Option<String>,
    pub amount: Nanotons,
    pub tip: Nanotons,
    pub comment: String,
    /// Bound applied to each chain query
    pub query_deadline: Duration,
}

impl TransferPlan {
    /// Merges `args` over `config`.
    pub fn from_args(config: &ClientConfig, args: &SendArgs) -> Result<Self, CliError> {
        if args.to_wallet.is_some() && args.destination_address.is_some() {
            return Err(CliError::InvalidArgument(
                "--destination-address cannot be combined with --to-wallet".to_string(),
            ));
        }
        if args.to_wallet.is_none() && args.destination_address.is_none() {
            return Err(CliError::InvalidArgument(
                "either --destination-address or --to-wallet is required".to_string(),
            ));
        }

        Ok(Self {
            destination: args.destination_address.clone(),
            amount: args.amount.unwrap_or(config.amount),
            tip: args.tip.unwrap_or(config.tip),
            comment: args.comment.clone().unwrap_or_else(default_comment),
            query_deadline: config.query_deadline(),
        })
    }
}

/// Everything the send command runs with, flags merged over config.
#[derive(Debug, Clone, PartialEq)]
pub struct SendSettings {
    pub plan: TransferPlan,
    pub wallet_type: WalletKind,
    pub endpoint: String,
    pub rpc_uri: String,
    pub max_pause_secs: u64,
    pub max_addon: Nanotons,
}

impl SendSettings {
    /// Merges `args` over `config`.
    pub fn resolve(config: &ClientConfig, args: &SendArgs) -> Result<Self, CliError> {
        Ok(Self {
            plan: TransferPlan::from_args(config, args)?,
            wallet_type: args.wallet_type.unwrap_or(config.wallet_type),
            endpoint: args.uri.clone().unwrap_or_else(|| config.endpoint.clone()),
            rpc_uri: args.rpc_uri.clone().unwrap_or_else(|| config.rpc_uri.clone()),
            max_pause_secs: args.max_pause.unwrap_or(config.max_pause_secs),
            max_addon: args.max_addon.unwrap_or(config.max_addon),
        })
    }

    /// Logs the effective settings, auth header redacted.
    pub fn log(&self, args: &SendArgs) {
        info!("auth-header = <redacted>");
        info!("uri = {}", self.endpoint);
        info!("rpc-uri = {}", self.rpc_uri);
        info!("from-wallet = {}", args.from_wallet.display());
        if let Some(path) = &args.to_wallet {
            info!("to-wallet = {}", path.display());
        }
        if let Some(destination) = &self.plan.destination {
            info!("destination-address = {}", destination);
        }
        info!("wallet-type = {}", self.wallet_type);
        info!("amount = {}", self.plan.amount);
        info!("tip = {}", self.plan.tip);
        info!("comment = {:?}", self.plan.comment);
        info!("max-pause = {}s", self.max_pause_secs);
        info!("max-addon = {}", self.max_addon);
    }
}

/// Comment used when none is given.
pub fn default_comment() -> String {
    format!(
        "TON trader API test, {}",
        Utc::now().format("%Y-%m-%dT%H:%M:%S%.6f")
    )
}

/// Runs the send command, returning the relay's message-body hash.
pub async fn run(
    config: &ClientConfig,
    args: &SendArgs,
    cancel: &CancellationToken,
) -> Result<String, CliError> {
    let settings = SendSettings::resolve(config, args)?;
    settings.log(args);

    let chain = Arc::new(TonCenterClient::new(
        settings.rpc_uri.clone(),
        config.rpc_api_key.clone(),
    )?);
    let relay = RelayClient::new(settings.endpoint.clone(), args.auth_header.clone())?;
    let kind = settings.wallet_type;

    let from = SeedWallet::from_seed(chain.clone(), &read_phrase(&args.from_wallet)?, kind)?;
    let to = match &args.to_wallet {
        Some(path) => Some(SeedWallet::from_seed(chain.clone(), &read_phrase(path)?, kind)?),
        None => None,
    };

    let mut jitter = Jitter::new(settings.max_pause_secs, settings.max_addon);

    let hash = execute(chain.as_ref(), &relay, &from, to.as_ref(), &settings.plan, &mut jitter, cancel).await?;
    Ok(hash)
}

/// The send pipeline: resolve, select, randomize, compose, submit.
///
/// With a second wallet the richer of the two sends to the other; otherwise
/// `from` sends to `plan.destination`.
pub async fn execute<W, C>(
    chain: &C,
    relay: &RelayClient,
    from: &W,
    to: Option<&W>,
    plan: &TransferPlan,
    jitter: &mut Jitter,
    cancel: &CancellationToken,
) -> Result<String, ClientError>
where
    W: WalletHandle + ?Sized,
    C: ChainClient + ?Sized,
{
    // Every supplied wallet must be submittable before anything touches the network
    resolve_label(from)?;
    if let Some(second) = to {
        resolve_label(second)?;
    }

    let at = chain_info(chain, cancel, plan.query_deadline).await?;
    info!("Master chain block: {}", at);

    let (sender, destination) = match to {
        Some(second) => {
            let selection =
                select_sender(from, second, chain, &at, cancel, plan.query_deadline).await?;
            info!(
                "Sender {} ({}), recipient {} ({})",
                selection.sender.address(),
                format_tons(selection.sender_balance),
                selection.recipient.address(),
                format_tons(selection.recipient_balance)
            );
            (selection.sender, selection.recipient.address().to_string())
        }
        None => {
            let balance = balance_of(chain, from.address(), &at, cancel, plan.query_deadline).await?;
            info!("Wallet balance: {}", format_tons(balance));
            let destination = plan.destination.clone().ok_or_else(|| ClientError::AddressParseError {
                input: String::new(),
                reason: "no destination address".to_string(),
            })?;
            (from, destination)
        }
    };
    let label = resolve_label(sender)?;

    let addon = jitter.sample_addon();
    let amount = plan.amount.checked_add(addon).ok_or_else(|| {
        ClientError::TransferBuildError(format!("amount {} + addon {} overflows", plan.amount, addon))
    })?;
    if addon > 0 {
        info!("Amount addon: {} (total {})", addon, amount);
    }
    pause(jitter.sample_pause(), cancel).await?;

    // 1 transfer to the destination + the relay tip
    let message = compose(
        sender,
        &destination,
        amount,
        plan.tip,
        &plan.comment,
        cancel,
        plan.query_deadline,
    )
    .await?;
    let body_hash = message.body_hash()?;
    info!(body_hash = %body_hash, wallet = %label, "Submitting transaction");

    let hash = relay.submit(&message, label, cancel).await?;
    info!("tx sent, msg body hash: {}", hash);
    Ok(hash)
}
