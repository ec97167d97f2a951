//! Balance command for the CLI.

use crate::config::ClientConfig;
use crate::errors::CliError;
use crate::seed::read_phrase;
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;
use ttc_core::chain::{balance_of, chain_info};
use ttc_core::{Address, ChainClient, Nanotons, SeedWallet, WalletHandle, WalletKind};
use ttc_network::TonCenterClient;

/// Runs the balance command, returning the wallet's address and balance.
pub async fn run<P: AsRef<Path>>(
    config: &ClientConfig,
    wallet_path: P,
    kind: WalletKind,
    cancel: &CancellationToken,
) -> Result<(Address, Nanotons), CliError> {
    let chain = Arc::new(TonCenterClient::new(
        config.rpc_uri.clone(),
        config.rpc_api_key.clone(),
    )?);
    let wallet = SeedWallet::from_seed(chain.clone(), &read_phrase(wallet_path)?, kind)?;
    query(chain.as_ref(), &wallet, config, cancel).await
}

/// Queries the balance of `wallet` at the latest masterchain block.
pub async fn query<C, W>(
    chain: &C,
    wallet: &W,
    config: &ClientConfig,
    cancel: &CancellationToken,
) -> Result<(Address, Nanotons), CliError>
where
    C: ChainClient + ?Sized,
    W: WalletHandle + ?Sized,
{
    let at = chain_info(chain, cancel, config.query_deadline()).await?;
    info!("Getting balance for {} at {}", wallet.address(), at);

    let balance = balance_of(chain, wallet.address(), &at, cancel, config.query_deadline()).await?;
    Ok((*wallet.address(), balance))
}
