//! Sender selection between two wallets.

use crate::chain::{balance_of, ChainClient};
use crate::errors::ClientError;
use crate::types::{format_tons, ChainRef, Nanotons};
use crate::wallet::WalletHandle;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Outcome of comparing two wallets' balances.
#[derive(Debug)]
pub struct Selection<'a, W: ?Sized> {
    pub sender: &'a W,
    pub recipient: &'a W,
    pub sender_balance: Nanotons,
    pub recipient_balance: Nanotons,
}

/// Picks the richer wallet as sender.
///
/// Only a strictly greater balance makes `first` the sender; on a tie `second`
/// sends.
pub async fn select_sender<'a, W, C>(
    first: &'a W,
    second: &'a W,
    chain: &C,
    at: &ChainRef,
    cancel: &CancellationToken,
    deadline: Duration,
) -> Result<Selection<'a, W>, ClientError>
where
    W: WalletHandle + ?Sized,
    C: ChainClient + ?Sized,
{
    let first_balance = balance_of(chain, first.address(), at, cancel, deadline).await?;
    let second_balance = balance_of(chain, second.address(), at, cancel, deadline).await?;
    info!(
        first = %first.address(),
        first_balance = %format_tons(first_balance),
        second = %second.address(),
        second_balance = %format_tons(second_balance),
        "Wallet balances"
    );

    let selection = if first_balance > second_balance {
        Selection {
            sender: first,
            recipient: second,
            sender_balance: first_balance,
            recipient_balance: second_balance,
        }
    } else {
        Selection {
            sender: second,
            recipient: first,
            sender_balance: second_balance,
            recipient_balance: first_balance,
        }
    };
    Ok(selection)
}
