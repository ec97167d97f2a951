//! Chain query seam and the guard applied to every suspension point.

use crate::address::Address;
use crate::errors::ClientError;
use crate::types::{ChainRef, Nanotons};
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Read-only access to chain state.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Returns the latest masterchain block.
    async fn masterchain_info(&self) -> Result<ChainRef, ClientError>;

    /// Returns the balance of `address` as of `at`.
    async fn balance(&self, address: &Address, at: &ChainRef) -> Result<Nanotons, ClientError>;

    /// Returns the current seqno of a seqno-ordered wallet.
    async fn seqno(&self, address: &Address) -> Result<u32, ClientError>;
}

/// Why a guarded future did not complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupted {
    Cancelled,
    DeadlineExceeded(Duration),
}

/// Runs `fut` until it completes, `deadline` passes, or `cancel` fires.
pub async fn guarded<F>(
    cancel: &CancellationToken,
    deadline: Duration,
    fut: F,
) -> Result<F::Output, Interrupted>
where
    F: Future,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(Interrupted::Cancelled),
        res = tokio::time::timeout(deadline, fut) => {
            res.map_err(|_| Interrupted::DeadlineExceeded(deadline))
        }
    }
}

/// Fetches the chain reference point under the guard.
pub async fn chain_info<C: ChainClient + ?Sized>(
    chain: &C,
    cancel: &CancellationToken,
    deadline: Duration,
) -> Result<ChainRef, ClientError> {
    match guarded(cancel, deadline, chain.masterchain_info()).await {
        Ok(Ok(info)) => Ok(info),
        Ok(Err(ClientError::ChainQueryFailed(msg))) => Err(ClientError::ChainQueryFailed(msg)),
        Ok(Err(e)) => Err(ClientError::ChainQueryFailed(e.to_string())),
        Err(Interrupted::Cancelled) => Err(ClientError::Cancelled),
        Err(Interrupted::DeadlineExceeded(d)) => Err(ClientError::ChainQueryFailed(format!(
            "no answer within {:?}",
            d
        ))),
    }
}

/// Fetches one balance under the guard.
pub async fn balance_of<C: ChainClient + ?Sized>(
    chain: &C,
    address: &Address,
    at: &ChainRef,
    cancel: &CancellationToken,
    deadline: Duration,
) -> Result<Nanotons, ClientError> {
    match guarded(cancel, deadline, chain.balance(address, at)).await {
        Ok(Ok(balance)) => Ok(balance),
        Ok(Err(ClientError::BalanceQueryFailed(msg))) => Err(ClientError::BalanceQueryFailed(msg)),
        Ok(Err(e)) => Err(ClientError::BalanceQueryFailed(format!("{}: {}", address, e))),
        Err(Interrupted::Cancelled) => Err(ClientError::Cancelled),
        Err(Interrupted::DeadlineExceeded(d)) => Err(ClientError::BalanceQueryFailed(format!(
            "{}: no answer within {:?}",
            address, d
        ))),
    }
}

/// Fetches a wallet's seqno under the guard.
pub async fn seqno_of<C: ChainClient + ?Sized>(
    chain: &C,
    address: &Address,
    cancel: &CancellationToken,
    deadline: Duration,
) -> Result<u32, ClientError> {
    match guarded(cancel, deadline, chain.seqno(address)).await {
        Ok(Ok(seqno)) => Ok(seqno),
        Ok(Err(e)) => Err(ClientError::MessageAssemblyError(format!(
            "failed to fetch seqno: {}",
            e
        ))),
        Err(Interrupted::Cancelled) => Err(ClientError::Cancelled),
        Err(Interrupted::DeadlineExceeded(d)) => Err(ClientError::MessageAssemblyError(format!(
            "no seqno for {} within {:?}",
            address, d
        ))),
    }
}
