//! Error types for the core crate.

use crate::kind::WalletKind;
use std::time::Duration;
use thiserror::Error;

/// Errors that abort a transfer pipeline.
///
/// Nothing is retried: every variant surfaces to the caller as-is.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The wallet variant has no label the relay accepts.
    #[error("unsupported wallet type {0}; please use one of: HighloadV2R2, HighloadV3, V4R2 or V5R1Final")]
    UnsupportedWalletKind(WalletKind),

    /// A balance query failed or ran past its deadline.
    #[error("Failed to obtain wallet balance: {0}")]
    BalanceQueryFailed(String),

    /// The chain-info query failed or ran past its deadline.
    #[error("Failed to obtain master chain info: {0}")]
    ChainQueryFailed(String),

    /// An address string could not be parsed.
    #[error("Failed to parse address '{input}': {reason}")]
    AddressParseError {
        /// The rejected input
        input: String,
        /// Why it was rejected
        reason: String,
    },

    /// A single transfer could not be built.
    #[error("Failed to generate transfer: {0}")]
    TransferBuildError(String),

    /// The transfers could not be combined into one signed message.
    #[error("Failed to build external message: {0}")]
    MessageAssemblyError(String),

    /// The relay answered with a non-200 status.
    #[error("Relay error: {message} (code: {code})")]
    RelayRejected {
        /// Relay error code
        code: i64,
        /// Relay error message
        message: String,
    },

    /// The relay could not be reached.
    #[error("Failed to send request: {0}")]
    TransportError(String),

    /// The relay did not answer in time.
    #[error("Request timed out after {0:?}")]
    TimeoutError(Duration),

    /// The relay answered with a body of the wrong shape.
    #[error("Malformed relay response: {0}")]
    MalformedResponse(String),

    /// The shared cancellation signal fired.
    #[error("Operation was cancelled")]
    Cancelled,
}

impl ClientError {
    pub(crate) fn address(input: &str, reason: impl Into<String>) -> Self {
        ClientError::AddressParseError {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}
