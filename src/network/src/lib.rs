//! Network clients for the TON trader client.
//!
//! This crate submits encoded external messages to the relay and answers the
//! chain queries (masterchain info, balances, seqno) the pipeline needs.

pub mod relay;
pub mod toncenter;
pub mod types;

// Re-export commonly used types and functions
pub use relay::{interpret_response, RelayClient, SUBMIT_PATH, SUBMIT_TIMEOUT};
pub use toncenter::TonCenterClient;
pub use types::{ErrorResponse, SubmitRequest, SubmitResponse};
