//! Transfer composition and wallet primitives for the TON trader client.
//!
//! This crate resolves wallet types to relay labels, selects a sender between
//! two wallets, randomizes amounts and pauses, and composes the signed
//! two-transfer message (primary transfer plus relay tip) that gets submitted.

pub mod address;
pub mod chain;
pub mod compose;
pub mod errors;
pub mod jitter;
pub mod kind;
pub mod select;
pub mod types;
pub mod wallet;

// Re-export commonly used types
pub use address::Address;
pub use chain::{guarded, ChainClient, Interrupted};
pub use compose::{compose, TransferBundle, TIP_ADDRESS};
pub use errors::ClientError;
pub use jitter::Jitter;
pub use kind::{resolve_label, WalletKind, WalletLabel};
pub use select::{select_sender, Selection};
pub use types::{ChainRef, ExternalMessage, Nanotons, TransferMessage};
pub use wallet::{SeedWallet, WalletHandle};
