//! Transaction composition.
//!
//! Every transfer goes out bundled with a tip to the relay operator, in one
//! external message: the primary transfer first, the tip second.

use crate::address::Address;
use crate::errors::ClientError;
use crate::types::{ExternalMessage, Nanotons, TransferMessage};
use crate::wallet::WalletHandle;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Where every tip is paid.
pub const TIP_ADDRESS: &str = "UQAw0AJjHbMYQobYXHBoW29ShKx1V2UjaiKanhDYBNJYDPUh";

/// Both transfers of a bundle are bounceable.
pub const BUNDLE_BOUNCE: bool = true;

/// Number of transfers in every composed message.
pub const BUNDLE_LEN: usize = 2;

/// Parses [`TIP_ADDRESS`].
pub fn tip_address() -> Result<Address, ClientError> {
    Address::parse(TIP_ADDRESS)
}

/// Comment attached to the tip transfer.
pub fn tip_comment(sender: &Address) -> String {
    format!("tip from {}", sender)
}

/// A primary transfer and its tip, in submission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferBundle {
    primary: TransferMessage,
    tip: TransferMessage,
}

impl TransferBundle {
    pub fn primary(&self) -> &TransferMessage {
        &self.primary
    }

    pub fn tip(&self) -> &TransferMessage {
        &self.tip
    }

    /// `[primary, tip]`.
    pub fn into_messages(self) -> Vec<TransferMessage> {
        vec![self.primary, self.tip]
    }
}

/// Builds the tip transfer for `from`.
pub fn build_tip<W: WalletHandle + ?Sized>(
    from: &W,
    tip: Nanotons,
) -> Result<TransferMessage, ClientError> {
    let to = tip_address()?;
    from.build_transfer(to, tip, BUNDLE_BOUNCE, &tip_comment(from.address()))
}

/// Builds the primary transfer to `to` and its tip.
pub fn build_bundle<W: WalletHandle + ?Sized>(
    from: &W,
    to: &str,
    amount: Nanotons,
    tip: Nanotons,
    comment: &str,
) -> Result<TransferBundle, ClientError> {
    let destination = Address::parse(to)?;
    let primary = from.build_transfer(destination, amount, BUNDLE_BOUNCE, comment)?;
    let tip = build_tip(from, tip)?;
    Ok(TransferBundle { primary, tip })
}

/// Composes the signed two-transfer message for one send.
pub async fn compose<W: WalletHandle + ?Sized>(
    from: &W,
    to: &str,
    amount: Nanotons,
    tip: Nanotons,
    comment: &str,
    cancel: &CancellationToken,
    deadline: Duration,
) -> Result<ExternalMessage, ClientError> {
    let bundle = build_bundle(from, to, amount, tip, comment)?;
    debug!(
        from = %from.address(),
        to = %bundle.primary().destination(),
        amount,
        tip_to = %bundle.tip().destination(),
        tip,
        "Composed transfer bundle"
    );

    let message = from
        .build_external_message(bundle.into_messages(), cancel, deadline)
        .await?;
    if message.transfers().len() != BUNDLE_LEN {
        return Err(ClientError::MessageAssemblyError(format!(
            "assembled {} transfers, expected {}",
            message.transfers().len(),
            BUNDLE_LEN
        )));
    }
    Ok(message)
}
