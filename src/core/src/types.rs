//! Core types for the TON trader client.

use crate::address::Address;
use crate::errors::ClientError;
use crate::kind::WalletKind;
use byteorder::{BigEndian, WriteBytesExt};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Amount in the smallest unit (nanoton).
pub type Nanotons = u64;

/// Nanotons in one TON.
pub const NANOTONS_PER_TON: Nanotons = 1_000_000_000;

/// Longest comment a transfer may carry, in bytes.
pub const MAX_COMMENT_BYTES: usize = 1024;

/// Formats an amount as a decimal TON string, e.g. `0.25`.
pub fn format_tons(amount: Nanotons) -> String {
    let whole = amount / NANOTONS_PER_TON;
    let frac = amount % NANOTONS_PER_TON;
    if frac == 0 {
        return whole.to_string();
    }
    let frac = format!("{:09}", frac);
    format!("{}.{}", whole, frac.trim_end_matches('0'))
}

/// A masterchain block used as the reference point for state queries.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainRef {
    /// The workchain of the block
    pub workchain: i32,
    /// The shard identifier, as reported by the chain
    pub shard: String,
    /// The block sequence number
    pub seqno: u32,
}

impl fmt::Display for ChainRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.workchain, self.shard, self.seqno)
    }
}

/// One instruction to move funds to a destination.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferMessage {
    destination: Address,
    amount: Nanotons,
    bounce: bool,
    comment: Option<String>,
}

impl TransferMessage {
    /// Builds a transfer. An empty comment means no comment.
    pub fn new(
        destination: Address,
        amount: Nanotons,
        bounce: bool,
        comment: &str,
    ) -> Result<Self, ClientError> {
        if amount == 0 {
            return Err(ClientError::TransferBuildError(format!(
                "zero amount to {}",
                destination
            )));
        }
        if comment.len() > MAX_COMMENT_BYTES {
            return Err(ClientError::TransferBuildError(format!(
                "comment is {} bytes, limit is {}",
                comment.len(),
                MAX_COMMENT_BYTES
            )));
        }

        Ok(Self {
            destination,
            amount,
            bounce,
            comment: (!comment.is_empty()).then(|| comment.to_string()),
        })
    }

    pub fn destination(&self) -> &Address {
        &self.destination
    }

    pub fn amount(&self) -> Nanotons {
        self.amount
    }

    pub fn bounce(&self) -> bool {
        self.bounce
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }
}

/// How a message is ordered against the wallet's other messages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sequence {
    /// On-chain counter, must equal the wallet's current seqno.
    Seqno(u32),
    /// Highload query id, unique within the validity window.
    QueryId(u64),
}

/// The signed part of an external message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageBody {
    /// The subwallet the message is addressed to
    pub subwallet_id: u32,
    /// Unix time after which the message is rejected
    pub valid_until: u32,
    /// Sequencing state the message was built against
    pub sequence: Sequence,
    /// Ordered transfers
    pub transfers: Vec<TransferMessage>,
}

impl MessageBody {
    fn write_header(&self, buf: &mut Vec<u8>) -> std::io::Result<()> {
        buf.write_u32::<BigEndian>(self.subwallet_id)?;
        buf.write_u32::<BigEndian>(self.valid_until)?;
        match self.sequence {
            Sequence::Seqno(seqno) => {
                buf.write_u8(0)?;
                buf.write_u32::<BigEndian>(seqno)?;
            }
            Sequence::QueryId(id) => {
                buf.write_u8(1)?;
                buf.write_u64::<BigEndian>(id)?;
            }
        }
        buf.write_u8(self.transfers.len() as u8)
    }

    /// Bytes covered by the signature.
    pub fn signing_bytes(&self) -> Result<Vec<u8>, ClientError> {
        let mut buf = Vec::with_capacity(64);
        self.write_header(&mut buf)
            .map_err(|e| ClientError::MessageAssemblyError(e.to_string()))?;

        for transfer in &self.transfers {
            let encoded = bincode::serialize(transfer)
                .map_err(|e| ClientError::MessageAssemblyError(e.to_string()))?;
            buf.extend_from_slice(&encoded);
        }
        Ok(buf)
    }

    /// Hex SHA-256 of the signed bytes.
    pub fn hash(&self) -> Result<String, ClientError> {
        let bytes = self.signing_bytes()?;
        Ok(hex::encode(Sha256::digest(&bytes)))
    }
}

/// A signed bundle of transfers bound to one sender, ready for submission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalMessage {
    wallet: Address,
    kind: WalletKind,
    public_key: [u8; 32],
    body: MessageBody,
    signature: Vec<u8>,
}

impl ExternalMessage {
    pub(crate) fn new(
        wallet: Address,
        kind: WalletKind,
        public_key: [u8; 32],
        body: MessageBody,
        signature: Vec<u8>,
    ) -> Self {
        Self {
            wallet,
            kind,
            public_key,
            body,
            signature,
        }
    }

    /// The sending wallet.
    pub fn wallet(&self) -> &Address {
        &self.wallet
    }

    pub fn kind(&self) -> WalletKind {
        self.kind
    }

    pub fn body(&self) -> &MessageBody {
        &self.body
    }

    pub fn transfers(&self) -> &[TransferMessage] {
        &self.body.transfers
    }

    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    pub fn public_key(&self) -> &[u8; 32] {
        &self.public_key
    }

    /// Canonical binary form, the payload handed to the relay.
    pub fn encode(&self) -> Result<Vec<u8>, ClientError> {
        bincode::serialize(self).map_err(|e| {
            ClientError::MessageAssemblyError(format!("failed to encode external message: {}", e))
        })
    }

    /// Inverse of [`ExternalMessage::encode`].
    pub fn decode(bytes: &[u8]) -> Result<Self, ClientError> {
        bincode::deserialize(bytes).map_err(|e| {
            ClientError::MessageAssemblyError(format!("failed to decode external message: {}", e))
        })
    }

    /// Hash of the signed body.
    pub fn body_hash(&self) -> Result<String, ClientError> {
        self.body.hash()
    }
}
