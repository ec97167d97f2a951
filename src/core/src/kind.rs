//! Wallet variants and the labels the relay accepts for them.

use crate::errors::ClientError;
use crate::wallet::WalletHandle;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Signing and sequencing scheme of a wallet contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WalletKind {
    V3,
    V4R2,
    V5R1Beta,
    V5R1Final,
    HighloadV2R2,
    HighloadV3,
}

impl WalletKind {
    /// Every known variant, supported or not.
    pub const ALL: [WalletKind; 6] = [
        WalletKind::V3,
        WalletKind::V4R2,
        WalletKind::V5R1Beta,
        WalletKind::V5R1Final,
        WalletKind::HighloadV2R2,
        WalletKind::HighloadV3,
    ];

    /// Whether the wallet orders messages with an on-chain seqno.
    pub fn uses_seqno(&self) -> bool {
        !matches!(self, WalletKind::HighloadV2R2 | WalletKind::HighloadV3)
    }

    /// Most transfers one external message may carry.
    pub fn max_messages(&self) -> usize {
        match self {
            WalletKind::V3 | WalletKind::V4R2 => 4,
            WalletKind::V5R1Beta | WalletKind::V5R1Final => 255,
            WalletKind::HighloadV2R2 | WalletKind::HighloadV3 => 254,
        }
    }

    /// Tag mixed into the derived account hash.
    pub(crate) fn code_tag(&self) -> u8 {
        match self {
            WalletKind::V3 => 3,
            WalletKind::V4R2 => 4,
            WalletKind::V5R1Beta => 5,
            WalletKind::V5R1Final => 6,
            WalletKind::HighloadV2R2 => 0x22,
            WalletKind::HighloadV3 => 0x33,
        }
    }
}

impl fmt::Display for WalletKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl FromStr for WalletKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "v3" => Ok(WalletKind::V3),
            "v4r2" => Ok(WalletKind::V4R2),
            "v5r1beta" => Ok(WalletKind::V5R1Beta),
            "v5r1final" => Ok(WalletKind::V5R1Final),
            "highloadv2r2" => Ok(WalletKind::HighloadV2R2),
            "highloadv3" => Ok(WalletKind::HighloadV3),
            other => Err(format!(
                "unknown wallet type '{}', expected one of: v3, v4r2, v5r1beta, v5r1final, highloadv2r2, highloadv3",
                other
            )),
        }
    }
}

/// Wallet type label sent to the relay alongside a payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WalletLabel {
    HighloadV2R2,
    HighloadV3,
    V4R2,
    V5R1Final,
}

/// Variants the relay can validate. Anything absent here is rejected.
const SUPPORTED: [(WalletKind, WalletLabel); 4] = [
    (WalletKind::HighloadV2R2, WalletLabel::HighloadV2R2),
    (WalletKind::HighloadV3, WalletLabel::HighloadV3),
    (WalletKind::V4R2, WalletLabel::V4R2),
    (WalletKind::V5R1Final, WalletLabel::V5R1Final),
];

impl WalletLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            WalletLabel::HighloadV2R2 => "HighloadV2R2",
            WalletLabel::HighloadV3 => "HighloadV3",
            WalletLabel::V4R2 => "V4R2",
            WalletLabel::V5R1Final => "V5R1Final",
        }
    }
}

impl fmt::Display for WalletLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<WalletKind> for WalletLabel {
    type Error = ClientError;

    fn try_from(kind: WalletKind) -> Result<Self, Self::Error> {
        SUPPORTED
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, label)| *label)
            .ok_or(ClientError::UnsupportedWalletKind(kind))
    }
}

/// Resolves the relay label for a wallet.
pub fn resolve_label<W: WalletHandle + ?Sized>(wallet: &W) -> Result<WalletLabel, ClientError> {
    WalletLabel::try_from(wallet.kind())
}
