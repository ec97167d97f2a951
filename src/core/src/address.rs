//! Account addresses.
//!
//! Two textual forms are accepted: the 48-character user-friendly form (base64
//! in either alphabet over flags, workchain, hash and a CRC16-XMODEM checksum)
//! and the raw `workchain:hex` form.

use crate::errors::ClientError;
use base64::engine::general_purpose::{STANDARD, URL_SAFE};
use base64::Engine as _;
use crc::{Crc, CRC_16_XMODEM};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

const CRC16: Crc<u16> = Crc::<u16>::new(&CRC_16_XMODEM);

const FLAG_BOUNCEABLE: u8 = 0x11;
const FLAG_NON_BOUNCEABLE: u8 = 0x51;
const FLAG_TESTNET: u8 = 0x80;

const FRIENDLY_LEN: usize = 48;
const FRIENDLY_BYTES: usize = 36;

/// A standard account address.
///
/// Equality and hashing only consider the workchain and account hash; the
/// bounceable and testnet flags are presentation details.
#[derive(Clone, Copy, Serialize, Deserialize)]
pub struct Address {
    workchain: i8,
    hash: [u8; 32],
    bounceable: bool,
    testnet: bool,
}

impl Address {
    /// Creates a bounceable mainnet address.
    pub fn new(workchain: i8, hash: [u8; 32]) -> Self {
        Self {
            workchain,
            hash,
            bounceable: true,
            testnet: false,
        }
    }

    /// Parses either address form.
    pub fn parse(input: &str) -> Result<Self, ClientError> {
        let input = input.trim();
        if input.contains(':') {
            Self::parse_raw(input)
        } else {
            Self::parse_friendly(input)
        }
    }

    fn parse_raw(input: &str) -> Result<Self, ClientError> {
        let (wc, hex_hash) = input
            .split_once(':')
            .ok_or_else(|| ClientError::address(input, "missing workchain separator"))?;
        let workchain: i8 = wc
            .parse()
            .map_err(|_| ClientError::address(input, format!("invalid workchain '{}'", wc)))?;
        let bytes = hex::decode(hex_hash)
            .map_err(|e| ClientError::address(input, format!("invalid hash: {}", e)))?;
        if bytes.len() != 32 {
            return Err(ClientError::address(
                input,
                format!("hash is {} bytes, expected 32", bytes.len()),
            ));
        }
        let mut hash = [0u8; 32];
        hash.copy_from_slice(&bytes);
        Ok(Self::new(workchain, hash))
    }

    fn parse_friendly(input: &str) -> Result<Self, ClientError> {
        if input.len() != FRIENDLY_LEN {
            return Err(ClientError::address(
                input,
                format!("length {} is not {}", input.len(), FRIENDLY_LEN),
            ));
        }
        let normalized: String = input
            .chars()
            .map(|c| match c {
                '-' => '+',
                '_' => '/',
                other => other,
            })
            .collect();
        let bytes = STANDARD
            .decode(normalized)
            .map_err(|e| ClientError::address(input, format!("invalid base64: {}", e)))?;
        if bytes.len() != FRIENDLY_BYTES {
            return Err(ClientError::address(input, "decoded length is not 36 bytes"));
        }

        let expected = u16::from_be_bytes([bytes[34], bytes[35]]);
        if CRC16.checksum(&bytes[..34]) != expected {
            return Err(ClientError::address(input, "checksum mismatch"));
        }

        let testnet = bytes[0] & FLAG_TESTNET != 0;
        let bounceable = match bytes[0] & !FLAG_TESTNET {
            FLAG_BOUNCEABLE => true,
            FLAG_NON_BOUNCEABLE => false,
            tag => {
                return Err(ClientError::address(
                    input,
                    format!("unknown address tag 0x{:02x}", tag),
                ))
            }
        };

        let mut hash = [0u8; 32];
        hash.copy_from_slice(&bytes[2..34]);
        Ok(Self {
            workchain: bytes[1] as i8,
            hash,
            bounceable,
            testnet,
        })
    }

    pub fn workchain(&self) -> i8 {
        self.workchain
    }

    pub fn hash(&self) -> &[u8; 32] {
        &self.hash
    }

    pub fn is_bounceable(&self) -> bool {
        self.bounceable
    }

    pub fn is_testnet(&self) -> bool {
        self.testnet
    }

    /// Raw `workchain:hex` form.
    pub fn to_raw(&self) -> String {
        format!("{}:{}", self.workchain, hex::encode(self.hash))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut bytes = [0u8; FRIENDLY_BYTES];
        bytes[0] = if self.bounceable {
            FLAG_BOUNCEABLE
        } else {
            FLAG_NON_BOUNCEABLE
        };
        if self.testnet {
            bytes[0] |= FLAG_TESTNET;
        }
        bytes[1] = self.workchain as u8;
        bytes[2..34].copy_from_slice(&self.hash);
        let crc = CRC16.checksum(&bytes[..34]);
        bytes[34..].copy_from_slice(&crc.to_be_bytes());
        f.write_str(&URL_SAFE.encode(bytes))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

impl FromStr for Address {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Address::parse(s)
    }
}

impl PartialEq for Address {
    fn eq(&self, other: &Self) -> bool {
        self.workchain == other.workchain && self.hash == other.hash
    }
}

impl Eq for Address {}

impl Hash for Address {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.workchain.hash(state);
        self.hash.hash(state);
    }
}
