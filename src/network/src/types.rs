//! Wire types for the relay and chain endpoints.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use ttc_core::{ClientError, ExternalMessage, WalletLabel};

/// Encoded transaction inside a [`SubmitRequest`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitTransaction {
    /// Base64 of the canonical message encoding
    pub content: String,
}

/// Request body for `POST /api/v2/submit`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitRequest {
    /// The encoded transaction
    pub transaction: SubmitTransaction,
    /// Wallet type the relay validates the payload against
    pub wallet: WalletLabel,
}

impl SubmitRequest {
    /// Encodes `message` for submission under `label`.
    pub fn new(message: &ExternalMessage, label: WalletLabel) -> Result<Self, ClientError> {
        let payload = message.encode()?;
        Ok(Self {
            transaction: SubmitTransaction {
                content: STANDARD.encode(payload),
            },
            wallet: label,
        })
    }
}

/// Success body of the submit endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitResponse {
    /// Hash of the submitted message body
    pub msg_body_hash: String,
}

/// Error body of the submit endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Relay error code
    pub code: i64,
    /// Relay error message
    pub message: String,
}

/// JSON-RPC 2.0 request sent to the chain endpoint.
#[derive(Debug, Serialize)]
pub struct RpcRequest<'a> {
    pub jsonrpc: &'static str,
    pub id: &'static str,
    pub method: &'a str,
    pub params: Value,
}

impl<'a> RpcRequest<'a> {
    pub fn new(method: &'a str, params: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id: "1",
            method,
            params,
        }
    }
}

/// JSON-RPC response envelope of the chain endpoint.
#[derive(Debug, Deserialize)]
pub struct RpcResponse<T> {
    #[serde(default)]
    pub ok: Option<bool>,
    pub result: Option<T>,
    #[serde(default)]
    pub error: Option<Value>,
    #[serde(default)]
    pub code: Option<i64>,
}

/// Block identifier as reported by the chain endpoint.
#[derive(Clone, Debug, Deserialize)]
pub struct BlockId {
    pub workchain: i32,
    #[serde(deserialize_with = "string_or_number")]
    pub shard: String,
    pub seqno: u32,
}

/// Result of `getMasterchainInfo`.
#[derive(Clone, Debug, Deserialize)]
pub struct MasterchainInfo {
    pub last: BlockId,
}

/// Result of `getAddressInformation`.
#[derive(Clone, Debug, Deserialize)]
pub struct AddressInformation {
    #[serde(deserialize_with = "string_or_number")]
    pub balance: String,
}

/// Result of `runGetMethod`.
#[derive(Clone, Debug, Deserialize)]
pub struct GetMethodResult {
    pub exit_code: i32,
    pub stack: Vec<Vec<Value>>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {}",
            other
        ))),
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)
    }
}
