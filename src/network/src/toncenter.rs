//! Chain queries over a toncenter-style JSON-RPC endpoint.

use crate::types::{AddressInformation, GetMethodResult, MasterchainInfo, RpcRequest, RpcResponse};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;
use ttc_core::{Address, ChainClient, ChainRef, ClientError, Nanotons};

/// Per-request bound on chain queries; callers apply their own deadline too.
const RPC_TIMEOUT: Duration = Duration::from_secs(30);

/// Header carrying the optional API key.
const API_KEY_HEADER: &str = "X-API-Key";

/// JSON-RPC chain client.
#[derive(Debug, Clone)]
pub struct TonCenterClient {
    http: reqwest::Client,
    url: String,
    api_key: Option<String>,
}

impl TonCenterClient {
    /// Creates a client for the JSON-RPC endpoint at `url`.
    pub fn new(url: impl Into<String>, api_key: Option<String>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(RPC_TIMEOUT)
            .build()
            .map_err(|e| ClientError::TransportError(format!("failed to create HTTP client: {}", e)))?;
        Ok(Self {
            http,
            url: url.into(),
            api_key,
        })
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, String> {
        let mut request = self.http.post(&self.url).json(&RpcRequest::new(method, params));
        if let Some(key) = &self.api_key {
            request = request.header(API_KEY_HEADER, key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| format!("failed to connect to {}: {}", self.url, e))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| format!("failed to read response: {}", e))?;
        debug!("{} -> {}: {}", method, status, text);

        if text.is_empty() {
            return Err(format!("empty response to {} (status {})", method, status));
        }
        let envelope: RpcResponse<T> = serde_json::from_str(&text)
            .map_err(|e| format!("failed to parse {} response: {}", method, e))?;

        if envelope.ok == Some(false) || envelope.error.is_some() {
            let detail = envelope
                .error
                .map(|e| e.as_str().map(str::to_string).unwrap_or_else(|| e.to_string()))
                .unwrap_or_else(|| "unknown error".to_string());
            return Err(match envelope.code {
                Some(code) => format!("{} failed: {} (code: {})", method, detail, code),
                None => format!("{} failed: {}", method, detail),
            });
        }

        envelope
            .result
            .ok_or_else(|| format!("no result in {} response", method))
    }
}

#[async_trait]
impl ChainClient for TonCenterClient {
    async fn masterchain_info(&self) -> Result<ChainRef, ClientError> {
        let info: MasterchainInfo = self
            .call("getMasterchainInfo", json!({}))
            .await
            .map_err(ClientError::ChainQueryFailed)?;
        Ok(ChainRef {
            workchain: info.last.workchain,
            shard: info.last.shard,
            seqno: info.last.seqno,
        })
    }

    async fn balance(&self, address: &Address, at: &ChainRef) -> Result<Nanotons, ClientError> {
        let info: AddressInformation = self
            .call(
                "getAddressInformation",
                json!({ "address": address.to_string(), "seqno": at.seqno }),
            )
            .await
            .map_err(ClientError::BalanceQueryFailed)?;
        info.balance.parse().map_err(|_| {
            ClientError::BalanceQueryFailed(format!("invalid balance '{}' for {}", info.balance, address))
        })
    }

    async fn seqno(&self, address: &Address) -> Result<u32, ClientError> {
        let result: GetMethodResult = self
            .call(
                "runGetMethod",
                json!({ "address": address.to_string(), "method": "seqno", "stack": [] }),
            )
            .await
            .map_err(ClientError::ChainQueryFailed)?;
        parse_seqno(&result).map_err(ClientError::ChainQueryFailed)
    }
}

/// Reads the seqno from a `runGetMethod` stack such as `[["num", "0x1a"]]`.
fn parse_seqno(result: &GetMethodResult) -> Result<u32, String> {
    if result.exit_code != 0 {
        return Err(format!("seqno get-method exited with {}", result.exit_code));
    }
    let value = result
        .stack
        .first()
        .and_then(|entry| entry.get(1))
        .and_then(Value::as_str)
        .ok_or_else(|| "seqno missing from stack".to_string())?;
    let digits = value.trim_start_matches("0x");
    u32::from_str_radix(digits, 16).map_err(|e| format!("invalid seqno '{}': {}", value, e))
}
