//! Configuration for the CLI.

use crate::errors::CliError;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;
use ttc_core::{Nanotons, WalletKind};

/// Configuration for the CLI. Command-line flags override every field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Relay base URL
    pub endpoint: String,
    /// Chain JSON-RPC endpoint
    pub rpc_uri: String,
    /// API key for the chain endpoint
    pub rpc_api_key: Option<String>,
    /// Declared type of the wallets built from seed phrases
    pub wallet_type: WalletKind,
    /// Primary transfer amount, in nanotons
    pub amount: Nanotons,
    /// Tip amount, in nanotons
    pub tip: Nanotons,
    /// Upper bound of the random pause before sending, in seconds
    pub max_pause_secs: u64,
    /// Upper bound of the random amount addon, in nanotons
    pub max_addon: Nanotons,
    /// Deadline for each chain query, in seconds
    pub query_deadline_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://eu.ton.dex.blxrbdn.com".to_string(),
            rpc_uri: "https://toncenter.com/api/v2/jsonRPC".to_string(),
            rpc_api_key: None,
            wallet_type: WalletKind::V4R2,
            amount: 250_000_000,
            tip: 15_000_000,
            max_pause_secs: 0,
            max_addon: 0,
            query_deadline_secs: 30,
        }
    }
}

impl ClientConfig {
    /// Loads configuration from a file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, CliError> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        let config = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// Saves configuration to a file.
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), CliError> {
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn query_deadline(&self) -> Duration {
        Duration::from_secs(self.query_deadline_secs)
    }
}
