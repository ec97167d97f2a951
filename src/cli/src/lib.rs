//! Command-line client for the TON trader relay.

pub mod commands;
pub mod config;
pub mod errors;
pub mod seed;

// Re-export commonly used types and functions
pub use commands::{balance, init_config, send};
pub use config::ClientConfig;
pub use errors::CliError;
pub use seed::read_phrase;
