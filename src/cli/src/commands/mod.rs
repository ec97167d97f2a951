//! Commands for the CLI.

pub mod balance;
pub mod init_config;
pub mod send;
