//! Writes a default configuration file.

use crate::config::ClientConfig;
use crate::errors::CliError;
use std::path::Path;

/// Runs the init-config command.
pub fn run<P: AsRef<Path>>(path: P) -> Result<(), CliError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    ClientConfig::default().to_file(path)
}
