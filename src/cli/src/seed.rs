//! Seed phrase files.

use crate::errors::CliError;
use std::path::Path;
use ttc_core::wallet::SEED_WORDS;

/// Reads a whitespace-separated 24-word seed phrase.
pub fn read_phrase<P: AsRef<Path>>(path: P) -> Result<Vec<String>, CliError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|e| {
        CliError::InvalidPhrase(format!("failed to read phrase from '{}', {}", path.display(), e))
    })?;

    let words: Vec<String> = contents.split_whitespace().map(str::to_string).collect();
    if words.len() != SEED_WORDS {
        return Err(CliError::InvalidPhrase(format!("invalid phrase, length {}", words.len())));
    }
    Ok(words)
}
