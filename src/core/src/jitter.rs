//! Randomized pre-send pause and amount addon.

use crate::errors::ClientError;
use crate::types::Nanotons;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Samples pauses and amount addons. A zero maximum disables either.
#[derive(Debug, Clone)]
pub struct Jitter {
    max_pause: Duration,
    max_addon: Nanotons,
    rng: StdRng,
}

impl Jitter {
    /// Creates a sampler seeded from OS entropy.
    pub fn new(max_pause_secs: u64, max_addon: Nanotons) -> Self {
        Self::with_rng(max_pause_secs, max_addon, StdRng::from_entropy())
    }

    /// Creates a reproducible sampler.
    pub fn seeded(max_pause_secs: u64, max_addon: Nanotons, seed: u64) -> Self {
        Self::with_rng(max_pause_secs, max_addon, StdRng::seed_from_u64(seed))
    }

    fn with_rng(max_pause_secs: u64, max_addon: Nanotons, rng: StdRng) -> Self {
        Self {
            max_pause: Duration::from_secs(max_pause_secs),
            max_addon,
            rng,
        }
    }

    /// A pause in `[0, max_pause)`, millisecond resolution.
    pub fn sample_pause(&mut self) -> Duration {
        let max_ms = self.max_pause.as_millis() as u64;
        if max_ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(self.rng.gen_range(0..max_ms))
    }

    /// An addon in `[0, max_addon)`.
    pub fn sample_addon(&mut self) -> Nanotons {
        if self.max_addon == 0 {
            return 0;
        }
        self.rng.gen_range(0..self.max_addon)
    }
}

/// Waits for `pause`, returning early with `Cancelled` if `cancel` fires.
pub async fn pause(pause: Duration, cancel: &CancellationToken) -> Result<(), ClientError> {
    if pause.is_zero() {
        return Ok(());
    }
    info!("Pausing for {:?} before sending", pause);
    tokio::select! {
        _ = cancel.cancelled() => Err(ClientError::Cancelled),
        _ = tokio::time::sleep(pause) => Ok(()),
    }
}
