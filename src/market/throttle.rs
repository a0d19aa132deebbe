//! Pacing between consecutive marketplace calls.

use crate::config::Config;
use rand::RngExt;
use std::time::Duration;
use tracing::debug;

/// Enforces a pause between marketplace calls to stay under bot detection.
///
/// The first call goes through immediately; every later call waits the base
/// delay plus a random jitter.
#[derive(Debug)]
pub struct Throttle {
    delay_ms: u64,
    jitter_ms: u64,
    primed: bool,
}

impl Throttle {
    pub fn new(delay_ms: u64, jitter_ms: u64) -> Self {
        Self { delay_ms, jitter_ms, primed: false }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.delay_ms, config.delay_jitter_ms)
    }

    /// Waits before the next call if one has already been made.
    pub async fn wait(&mut self) {
        if !self.primed {
            self.primed = true;
            return;
        }

        let pause = self.next_pause();
        if pause.is_zero() {
            return;
        }

        debug!("Delaying {}ms", pause.as_millis());
        tokio::time::sleep(pause).await;
    }

    fn next_pause(&self) -> Duration {
        let jitter = if self.jitter_ms > 0 { rand::rng().random_range(0..=self.jitter_ms) } else { 0 };
        Duration::from_millis(self.delay_ms + jitter)
    }
}
