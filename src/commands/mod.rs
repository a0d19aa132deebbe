//! CLI command implementations.

pub mod batch;
pub mod estimate;

pub use batch::{BatchCommand, BatchOptions};
pub use estimate::{EstimateCommand, QuoteCommand};

use crate::market::Market;
use anyhow::{anyhow, Result};
use std::future::Future;
use tracing::warn;

/// Runs `work` to completion unless the user presses Ctrl-C first.
pub(crate) async fn until_interrupted<T>(work: impl Future<Output = T>) -> Result<T> {
    tokio::select! {
        output = work => Ok(output),
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted, shutting down");
            Err(anyhow!("Interrupted"))
        }
    }
}

/// Closes the market once the command's outcome is known.
pub(crate) async fn finish<T>(market: Market, outcome: Result<T>) -> Result<T> {
    keep_outcome(outcome, market.close().await)
}

/// A failed shutdown is logged; it never replaces finished output.
fn keep_outcome<T>(outcome: Result<T>, closed: Result<()>) -> Result<T> {
    if let Err(e) = closed {
        warn!("Failed to close market source: {:#}", e);
    }
    outcome
}
