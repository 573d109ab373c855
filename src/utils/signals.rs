//! Signal handling for graceful shutdown

use anyhow::{anyhow, Context};
use futures::stream::StreamExt;
use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};
use signal_hook_tokio::Signals;
use tracing::info;

/// Wait for a shutdown signal (SIGTERM, SIGINT, SIGHUP) and return its number
pub async fn shutdown_signal() -> anyhow::Result<i32> {
    let mut signals = Signals::new([SIGTERM, SIGINT, SIGHUP])
        .context("Failed to create signal handler")?;
    let handle = signals.handle();

    let signal = signals
        .next()
        .await
        .ok_or_else(|| anyhow!("Signal stream ended unexpectedly"))?;
    info!("Received signal: {}", signal);

    handle.close();
    Ok(signal)
}
