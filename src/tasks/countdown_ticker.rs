//! Countdown ticker background task

use std::{sync::Arc, time::Duration};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, error, info, warn};

use crate::state::{AppState, ControlEvent};

/// Interval between ticks of a running countdown
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Background task that ticks the countdown once per second while it runs.
///
/// `control_rx` should be subscribed before the task is spawned so that a
/// start issued right after spawning is not missed.
pub async fn countdown_task(state: Arc<AppState>, mut control_rx: broadcast::Receiver<ControlEvent>) {
    info!("Starting countdown ticker");

    loop {
        // Wait for a countdown to start
        match control_rx.recv().await {
            Ok(ControlEvent::Started) => {
                debug!("Ticker woke up for a new countdown");
            }
            Ok(event) => {
                debug!("Ticker idle, ignoring {:?}", event);
                continue;
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!("Ticker missed {} control events", skipped);
                continue;
            }
            Err(RecvError::Closed) => {
                info!("Control channel closed, stopping ticker");
                return;
            }
        }

        let mut interval = tokio::time::interval(TICK_INTERVAL);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    match state.tick() {
                        Ok(Some(tick)) if tick.expired => {
                            info!("Countdown expired, ticker going idle");
                            break;
                        }
                        Ok(Some(_)) => {}
                        Ok(None) => {
                            debug!("Countdown no longer running, ticker going idle");
                            break;
                        }
                        Err(e) => {
                            error!("Failed to tick countdown: {}", e);
                        }
                    }
                }

                // Control change - restart or leave the ticking loop
                event = control_rx.recv() => {
                    match event {
                        Ok(ControlEvent::Started) => {
                            debug!("Countdown restarted, resetting tick interval");
                            interval.reset();
                        }
                        Ok(event) => {
                            debug!("Ticker received {:?}, going idle", event);
                            break;
                        }
                        Err(RecvError::Lagged(skipped)) => {
                            warn!("Ticker missed {} control events", skipped);
                        }
                        Err(RecvError::Closed) => {
                            info!("Control channel closed, stopping ticker");
                            return;
                        }
                    }
                }
            }
        }
    }
}
