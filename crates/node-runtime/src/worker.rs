//! Storage-job sealing worker.
//!
//! Drives a [`JobSealer`] on a fixed period until the shutdown channel flips.

use fh_network_backend::JobSealer;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

/// Run sealing rounds every `period` until `shutdown` reports `true` or its
/// sender is dropped.
pub async fn run_sealing_worker(
    sealer: Arc<dyn JobSealer>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    info!("[node] Sealing worker started (every {:?})", period);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let advanced = sealer.seal_pending().await;
                if advanced > 0 {
                    debug!("[node] Sealing round advanced {} job(s)", advanced);
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }

    info!("[node] Sealing worker stopped");
}
