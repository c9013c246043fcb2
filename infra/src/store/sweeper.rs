//! Periodic removal of expired OTP records
//!
//! Sweeping only reclaims space. Verification decides expiry against its own
//! clock and never depends on when (or whether) a sweep runs.

use otp_core::repositories::OtpStore;
use otp_core::services::{Clock, SystemClock};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::StoreError;

pub struct OtpSweeper<R: OtpStore + 'static> {
    store: Arc<R>,
    interval: Duration,
    clock: Arc<dyn Clock>,
}

impl<R: OtpStore + 'static> OtpSweeper<R> {
    pub fn new(store: Arc<R>, interval_seconds: u64) -> Self {
        Self {
            store,
            interval: Duration::from_secs(interval_seconds),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Run a single sweep
    pub async fn run_once(&self) -> Result<u64, StoreError> {
        let removed = self.store.purge_expired(self.clock.now()).await?;
        if removed > 0 {
            info!(removed, event = "otp_sweep", "Purged expired OTP records");
        } else {
            debug!(event = "otp_sweep", "No expired OTP records to purge");
        }
        Ok(removed)
    }

    /// Spawn the sweep loop. A zero interval disables it.
    pub fn start(self) -> Option<SweeperHandle> {
        if self.interval.is_zero() {
            warn!("OTP sweeper is disabled");
            return None;
        }

        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(async move {
            info!(
                "OTP sweeper started - will run every {} seconds",
                self.interval.as_secs()
            );
            let mut timer = tokio::time::interval(self.interval);

            loop {
                tokio::select! {
                    _ = timer.tick() => {
                        if let Err(e) = self.run_once().await {
                            error!(error = %e, "OTP sweep failed");
                        }
                    }
                    _ = shutdown_rx.changed() => break,
                }
            }
            info!("OTP sweeper stopped");
        });

        Some(SweeperHandle { shutdown_tx, task })
    }
}

/// Stops a running sweeper
pub struct SweeperHandle {
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SweeperHandle {
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        if let Err(e) = self.task.await {
            error!(error = %e, "OTP sweeper task panicked");
        }
    }
}
