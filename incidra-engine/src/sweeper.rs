//! Retention sweeper: periodic bulk purge of aged events.
//!
//! Incidents are never touched; their related-event lists are allowed to
//! dangle once the underlying events age out.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tracing::{error, info, instrument};

use incidra_config::RetentionConfig;
use incidra_store::EventStore;
use incidra_telemetry::MetricsRecorder;

use crate::error::EngineError;

pub struct RetentionSweeper {
    events: Arc<dyn EventStore>,
    metrics: Arc<MetricsRecorder>,
    horizon: chrono::Duration,
    interval: std::time::Duration,
}

impl RetentionSweeper {
    pub fn new(
        events: Arc<dyn EventStore>,
        metrics: Arc<MetricsRecorder>,
        config: &RetentionConfig,
    ) -> Self {
        Self {
            events,
            metrics,
            horizon: config.horizon(),
            interval: config.sweep_interval(),
        }
    }

    /// One sweep pass: purge everything older than the horizon.
    #[instrument(skip_all)]
    pub async fn run_once(&self, now: DateTime<Utc>) -> Result<u64, EngineError> {
        let cutoff = now - self.horizon;
        let deleted = self.events.delete_older_than(cutoff).await?;
        if deleted > 0 {
            info!(deleted, %cutoff, "purged aged events");
        }
        self.metrics.events_swept.inc_by(deleted as f64);
        Ok(deleted)
    }

    /// Background loop: sweeps immediately on startup, then on every tick.
    /// A failed sweep is logged and retried at the next tick.
    pub fn spawn(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            loop {
                ticker.tick().await;
                if let Err(e) = self.run_once(Utc::now()).await {
                    error!(error = %e, "retention sweep failed");
                }
            }
        })
    }
}
