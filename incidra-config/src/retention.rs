//! Event retention parameters.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::time::Duration as StdDuration;
use validator::{self, Validate};

/// Retention sweeper parameters.
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct RetentionConfig {
    /// Interval between sweeps (seconds).
    #[serde(default = "default_sweep_interval_secs")]
    #[validate(range(min = 60, max = 86400))]
    pub sweep_interval_secs: u64,

    /// Events older than this horizon are purged (hours).
    #[serde(default = "default_horizon_hours")]
    #[validate(range(min = 1, max = 168))]
    pub horizon_hours: u64,
}

fn default_sweep_interval_secs() -> u64 {
    3600
}

fn default_horizon_hours() -> u64 {
    12
}

impl RetentionConfig {
    pub fn sweep_interval(&self) -> StdDuration {
        StdDuration::from_secs(self.sweep_interval_secs)
    }

    pub fn horizon(&self) -> Duration {
        Duration::hours(self.horizon_hours as i64)
    }
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            sweep_interval_secs: default_sweep_interval_secs(),
            horizon_hours: default_horizon_hours(),
        }
    }
}
