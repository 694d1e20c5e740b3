//! Correlation window parameters.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use validator::{self, Validate};

use crate::validation;

/// Incident correlation parameters.
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct CorrelationConfig {
    /// Trailing window used for occurrence counting (seconds).
    #[serde(default = "default_window_secs")]
    #[validate(range(min = 10, max = 86400))]
    pub window_secs: u64,

    /// Event subtypes that never produce incident work.
    #[serde(default = "default_ignored_subtypes")]
    #[validate(custom(function = validation::validate_subtype_list))]
    pub ignored_subtypes: Vec<String>,
}

fn default_window_secs() -> u64 {
    300
}

fn default_ignored_subtypes() -> Vec<String> {
    vec!["Expired Token".to_string()]
}

impl CorrelationConfig {
    pub fn window(&self) -> Duration {
        Duration::seconds(self.window_secs as i64)
    }
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self {
            window_secs: default_window_secs(),
            ignored_subtypes: default_ignored_subtypes(),
        }
    }
}
