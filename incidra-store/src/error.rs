//! Store error taxonomy.

use thiserror::Error;

/// Unified error type for both stores.
///
/// `Unavailable` models transient backend failures (timeouts, lost
/// connections). The correlator treats those as abandon-and-log, never as
/// fatal.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found: {0}")]
    NotFound(String),

    #[error("constraint violation: {0}")]
    Conflict(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}
