//! # incidra-engine
//!
//! The threat correlation engine: ingestion, incident correlation under
//! per-key mutual exclusion, lifecycle notifications, and retention.
//!
//! ### Key Submodules:
//! - `engine`: the `ThreatEngine` facade the transport layer talks to
//! - `correlator`: window counting and find-or-create, the concurrency
//!   critical section
//! - `sweeper`: periodic purge of aged events
//! - `notifier`: injected fan-out seam

pub mod correlator;
pub mod engine;
pub mod error;
pub mod ingest;
pub mod key_lock;
pub mod notifier;
pub mod sweeper;

pub use correlator::{CorrelationOutcome, IncidentCorrelator};
pub use engine::ThreatEngine;
pub use error::EngineError;
pub use ingest::{IngestReport, RawRequest, Verdict};
pub use notifier::{ChannelNotifier, Notification, Notifier, NotifyError, TracingNotifier};
pub use sweeper::RetentionSweeper;
