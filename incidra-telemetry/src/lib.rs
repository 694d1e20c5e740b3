//! # incidra-telemetry
//!
//! Structured logging and metrics for the correlation engine.
//!
//! ### Components:
//! - `logging`: tracing-based JSON-friendly logger with OpenTelemetry
//!   attribute conventions
//! - `metrics`: Prometheus registry covering the ingest and correlation
//!   hot paths

pub mod logging;
pub mod metrics;

pub use logging::EventLogger;
pub use metrics::MetricsRecorder;
