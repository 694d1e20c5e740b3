//! ## incidra-telemetry::logging
//! **Structured logging with tracing and OpenTelemetry**
//!
//! Security-relevant happenings (detections, incident lifecycle changes,
//! sweeps) go through [`EventLogger::log_event`] so they carry a uniform
//! span shape that downstream collectors can key on.

use opentelemetry::KeyValue;
use tracing::{info_span, Instrument};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Clone)]
pub struct EventLogger;

impl EventLogger {
    /// Install the global subscriber with the "info" default filter.
    pub fn init() {
        Self::init_with_filter("info")
    }

    /// Install the global subscriber; `RUST_LOG` overrides `default_filter`.
    pub fn init_with_filter(default_filter: &str) {
        fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new(default_filter)),
            )
            .with_thread_names(true)
            .with_span_events(FmtSpan::ENTER)
            .init()
    }

    pub async fn log_event(event_type: &str, metadata: Vec<KeyValue>) {
        let span = info_span!(
            "security_event",
            event_type = event_type,
            otel.kind = "INTERNAL"
        );

        async {
            tracing::info!(
                metadata = ?metadata,
                "Security event occurred"
            );
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[traced_test]
    #[test]
    fn test_logging() {
        tokio::runtime::Runtime::new()
            .unwrap()
            .block_on(EventLogger::log_event(
                "incident_created",
                vec![KeyValue::new("incident_id", "INC-00000000")],
            ));
        assert!(logs_contain("Security event occurred"));
    }
}
