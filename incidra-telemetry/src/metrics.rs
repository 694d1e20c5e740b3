//! ## incidra-telemetry::metrics
//! **Prometheus registry for the ingest and correlation paths**
//!
//! The `detection_degraded` gauge is the reduced-detection health signal:
//! it flips to 1 whenever a signature family has no usable pattern table.

use prometheus::{Counter, Histogram, HistogramOpts, IntGauge, Registry};

#[derive(Debug, Clone)]
pub struct MetricsRecorder {
    pub registry: Registry,
    pub events_ingested: Counter,
    pub incidents_created: Counter,
    pub incidents_updated: Counter,
    pub correlation_failures: Counter,
    pub events_swept: Counter,
    pub correlation_latency: Histogram,
    pub detection_degraded: IntGauge,
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsRecorder {
    pub fn new() -> Self {
        let registry = Registry::new();

        let events_ingested =
            Counter::new("incidra_events_ingested_total", "Total ingested events").unwrap();
        let incidents_created =
            Counter::new("incidra_incidents_created_total", "Incidents opened by the correlator")
                .unwrap();
        let incidents_updated =
            Counter::new("incidra_incidents_updated_total", "Incident update folds").unwrap();
        let correlation_failures = Counter::new(
            "incidra_correlation_failures_total",
            "Correlation attempts abandoned on store errors",
        )
        .unwrap();
        let events_swept =
            Counter::new("incidra_events_swept_total", "Events purged by the retention sweeper")
                .unwrap();

        let correlation_latency = Histogram::with_opts(
            HistogramOpts::new(
                "incidra_correlation_latency_ns",
                "Incident correlation processing time",
            )
            .buckets(vec![10_000.0, 100_000.0, 1_000_000.0, 10_000_000.0]),
        )
        .unwrap();

        let detection_degraded = IntGauge::new(
            "incidra_detection_degraded",
            "1 when a signature family has no usable pattern table",
        )
        .unwrap();

        registry.register(Box::new(events_ingested.clone())).unwrap();
        registry.register(Box::new(incidents_created.clone())).unwrap();
        registry.register(Box::new(incidents_updated.clone())).unwrap();
        registry.register(Box::new(correlation_failures.clone())).unwrap();
        registry.register(Box::new(events_swept.clone())).unwrap();
        registry.register(Box::new(correlation_latency.clone())).unwrap();
        registry.register(Box::new(detection_degraded.clone())).unwrap();

        Self {
            registry,
            events_ingested,
            incidents_created,
            incidents_updated,
            correlation_failures,
            events_swept,
            correlation_latency,
            detection_degraded,
        }
    }

    pub fn gather_metrics(&self) -> Result<String, prometheus::Error> {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let mut buffer = Vec::<u8>::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer).unwrap())
    }
}
