//! The engine facade: classification, persistence, detached correlation.
//!
//! `ingest` is the transport-facing entry point. It classifies and
//! persists synchronously, then hands SECURITY events to the correlator
//! on a spawned task: a correlation failure is logged and abandoned, and
//! never surfaces to the caller whose request was already answered.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use tracing::{error, instrument, warn};

use incidra_config::IncidraConfig;
use incidra_detection::signatures::Rule;
use incidra_detection::{Classifier, SignatureMatcher};
use incidra_store::{EventStore, IncidentStore};
use incidra_telemetry::MetricsRecorder;

use crate::correlator::{CorrelationOutcome, IncidentCorrelator};
use crate::error::EngineError;
use crate::ingest::{build_event, IngestReport, RawRequest, Verdict};
use crate::notifier::{Notification, Notifier};
use crate::sweeper::RetentionSweeper;

pub struct ThreatEngine {
    events: Arc<dyn EventStore>,
    notifier: Arc<dyn Notifier>,
    classifier: Classifier,
    correlator: Arc<IncidentCorrelator>,
    metrics: Arc<MetricsRecorder>,
    block_mode: bool,
    retention: incidra_config::RetentionConfig,
}

impl ThreatEngine {
    pub fn new(
        events: Arc<dyn EventStore>,
        incidents: Arc<dyn IncidentStore>,
        notifier: Arc<dyn Notifier>,
        config: &IncidraConfig,
        metrics: Arc<MetricsRecorder>,
    ) -> Self {
        let rules = config
            .detection
            .rules
            .iter()
            .map(|r| Rule {
                name: r.name.clone(),
                pattern: r.pattern.clone(),
                family: r.family,
                severity: r.severity,
                active: r.active,
            })
            .collect();
        let matcher = Arc::new(SignatureMatcher::with_rules(rules));
        metrics.detection_degraded.set(matcher.is_degraded() as i64);

        let correlator = Arc::new(IncidentCorrelator::new(
            events.clone(),
            incidents,
            notifier.clone(),
            metrics.clone(),
            &config.correlation,
        ));

        Self {
            events,
            notifier,
            classifier: Classifier::new(matcher),
            correlator,
            metrics,
            block_mode: config.detection.block_mode,
            retention: config.retention.clone(),
        }
    }

    /// Ingest one raw request: classify, persist, publish, and correlate
    /// detached. Only persistence failures surface to the caller.
    #[instrument(skip_all, fields(source = %raw.source_addr, endpoint = %raw.endpoint))]
    pub async fn ingest(&self, raw: RawRequest) -> Result<IngestReport, EngineError> {
        let report = self.persist_at(raw, Utc::now()).await?;

        if report.event.is_security() {
            let correlator = self.correlator.clone();
            let metrics = self.metrics.clone();
            let event = report.event.clone();
            tokio::spawn(async move {
                let started = Instant::now();
                match correlator.correlate(&event, Utc::now()).await {
                    Ok(_) => {
                        metrics
                            .correlation_latency
                            .observe(started.elapsed().as_nanos() as f64);
                    }
                    Err(e) => {
                        metrics.correlation_failures.inc();
                        error!(error = %e, event_id = %event.id, "correlation abandoned");
                    }
                }
            });
        }
        Ok(report)
    }

    /// Deterministic variant for replay tooling and tests: correlation
    /// runs inline at a pinned `now`. Correlation failures are swallowed
    /// exactly like the detached path swallows them.
    pub async fn ingest_sync(
        &self,
        raw: RawRequest,
        now: DateTime<Utc>,
    ) -> Result<(IngestReport, Option<CorrelationOutcome>), EngineError> {
        let report = self.persist_at(raw, now).await?;
        let outcome = if report.event.is_security() {
            let started = Instant::now();
            match self.correlator.correlate(&report.event, now).await {
                Ok(outcome) => {
                    self.metrics
                        .correlation_latency
                        .observe(started.elapsed().as_nanos() as f64);
                    Some(outcome)
                }
                Err(e) => {
                    self.metrics.correlation_failures.inc();
                    error!(error = %e, event_id = %report.event.id, "correlation abandoned");
                    None
                }
            }
        } else {
            None
        };
        Ok((report, outcome))
    }

    async fn persist_at(
        &self,
        raw: RawRequest,
        now: DateTime<Utc>,
    ) -> Result<IngestReport, EngineError> {
        let (event, hit) = build_event(&raw, &self.classifier, now);
        self.metrics.events_ingested.inc();
        self.events.insert(event.clone()).await?;

        if let Err(e) = self.notifier.publish(Notification::LogCreated(event.clone())).await {
            warn!(error = %e, "notification publish failed");
        }

        let verdict = match hit {
            Some(hit) if self.block_mode => {
                Verdict::Block { family: hit.family, pattern: hit.pattern }
            }
            _ => Verdict::Allow,
        };
        Ok(IngestReport { event, verdict })
    }

    /// Retention sweeper wired to this engine's event store and metrics.
    pub fn sweeper(&self) -> Arc<RetentionSweeper> {
        Arc::new(RetentionSweeper::new(
            self.events.clone(),
            self.metrics.clone(),
            &self.retention,
        ))
    }

    /// The live signature matcher, for admin rule hot reloads.
    pub fn matcher(&self) -> &SignatureMatcher {
        self.classifier.matcher()
    }

    pub fn metrics(&self) -> &MetricsRecorder {
        &self.metrics
    }
}
