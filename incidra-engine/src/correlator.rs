//! The incident correlator: window counting, severity, find-or-create.
//!
//! For every persisted SECURITY event the correlator recounts the
//! trailing window, assesses severity, and folds the event into the open
//! incident for its (source, type label) key, creating one when none
//! exists. The whole read-modify-write runs under a per-key lock, so the
//! at-most-one-open-incident invariant holds under concurrent ingest.
//!
//! Duplicate open incidents can still appear when the backing store is
//! shared with writers outside this process; they are merged
//! deterministically, oldest wins.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{info, instrument, warn};

use incidra_core::event::Event;
use incidra_core::incident::{type_label_for, CloseResolution, Incident};
use incidra_detection::severity::{assess, SeverityDecision};
use incidra_store::{EventQuery, EventStore, IncidentStore, StoreError};
use incidra_telemetry::MetricsRecorder;

use incidra_config::CorrelationConfig;

use crate::error::EngineError;
use crate::key_lock::KeyedMutex;
use crate::notifier::{Notification, Notifier};

/// What the correlator did with an event. Callers never infer behavior
/// from side effects.
#[derive(Debug, Clone)]
pub enum CorrelationOutcome {
    /// The event is excluded from incident handling.
    Ignored,
    /// A fresh incident was opened for the key.
    Created(Incident),
    /// The event was folded into the existing open incident.
    JoinedExisting(Incident),
}

pub struct IncidentCorrelator {
    events: Arc<dyn EventStore>,
    incidents: Arc<dyn IncidentStore>,
    notifier: Arc<dyn Notifier>,
    metrics: Arc<MetricsRecorder>,
    window: Duration,
    ignored_subtypes: Vec<String>,
    locks: KeyedMutex,
}

impl IncidentCorrelator {
    pub fn new(
        events: Arc<dyn EventStore>,
        incidents: Arc<dyn IncidentStore>,
        notifier: Arc<dyn Notifier>,
        metrics: Arc<MetricsRecorder>,
        config: &CorrelationConfig,
    ) -> Self {
        Self {
            events,
            incidents,
            notifier,
            metrics,
            window: config.window(),
            ignored_subtypes: config.ignored_subtypes.clone(),
            locks: KeyedMutex::new(),
        }
    }

    /// Correlate one persisted event at `now`.
    ///
    /// The event must already be stored: the window count includes it,
    /// which is what makes the fifth SQLI attempt in a window cross the
    /// count >= 5 threshold.
    #[instrument(skip_all, fields(source = %event.source_addr, subtype = %event.subtype))]
    pub async fn correlate(
        &self,
        event: &Event,
        now: DateTime<Utc>,
    ) -> Result<CorrelationOutcome, EngineError> {
        if !event.is_security() {
            return Ok(CorrelationOutcome::Ignored);
        }
        if self.ignored_subtypes.iter().any(|s| s == &event.subtype) {
            return Ok(CorrelationOutcome::Ignored);
        }

        let window_start = now - self.window;
        let label = type_label_for(&event.subtype);
        let lock_key = format!("{}|{}", event.source_addr, label);
        let _guard = self.locks.lock(&lock_key).await;

        let query = EventQuery::security_window(
            event.source_addr.clone(),
            event.attack_vector,
            event.subtype.clone(),
            window_start,
        );
        let count = self.events.count_matching(&query).await?;

        let severity = match assess(event.attack_vector, &event.subtype, count) {
            SeverityDecision::Ignore => return Ok(CorrelationOutcome::Ignored),
            SeverityDecision::Level(severity) => severity,
        };

        match self.open_incident_for(&event.source_addr, &label).await? {
            Some(mut incident) => {
                incident.record_observation(count, severity, now, event.id);
                let incident = self.incidents.update(incident).await?;
                info!(
                    incident_id = %incident.id,
                    severity = %incident.severity,
                    occurrences = incident.occurrence_count,
                    "updated incident"
                );
                self.metrics.incidents_updated.inc();
                self.publish(Notification::IncidentUpdated(incident.clone())).await;
                Ok(CorrelationOutcome::JoinedExisting(incident))
            }
            None => {
                let related = self.events.find_matching(&query).await?;
                let trigger = event
                    .details
                    .rule_id
                    .clone()
                    .unwrap_or_else(|| format!("{}_RULE", event.attack_vector));
                let incident = Incident::open(
                    label.clone(),
                    event.source_addr.clone(),
                    severity,
                    count,
                    window_start,
                    now,
                    related,
                    Some(trigger),
                );

                match self.incidents.create(incident).await {
                    Ok(incident) => {
                        info!(
                            incident_id = %incident.id,
                            severity = %incident.severity,
                            "created incident"
                        );
                        self.metrics.incidents_created.inc();
                        self.publish(Notification::IncidentCreated(incident.clone())).await;
                        Ok(CorrelationOutcome::Created(incident))
                    }
                    Err(StoreError::Conflict(reason)) => {
                        // A writer outside our lock won the create. Retry
                        // as an update against whatever it stored.
                        warn!(reason = %reason, "create conflicted, folding into winner");
                        let mut incident = self
                            .open_incident_for(&event.source_addr, &label)
                            .await?
                            .ok_or(StoreError::Conflict(reason))?;
                        incident.record_observation(count, severity, now, event.id);
                        let incident = self.incidents.update(incident).await?;
                        self.metrics.incidents_updated.inc();
                        self.publish(Notification::IncidentUpdated(incident.clone())).await;
                        Ok(CorrelationOutcome::JoinedExisting(incident))
                    }
                    Err(e) => Err(e.into()),
                }
            }
        }
    }

    /// The open incident for a key, merging duplicates first if an
    /// external writer violated the invariant: the oldest survives,
    /// younger ones are folded in and closed as false positives.
    async fn open_incident_for(
        &self,
        source_addr: &str,
        label: &str,
    ) -> Result<Option<Incident>, EngineError> {
        let mut open = self.incidents.find_all_open_by_key(source_addr, label).await?;
        if open.len() <= 1 {
            return Ok(open.pop());
        }

        warn!(
            source = %source_addr,
            label = %label,
            duplicates = open.len() - 1,
            "duplicate open incidents detected, merging"
        );
        let mut survivor = open.remove(0);
        for mut duplicate in open {
            for id in duplicate.related_events.drain(..) {
                if !survivor.related_events.contains(&id) {
                    survivor.related_events.push(id);
                }
            }
            survivor.severity = survivor.severity.max(duplicate.severity);
            survivor.occurrence_count = survivor.occurrence_count.max(duplicate.occurrence_count);
            if duplicate.last_seen > survivor.last_seen {
                survivor.last_seen = duplicate.last_seen;
            }
            if duplicate.first_seen < survivor.first_seen {
                survivor.first_seen = duplicate.first_seen;
            }
            duplicate.annotate(format!("Merged into {} as duplicate", survivor.id));
            duplicate.close(CloseResolution::FalsePositive)?;
            self.incidents.update(duplicate).await?;
        }
        let survivor = self.incidents.update(survivor).await?;
        Ok(Some(survivor))
    }

    async fn publish(&self, notification: Notification) {
        if let Err(e) = self.notifier.publish(notification).await {
            warn!(error = %e, "notification publish failed");
        }
    }
}
