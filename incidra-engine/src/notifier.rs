//! The notification seam.
//!
//! The sink is an injected capability, never a process-wide singleton:
//! tests run against a channel, production wires whatever fan-out the
//! deployment uses. Publish failures are logged by the caller and
//! swallowed; they never roll back correlation work.

use async_trait::async_trait;
use opentelemetry::KeyValue;
use thiserror::Error;
use tokio::sync::mpsc;

use incidra_core::event::Event;
use incidra_core::incident::Incident;
use incidra_telemetry::EventLogger;

/// Lifecycle notifications published by the engine.
#[derive(Debug, Clone)]
pub enum Notification {
    LogCreated(Event),
    IncidentCreated(Incident),
    IncidentUpdated(Incident),
}

impl Notification {
    /// Wire-level event name.
    pub fn name(&self) -> &'static str {
        match self {
            Notification::LogCreated(_) => "log.created",
            Notification::IncidentCreated(_) => "incident.created",
            Notification::IncidentUpdated(_) => "incident.updated",
        }
    }
}

#[derive(Debug, Error)]
#[error("notification sink failure: {0}")]
pub struct NotifyError(pub String);

/// Fire-and-forget notification sink.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn publish(&self, notification: Notification) -> Result<(), NotifyError>;
}

/// Sink that emits structured log events; the default when no external
/// fan-out is wired.
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    async fn publish(&self, notification: Notification) -> Result<(), NotifyError> {
        let metadata = match &notification {
            Notification::LogCreated(event) => vec![
                KeyValue::new("event_id", event.id.to_string()),
                KeyValue::new("source_addr", event.source_addr.clone()),
                KeyValue::new("subtype", event.subtype.clone()),
            ],
            Notification::IncidentCreated(incident) | Notification::IncidentUpdated(incident) => {
                vec![
                    KeyValue::new("incident_id", incident.id.to_string()),
                    KeyValue::new("source_addr", incident.source_addr.clone()),
                    KeyValue::new("severity", incident.severity.to_string()),
                    KeyValue::new("occurrences", incident.occurrence_count as i64),
                ]
            }
        };
        EventLogger::log_event(notification.name(), metadata).await;
        Ok(())
    }
}

/// Sink backed by an unbounded channel, used by tests and the CLI to
/// observe the notification stream.
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Notification>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl Notifier for ChannelNotifier {
    async fn publish(&self, notification: Notification) -> Result<(), NotifyError> {
        self.tx
            .send(notification)
            .map_err(|e| NotifyError(e.to_string()))
    }
}
