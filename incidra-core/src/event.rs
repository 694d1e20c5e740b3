//! The persisted log record.
//!
//! An [`Event`] is an immutable fact: once written to the store, its
//! classification fields are never touched again. Enrichment happens
//! before persistence, aggregation happens in incidents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{AttackVector, Category, Classification, EventSource, HttpMethod, Severity};

/// Globally unique event identity, generated at ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(pub Uuid);

impl EventId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Free-form evidence attached to an event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventDetails {
    pub message: Option<String>,
    /// The fragment of the request that triggered a detection, if any.
    pub suspicious_fragment: Option<String>,
    pub username: Option<String>,
    pub ports: Vec<u16>,
    pub bytes_in: u64,
    pub bytes_out: u64,
    pub file_name: Option<String>,
    pub command: Option<String>,
    /// Identifier of the rule that classified this event, e.g. "SQLI-001".
    pub rule_id: Option<String>,
    pub pattern_matched: Option<String>,
    pub tags: Vec<String>,
}

impl EventDetails {
    /// Append a tag unless it is already present.
    pub fn tag(&mut self, tag: &str) {
        if !self.tags.iter().any(|t| t == tag) {
            self.tags.push(tag.to_string());
        }
    }
}

/// One observed occurrence, as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub timestamp: DateTime<Utc>,
    /// Source address as reported by the transport. Deliberately a plain
    /// string: proxies and simulators hand us things that are not IPs.
    pub source_addr: String,
    pub source: EventSource,
    pub target_system: String,
    pub endpoint: String,
    pub http_method: Option<HttpMethod>,
    pub status_code: u16,
    pub category: Category,
    /// Fine-grained detector name, e.g. "SQLI_DETECTED" or "FAILED_LOGIN".
    pub subtype: String,
    pub severity: Severity,
    pub classification: Classification,
    pub attack_vector: AttackVector,
    pub details: EventDetails,
}

impl Event {
    /// A fresh, unclassified request observation with benign defaults.
    /// The detection pass promotes the fields in place before the event
    /// is persisted; after persistence they are frozen.
    pub fn observed(
        timestamp: DateTime<Utc>,
        source_addr: impl Into<String>,
        source: EventSource,
        target_system: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            id: EventId::generate(),
            timestamp,
            source_addr: source_addr.into(),
            source,
            target_system: target_system.into(),
            endpoint: endpoint.into(),
            http_method: None,
            status_code: 0,
            category: Category::Request,
            subtype: "HTTP_REQUEST".to_string(),
            severity: Severity::Low,
            classification: Classification::Info,
            attack_vector: AttackVector::None,
            details: EventDetails::default(),
        }
    }

    /// Whether this event participates in incident correlation at all.
    pub fn is_security(&self) -> bool {
        self.category == Category::Security
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn observed_defaults_are_benign() {
        let e = Event::observed(Utc::now(), "10.0.0.1", EventSource::App, "backend", "/login");
        assert_eq!(e.category, Category::Request);
        assert_eq!(e.classification, Classification::Info);
        assert_eq!(e.attack_vector, AttackVector::None);
        assert!(!e.is_security());
    }

    #[test]
    fn event_ids_are_unique() {
        assert_ne!(EventId::generate(), EventId::generate());
    }

    #[test]
    fn tag_deduplicates() {
        let mut d = EventDetails::default();
        d.tag("SQLI");
        d.tag("SQLI");
        assert_eq!(d.tags, vec!["SQLI"]);
    }
}
