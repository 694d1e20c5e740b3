//! Ingestion pipeline input and verdict types.
//!
//! The transport layer (HTTP middleware, log submission endpoint, replay
//! tooling) hands the engine a [`RawRequest`]; the engine classifies it,
//! persists the resulting event, and answers with an [`IngestReport`]
//! telling the caller whether to reject the request inline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use incidra_core::event::Event;
use incidra_core::types::{AttackVector, EventSource, HttpMethod};
use incidra_detection::signatures::SignatureHit;
use incidra_detection::{Classifier, RequestSurface};

/// One inbound observation, as reported by the transport layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRequest {
    pub source_addr: String,
    #[serde(default = "default_source")]
    pub source: EventSource,
    #[serde(default = "default_target")]
    pub target_system: String,
    pub endpoint: String,
    #[serde(default)]
    pub http_method: Option<HttpMethod>,
    #[serde(default)]
    pub status_code: u16,
    /// Request body as text; binary payloads arrive lossily or empty and
    /// simply never match signatures.
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub bytes_in: u64,
    #[serde(default)]
    pub bytes_out: u64,
    /// Replay scenarios pin the timestamp; live ingest leaves it unset.
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

fn default_source() -> EventSource {
    EventSource::App
}

fn default_target() -> String {
    "incidra-backend".to_string()
}

/// Inline blocking decision for the answering transport.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Allow,
    Block { family: AttackVector, pattern: String },
}

/// Result of one ingest call. Correlation state is deliberately absent:
/// it runs detached and must never block the response path.
#[derive(Debug, Clone)]
pub struct IngestReport {
    pub event: Event,
    pub verdict: Verdict,
}

impl IngestReport {
    pub fn blocked(&self) -> bool {
        matches!(self.verdict, Verdict::Block { .. })
    }
}

/// Build and classify the event for a raw request.
pub(crate) fn build_event(
    raw: &RawRequest,
    classifier: &Classifier,
    now: DateTime<Utc>,
) -> (Event, Option<SignatureHit>) {
    let mut event = Event::observed(
        raw.timestamp.unwrap_or(now),
        raw.source_addr.clone(),
        raw.source,
        raw.target_system.clone(),
        raw.endpoint.clone(),
    );
    event.http_method = raw.http_method;
    event.status_code = raw.status_code;
    event.details.username = raw.username.clone();
    event.details.bytes_in = raw.bytes_in;
    event.details.bytes_out = raw.bytes_out;
    event.details.tag("REQUEST_LOG");

    let surface = RequestSurface {
        body: raw.body.clone(),
        query: raw.query.clone(),
        path: raw.endpoint.clone(),
    };
    let hit = classifier.classify(&mut event, &surface);
    (event, hit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use incidra_core::types::{Category, Classification};
    use incidra_detection::SignatureMatcher;

    fn raw(body: &str, endpoint: &str, status: u16) -> RawRequest {
        RawRequest {
            source_addr: "10.0.0.1".into(),
            source: EventSource::App,
            target_system: default_target(),
            endpoint: endpoint.into(),
            http_method: Some(HttpMethod::Post),
            status_code: status,
            body: body.into(),
            query: String::new(),
            username: Some("admin".into()),
            bytes_in: 64,
            bytes_out: 0,
            timestamp: None,
        }
    }

    #[test]
    fn builds_classified_event_from_request() {
        let classifier = Classifier::new(Arc::new(SignatureMatcher::new()));
        let (event, hit) =
            build_event(&raw("id=1 union select *", "/api/items", 200), &classifier, Utc::now());
        assert!(hit.is_some());
        assert_eq!(event.category, Category::Security);
        assert_eq!(event.details.username.as_deref(), Some("admin"));
        assert!(event.details.tags.contains(&"REQUEST_LOG".to_string()));
        assert!(event.details.tags.contains(&"SQLI".to_string()));
    }

    #[test]
    fn endpoint_is_part_of_the_scanned_surface() {
        let classifier = Classifier::new(Arc::new(SignatureMatcher::new()));
        let (event, hit) =
            build_event(&raw("", "/search?q=<script>", 200), &classifier, Utc::now());
        assert!(hit.is_some());
        assert_eq!(event.subtype, "XSS_DETECTED");
    }

    #[test]
    fn benign_request_stays_info() {
        let classifier = Classifier::new(Arc::new(SignatureMatcher::new()));
        let (event, hit) = build_event(&raw("hello", "/api/items", 200), &classifier, Utc::now());
        assert!(hit.is_none());
        assert_eq!(event.classification, Classification::Info);
    }

    #[test]
    fn scenario_timestamp_is_honored() {
        let classifier = Classifier::new(Arc::new(SignatureMatcher::new()));
        let pinned = Utc::now() - chrono::Duration::hours(3);
        let mut request = raw("", "/api/items", 200);
        request.timestamp = Some(pinned);
        let (event, _) = build_event(&request, &classifier, Utc::now());
        assert_eq!(event.timestamp, pinned);
    }
}
