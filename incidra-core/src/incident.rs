//! The incident aggregate and its lifecycle.
//!
//! An incident groups every recent event that shares a (source address,
//! attack type) key. The correlator owns creation and the rolling update
//! fold; analysts own assignment and closure. Severity only ever goes up.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::event::EventId;
use crate::types::Severity;

/// Human-referenceable incident identity, e.g. `INC-9F2C41AB`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IncidentId(pub String);

impl IncidentId {
    pub fn generate() -> Self {
        let raw = Uuid::new_v4().simple().to_string();
        Self(format!("INC-{}", raw[..8].to_uppercase()))
    }
}

impl std::fmt::Display for IncidentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Incident workflow state.
///
/// `Open` and `InProgress` count as "open" for the one-open-incident-per-key
/// invariant; the two closed states are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IncidentStatus {
    Open,
    InProgress,
    ClosedTruePositive,
    ClosedFalsePositive,
}

impl IncidentStatus {
    pub fn is_open(self) -> bool {
        matches!(self, IncidentStatus::Open | IncidentStatus::InProgress)
    }
}

/// Analyst verdict when closing an incident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CloseResolution {
    TruePositive,
    FalsePositive,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IncidentError {
    #[error("incident {0} is already assigned to {1}")]
    AlreadyAssigned(IncidentId, String),

    #[error("incident {0} has no assignee")]
    NotAssigned(IncidentId),

    #[error("incident {0} is closed")]
    Closed(IncidentId),
}

/// Build the incident type label the correlator keys on.
pub fn type_label_for(subtype: &str) -> String {
    format!("{subtype} Attack")
}

/// A mutable aggregate of related security events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    pub id: IncidentId,
    /// Derived as `"<subtype> Attack"`; half of the correlation key.
    pub type_label: String,
    pub source_addr: String,
    pub severity: Severity,
    pub status: IncidentStatus,
    /// Most recent recomputed count of matching in-window events. Not an
    /// increment: reprocessing the same event must be idempotent.
    pub occurrence_count: u64,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    /// Insertion-ordered, duplicate-free. May dangle after retention
    /// sweeps; readers must tolerate missing events.
    pub related_events: Vec<EventId>,
    pub assigned_to: Option<String>,
    pub analyst_notes: Option<String>,
    pub trigger_rule: Option<String>,
}

impl Incident {
    /// Open a fresh incident for a correlation key.
    #[allow(clippy::too_many_arguments)]
    pub fn open(
        type_label: String,
        source_addr: String,
        severity: Severity,
        occurrence_count: u64,
        first_seen: DateTime<Utc>,
        last_seen: DateTime<Utc>,
        related_events: Vec<EventId>,
        trigger_rule: Option<String>,
    ) -> Self {
        Self {
            id: IncidentId::generate(),
            type_label,
            source_addr,
            severity,
            status: IncidentStatus::Open,
            occurrence_count,
            first_seen,
            last_seen,
            related_events,
            assigned_to: None,
            analyst_notes: None,
            trigger_rule,
        }
    }

    pub fn is_open(&self) -> bool {
        self.status.is_open()
    }

    /// Fold one more observation into the incident.
    ///
    /// `window_count` replaces the stored occurrence count outright, and
    /// severity moves only upward, so replaying an observation leaves the
    /// incident unchanged.
    pub fn record_observation(
        &mut self,
        window_count: u64,
        severity: Severity,
        seen_at: DateTime<Utc>,
        event_id: EventId,
    ) {
        self.occurrence_count = window_count;
        if seen_at > self.last_seen {
            self.last_seen = seen_at;
        }
        self.severity = self.severity.max(severity);
        if !self.related_events.contains(&event_id) {
            self.related_events.push(event_id);
        }
    }

    /// Assign the incident to an analyst, moving it to `InProgress`.
    ///
    /// Assignment is exclusive: taking over another analyst's incident
    /// requires `privileged`. Re-assigning to the current assignee is a
    /// no-op.
    pub fn assign(&mut self, analyst: &str, privileged: bool) -> Result<(), IncidentError> {
        if !self.is_open() {
            return Err(IncidentError::Closed(self.id.clone()));
        }
        match &self.assigned_to {
            Some(current) if current == analyst => {}
            Some(current) if !privileged => {
                return Err(IncidentError::AlreadyAssigned(
                    self.id.clone(),
                    current.clone(),
                ));
            }
            _ => self.assigned_to = Some(analyst.to_string()),
        }
        self.status = IncidentStatus::InProgress;
        Ok(())
    }

    /// Release the incident back to the open queue.
    pub fn unassign(&mut self) -> Result<(), IncidentError> {
        if !self.is_open() {
            return Err(IncidentError::Closed(self.id.clone()));
        }
        if self.assigned_to.is_none() {
            return Err(IncidentError::NotAssigned(self.id.clone()));
        }
        self.assigned_to = None;
        self.status = IncidentStatus::Open;
        Ok(())
    }

    /// Close with an analyst verdict. Unassigned open incidents may be
    /// closed directly; the duplicate-merge path relies on this.
    pub fn close(&mut self, resolution: CloseResolution) -> Result<(), IncidentError> {
        if !self.is_open() {
            return Err(IncidentError::Closed(self.id.clone()));
        }
        self.status = match resolution {
            CloseResolution::TruePositive => IncidentStatus::ClosedTruePositive,
            CloseResolution::FalsePositive => IncidentStatus::ClosedFalsePositive,
        };
        Ok(())
    }

    pub fn annotate(&mut self, notes: impl Into<String>) {
        self.analyst_notes = Some(notes.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn incident() -> Incident {
        let now = Utc::now();
        Incident::open(
            type_label_for("SQLI_DETECTED"),
            "10.0.0.1".into(),
            Severity::High,
            1,
            now - Duration::minutes(5),
            now,
            vec![EventId::generate()],
            Some("SQLI-001".into()),
        )
    }

    #[test]
    fn generated_ids_look_human() {
        let id = IncidentId::generate();
        assert!(id.0.starts_with("INC-"));
        assert_eq!(id.0.len(), 12);
        assert!(id.0[4..].chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[test]
    fn type_label_shape() {
        assert_eq!(type_label_for("FAILED_LOGIN"), "FAILED_LOGIN Attack");
    }

    #[test]
    fn observation_fold_is_idempotent() {
        let mut inc = incident();
        let eid = EventId::generate();
        let at = inc.last_seen + Duration::seconds(30);
        inc.record_observation(4, Severity::Critical, at, eid);
        let snapshot = inc.clone();
        inc.record_observation(4, Severity::Critical, at, eid);
        assert_eq!(inc, snapshot);
    }

    #[test]
    fn severity_never_downgrades() {
        let mut inc = incident();
        inc.record_observation(2, Severity::Critical, inc.last_seen, EventId::generate());
        assert_eq!(inc.severity, Severity::Critical);
        inc.record_observation(3, Severity::Low, inc.last_seen, EventId::generate());
        assert_eq!(inc.severity, Severity::Critical);
    }

    #[test]
    fn last_seen_is_monotonic() {
        let mut inc = incident();
        let later = inc.last_seen + Duration::minutes(1);
        inc.record_observation(2, Severity::High, later, EventId::generate());
        // A stale observation must not move last_seen backwards.
        inc.record_observation(2, Severity::High, later - Duration::minutes(2), EventId::generate());
        assert_eq!(inc.last_seen, later);
    }

    #[test]
    fn assignment_is_exclusive() {
        let mut inc = incident();
        inc.assign("alice", false).unwrap();
        assert_eq!(inc.status, IncidentStatus::InProgress);
        assert_eq!(
            inc.assign("bob", false),
            Err(IncidentError::AlreadyAssigned(inc.id.clone(), "alice".into()))
        );
        // A privileged actor may take over.
        inc.assign("bob", true).unwrap();
        assert_eq!(inc.assigned_to.as_deref(), Some("bob"));
    }

    #[test]
    fn unassign_reopens() {
        let mut inc = incident();
        inc.assign("alice", false).unwrap();
        inc.unassign().unwrap();
        assert_eq!(inc.status, IncidentStatus::Open);
        assert_eq!(inc.assigned_to, None);
        assert_eq!(inc.unassign(), Err(IncidentError::NotAssigned(inc.id.clone())));
    }

    #[test]
    fn closed_incidents_reject_mutation() {
        let mut inc = incident();
        inc.close(CloseResolution::FalsePositive).unwrap();
        assert_eq!(inc.status, IncidentStatus::ClosedFalsePositive);
        assert!(!inc.is_open());
        assert_eq!(inc.assign("alice", true), Err(IncidentError::Closed(inc.id.clone())));
        assert_eq!(
            inc.close(CloseResolution::TruePositive),
            Err(IncidentError::Closed(inc.id.clone()))
        );
    }
}
