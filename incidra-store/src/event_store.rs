//! The event log seam.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use incidra_core::event::{Event, EventId};
use incidra_core::types::{AttackVector, Category};

use crate::error::StoreError;

/// Window query over the event log.
///
/// Backends are expected to serve this from indexed access paths (by
/// timestamp descending, by (source, timestamp), and by (category,
/// vector, subtype, timestamp)) so correlation stays a bounded range
/// scan rather than a full-log sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct EventQuery {
    pub source_addr: String,
    pub category: Category,
    pub attack_vector: AttackVector,
    pub subtype: String,
    /// Inclusive lower bound on the event timestamp.
    pub since: DateTime<Utc>,
}

impl EventQuery {
    /// The correlator's window query: same source, SECURITY category,
    /// same vector and subtype, inside the trailing window.
    pub fn security_window(
        source_addr: impl Into<String>,
        attack_vector: AttackVector,
        subtype: impl Into<String>,
        since: DateTime<Utc>,
    ) -> Self {
        Self {
            source_addr: source_addr.into(),
            category: Category::Security,
            attack_vector,
            subtype: subtype.into(),
            since,
        }
    }

    pub fn matches(&self, event: &Event) -> bool {
        event.source_addr == self.source_addr
            && event.category == self.category
            && event.attack_vector == self.attack_vector
            && event.subtype == self.subtype
            && event.timestamp >= self.since
    }
}

/// Append-mostly store of immutable events.
///
/// Writers come from any ingest worker; the only deleter is the retention
/// sweeper.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Persist one event. Ids are caller-generated and unique.
    async fn insert(&self, event: Event) -> Result<EventId, StoreError>;

    async fn get(&self, id: EventId) -> Result<Option<Event>, StoreError>;

    /// Number of stored events matching the query.
    async fn count_matching(&self, query: &EventQuery) -> Result<u64, StoreError>;

    /// Ids of stored events matching the query, in timestamp order.
    async fn find_matching(&self, query: &EventQuery) -> Result<Vec<EventId>, StoreError>;

    /// Bulk-purge events strictly older than `cutoff`. Returns the number
    /// deleted.
    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError>;

    /// Total number of stored events.
    async fn total(&self) -> Result<u64, StoreError>;
}
