//! In-memory reference implementations.
//!
//! These back the test suite and the CLI's self-contained mode, and double
//! as executable documentation of the store contracts. Plain locked maps,
//! no indexing: scan costs are fine at test scale.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use incidra_core::event::{Event, EventId};
use incidra_core::incident::{Incident, IncidentId};

use crate::error::StoreError;
use crate::event_store::{EventQuery, EventStore};
use crate::incident_store::IncidentStore;

/// Event log held in a locked vector.
#[derive(Default)]
pub struct MemoryEventStore {
    events: Arc<RwLock<Vec<Event>>>,
}

impl MemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored event, for assertions.
    pub async fn snapshot(&self) -> Vec<Event> {
        self.events.read().await.clone()
    }
}

#[async_trait]
impl EventStore for MemoryEventStore {
    async fn insert(&self, event: Event) -> Result<EventId, StoreError> {
        let mut events = self.events.write().await;
        if events.iter().any(|e| e.id == event.id) {
            return Err(StoreError::Conflict(format!("event {} already stored", event.id)));
        }
        let id = event.id;
        events.push(event);
        Ok(id)
    }

    async fn get(&self, id: EventId) -> Result<Option<Event>, StoreError> {
        Ok(self.events.read().await.iter().find(|e| e.id == id).cloned())
    }

    async fn count_matching(&self, query: &EventQuery) -> Result<u64, StoreError> {
        Ok(self.events.read().await.iter().filter(|e| query.matches(e)).count() as u64)
    }

    async fn find_matching(&self, query: &EventQuery) -> Result<Vec<EventId>, StoreError> {
        let events = self.events.read().await;
        let mut matched: Vec<&Event> = events.iter().filter(|e| query.matches(e)).collect();
        matched.sort_by_key(|e| e.timestamp);
        Ok(matched.into_iter().map(|e| e.id).collect())
    }

    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError> {
        let mut events = self.events.write().await;
        let before = events.len();
        events.retain(|e| e.timestamp >= cutoff);
        Ok((before - events.len()) as u64)
    }

    async fn total(&self) -> Result<u64, StoreError> {
        Ok(self.events.read().await.len() as u64)
    }
}

/// Incident map with a creation sequence, so "oldest open" is
/// deterministic even when first-seen timestamps collide.
#[derive(Default)]
pub struct MemoryIncidentStore {
    inner: Arc<RwLock<IncidentMap>>,
}

#[derive(Default)]
struct IncidentMap {
    seq: u64,
    incidents: HashMap<IncidentId, (u64, Incident)>,
}

impl MemoryIncidentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn open_for_key(map: &IncidentMap, source_addr: &str, type_label: &str) -> Vec<Incident> {
        let mut open: Vec<(u64, Incident)> = map
            .incidents
            .values()
            .filter(|(_, i)| {
                i.is_open() && i.source_addr == source_addr && i.type_label == type_label
            })
            .cloned()
            .collect();
        open.sort_by_key(|(seq, _)| *seq);
        open.into_iter().map(|(_, i)| i).collect()
    }
}

#[async_trait]
impl IncidentStore for MemoryIncidentStore {
    async fn create(&self, incident: Incident) -> Result<Incident, StoreError> {
        let mut map = self.inner.write().await;
        if map.incidents.contains_key(&incident.id) {
            return Err(StoreError::Conflict(format!("incident {} already stored", incident.id)));
        }
        map.seq += 1;
        let seq = map.seq;
        map.incidents.insert(incident.id.clone(), (seq, incident.clone()));
        Ok(incident)
    }

    async fn update(&self, incident: Incident) -> Result<Incident, StoreError> {
        let mut map = self.inner.write().await;
        match map.incidents.get_mut(&incident.id) {
            Some(slot) => {
                slot.1 = incident.clone();
                Ok(incident)
            }
            None => Err(StoreError::NotFound(incident.id.to_string())),
        }
    }

    async fn get(&self, id: &IncidentId) -> Result<Option<Incident>, StoreError> {
        Ok(self.inner.read().await.incidents.get(id).map(|(_, i)| i.clone()))
    }

    async fn find_open_by_key(
        &self,
        source_addr: &str,
        type_label: &str,
    ) -> Result<Option<Incident>, StoreError> {
        let map = self.inner.read().await;
        Ok(Self::open_for_key(&map, source_addr, type_label).into_iter().next())
    }

    async fn find_all_open_by_key(
        &self,
        source_addr: &str,
        type_label: &str,
    ) -> Result<Vec<Incident>, StoreError> {
        let map = self.inner.read().await;
        Ok(Self::open_for_key(&map, source_addr, type_label))
    }

    async fn list(&self) -> Result<Vec<Incident>, StoreError> {
        let map = self.inner.read().await;
        let mut all: Vec<(u64, Incident)> = map.incidents.values().cloned().collect();
        all.sort_by_key(|(seq, _)| *seq);
        Ok(all.into_iter().map(|(_, i)| i).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use incidra_core::incident::type_label_for;
    use incidra_core::types::{AttackVector, Category, EventSource, Severity};

    fn security_event(source: &str, subtype: &str, age_minutes: i64) -> Event {
        let mut e = Event::observed(
            Utc::now() - Duration::minutes(age_minutes),
            source,
            EventSource::App,
            "backend",
            "/api",
        );
        e.category = Category::Security;
        e.attack_vector = AttackVector::Sqli;
        e.subtype = subtype.to_string();
        e
    }

    #[tokio::test]
    async fn insert_rejects_duplicate_ids() {
        let store = MemoryEventStore::new();
        let event = security_event("10.0.0.1", "SQLI_DETECTED", 0);
        store.insert(event.clone()).await.unwrap();
        assert!(matches!(
            store.insert(event).await,
            Err(StoreError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn window_query_filters_and_orders() {
        let store = MemoryEventStore::new();
        let old = security_event("10.0.0.1", "SQLI_DETECTED", 10);
        let new = security_event("10.0.0.1", "SQLI_DETECTED", 1);
        let other_source = security_event("10.0.0.2", "SQLI_DETECTED", 1);
        store.insert(new.clone()).await.unwrap();
        store.insert(old.clone()).await.unwrap();
        store.insert(other_source).await.unwrap();

        let query = EventQuery::security_window(
            "10.0.0.1",
            AttackVector::Sqli,
            "SQLI_DETECTED",
            Utc::now() - Duration::minutes(5),
        );
        assert_eq!(store.count_matching(&query).await.unwrap(), 1);
        assert_eq!(store.find_matching(&query).await.unwrap(), vec![new.id]);

        let wide = EventQuery::security_window(
            "10.0.0.1",
            AttackVector::Sqli,
            "SQLI_DETECTED",
            Utc::now() - Duration::minutes(30),
        );
        // Oldest first.
        assert_eq!(store.find_matching(&wide).await.unwrap(), vec![old.id, new.id]);
    }

    #[tokio::test]
    async fn delete_older_than_is_a_pure_cutoff() {
        let store = MemoryEventStore::new();
        store.insert(security_event("10.0.0.1", "SQLI_DETECTED", 60)).await.unwrap();
        store.insert(security_event("10.0.0.1", "SQLI_DETECTED", 1)).await.unwrap();

        let cutoff = Utc::now() - Duration::minutes(30);
        assert_eq!(store.delete_older_than(cutoff).await.unwrap(), 1);
        assert_eq!(store.delete_older_than(cutoff).await.unwrap(), 0);
        assert_eq!(store.total().await.unwrap(), 1);
    }

    fn open_incident(source: &str, subtype: &str) -> Incident {
        let now = Utc::now();
        Incident::open(
            type_label_for(subtype),
            source.to_string(),
            Severity::High,
            1,
            now,
            now,
            vec![],
            None,
        )
    }

    #[tokio::test]
    async fn open_by_key_ignores_closed_and_foreign_incidents() {
        let store = MemoryIncidentStore::new();
        let label = type_label_for("SQLI_DETECTED");

        let mut closed = open_incident("10.0.0.1", "SQLI_DETECTED");
        closed.close(incidra_core::incident::CloseResolution::FalsePositive).unwrap();
        store.create(closed).await.unwrap();
        store.create(open_incident("10.0.0.2", "SQLI_DETECTED")).await.unwrap();
        assert!(store.find_open_by_key("10.0.0.1", &label).await.unwrap().is_none());

        let live = store.create(open_incident("10.0.0.1", "SQLI_DETECTED")).await.unwrap();
        let found = store.find_open_by_key("10.0.0.1", &label).await.unwrap().unwrap();
        assert_eq!(found.id, live.id);
    }

    #[tokio::test]
    async fn all_open_by_key_is_oldest_first() {
        let store = MemoryIncidentStore::new();
        let label = type_label_for("SQLI_DETECTED");
        let first = store.create(open_incident("10.0.0.1", "SQLI_DETECTED")).await.unwrap();
        let second = store.create(open_incident("10.0.0.1", "SQLI_DETECTED")).await.unwrap();

        let open = store.find_all_open_by_key("10.0.0.1", &label).await.unwrap();
        assert_eq!(open.len(), 2);
        assert_eq!(open[0].id, first.id);
        assert_eq!(open[1].id, second.id);
        // find_open_by_key picks the oldest.
        assert_eq!(store.find_open_by_key("10.0.0.1", &label).await.unwrap().unwrap().id, first.id);
    }

    #[tokio::test]
    async fn update_requires_existing_incident() {
        let store = MemoryIncidentStore::new();
        let incident = open_incident("10.0.0.1", "SQLI_DETECTED");
        assert!(matches!(
            store.update(incident.clone()).await,
            Err(StoreError::NotFound(_))
        ));
        store.create(incident.clone()).await.unwrap();
        let mut changed = incident;
        changed.occurrence_count = 9;
        let stored = store.update(changed).await.unwrap();
        assert_eq!(stored.occurrence_count, 9);
        assert_eq!(store.get(&stored.id).await.unwrap().unwrap().occurrence_count, 9);
    }
}
