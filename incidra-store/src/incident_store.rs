//! The incident aggregate seam.

use async_trait::async_trait;

use incidra_core::incident::{Incident, IncidentId};

use crate::error::StoreError;

/// Store of mutable incident aggregates.
///
/// The open-by-key lookups are the correlator's find-or-create read side;
/// the engine serializes the full read-modify-write per key, so
/// implementations only need individual operations to be atomic.
#[async_trait]
pub trait IncidentStore: Send + Sync {
    /// Persist a new incident. Fails with `Conflict` if the id exists.
    async fn create(&self, incident: Incident) -> Result<Incident, StoreError>;

    /// Replace a stored incident. Fails with `NotFound` if absent.
    async fn update(&self, incident: Incident) -> Result<Incident, StoreError>;

    async fn get(&self, id: &IncidentId) -> Result<Option<Incident>, StoreError>;

    /// The oldest open incident for a (source, type label) key, if any.
    /// "Open" means status OPEN or IN_PROGRESS.
    async fn find_open_by_key(
        &self,
        source_addr: &str,
        type_label: &str,
    ) -> Result<Option<Incident>, StoreError>;

    /// Every open incident for a key, oldest first. Under the engine's
    /// per-key lock this has at most one element; more than one means an
    /// external writer raced us and the duplicates need merging.
    async fn find_all_open_by_key(
        &self,
        source_addr: &str,
        type_label: &str,
    ) -> Result<Vec<Incident>, StoreError>;

    /// All stored incidents, creation order.
    async fn list(&self) -> Result<Vec<Incident>, StoreError>;
}
