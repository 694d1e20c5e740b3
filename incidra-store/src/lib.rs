//! # incidra-store
//!
//! Abstract storage seams for the correlation engine, plus in-memory
//! reference implementations. The engine is written against these traits,
//! not a concrete database: any backend that honors the contracts (and
//! the index expectations noted on the queries) can sit behind them.
//!
//! ### Components:
//! - `event_store`: append-mostly log of immutable events
//! - `incident_store`: mutable incident aggregates with open-by-key lookup
//! - `memory`: `tokio::sync::RwLock`-based implementations used by tests
//!   and the CLI

pub mod error;
pub mod event_store;
pub mod incident_store;
pub mod memory;

pub use error::StoreError;
pub use event_store::{EventQuery, EventStore};
pub use incident_store::IncidentStore;
pub use memory::{MemoryEventStore, MemoryIncidentStore};
