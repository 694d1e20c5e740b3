//! # incidra-core
//!
//! Domain layer for the Incidra threat correlation engine.
//! Events are immutable facts; incidents are mutable aggregates with a
//! small analyst-driven state machine.
//!
//! ### Key Submodules:
//! - `types`: closed enums for every category-like field, so downstream
//!   decision tables are exhaustiveness-checked by the compiler
//! - `event`: the persisted log record and its details bag
//! - `incident`: the incident aggregate, identity scheme, and lifecycle

pub mod event;
pub mod incident;
pub mod types;

pub mod prelude {
    pub use crate::event::*;
    pub use crate::incident::*;
    pub use crate::types::*;
}

pub use event::{Event, EventDetails, EventId};
pub use incident::{CloseResolution, Incident, IncidentError, IncidentId, IncidentStatus};
pub use types::{AttackVector, Category, Classification, EventSource, HttpMethod, Severity};
