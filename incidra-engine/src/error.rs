use thiserror::Error;

use incidra_core::incident::IncidentError;
use incidra_store::StoreError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("incident state error: {0}")]
    Incident(#[from] IncidentError),
}
