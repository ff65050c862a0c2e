use meetpoint_core::{CoreError, StoreError};
use thiserror::Error;

/// Structural failures of a find run. Provider failures never appear here;
/// they are absorbed by the collector and matrix builder.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("no origins yet: add a location before searching")]
    NoOrigins,

    #[error("invalid find request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Failures of a persisted location-set mutation.
///
/// On [`ManagerError::Store`] the in-memory set has already changed; only
/// the write-through failed.
#[derive(Debug, Error)]
pub enum ManagerError {
    #[error(transparent)]
    Location(#[from] CoreError),

    #[error("saving locations failed: {0}")]
    Store(#[from] StoreError),
}
