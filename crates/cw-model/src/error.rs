use cw_store::StoreError;
use cw_types::TypeError;

/// Errors from building, persisting and hydrating entities.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error(transparent)]
    Type(#[from] TypeError),

    /// A setter was called on an entity that already has a URI.
    #[error("{entity} {uri} is persisted and cannot be modified")]
    Immutable { entity: &'static str, uri: String },

    /// A projection referenced a nested entity that has not been persisted.
    #[error("{0} has no uri; persist it first")]
    Unpersisted(String),

    /// A stored entity lacks a statement it cannot be built without.
    #[error("{entity} {uri} has no {field} statement")]
    Missing {
        entity: &'static str,
        uri: String,
        field: &'static str,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result alias for model operations.
pub type ModelResult<T> = Result<T, ModelError>;
