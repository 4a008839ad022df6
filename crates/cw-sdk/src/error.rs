use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("store error: {0}")]
    Store(#[from] cw_store::StoreError),

    #[error("model error: {0}")]
    Model(#[from] cw_model::ModelError),

    #[error("branch error: {0}")]
    Branch(#[from] cw_branch::BranchError),

    #[error(transparent)]
    Type(#[from] cw_types::TypeError),

    /// Hydration dropped items; the output is incomplete.
    #[error("hydrated {actual} of {expected} entities")]
    Consistency { expected: usize, actual: usize },

    #[error("data integrity error: {0}")]
    Integrity(String),

    /// Two validation rules reported under the same label.
    #[error("validation label reported by more than one rule: {label}")]
    DuplicateRule { label: String },
}

pub type SdkResult<T> = Result<T, SdkError>;
