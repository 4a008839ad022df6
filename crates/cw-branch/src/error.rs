//! Error types for branch operations.

use cw_store::StoreError;
use cw_types::TypeError;
use thiserror::Error;

/// Errors that can occur during branch operations.
#[derive(Debug, Error)]
pub enum BranchError {
    #[error("branch not found: {branch}")]
    NotFound { branch: String },

    /// The caller does not own the branch.
    #[error("branch {branch} is owned by {owner}, not {caller}")]
    NotOwner {
        branch: String,
        owner: String,
        caller: String,
    },

    /// The registry records more than one owner for a branch.
    #[error("branch {branch} has {count} recorded owners")]
    DuplicateOwner { branch: String, count: usize },

    #[error("invalid branch id: {id}: {reason}")]
    InvalidBranchId { id: String, reason: String },

    /// The merge lock stayed held for the whole retry budget.
    #[error("could not acquire {path} after {attempts} attempts")]
    LockTimeout { path: String, attempts: u32 },

    #[error("git error: {0}")]
    Git(#[from] git2::Error),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Type(#[from] TypeError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for branch operations.
pub type BranchResult<T> = std::result::Result<T, BranchError>;
