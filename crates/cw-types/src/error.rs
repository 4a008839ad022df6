use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeError {
    /// A field was assigned a value of the wrong category.
    #[error("type mismatch for {field}: expected {expected}, found {found}")]
    Mismatch {
        field: String,
        expected: String,
        found: String,
    },

    #[error("unknown namespace prefix in {0}")]
    UnknownPrefix(String),

    #[error("invalid predicate {0}: expected prefix:local form")]
    InvalidPredicate(String),

    #[error("empty term")]
    EmptyTerm,
}

impl TypeError {
    /// Convenience constructor for [`TypeError::Mismatch`].
    pub fn mismatch(field: &str, expected: &str, found: impl Into<String>) -> Self {
        Self::Mismatch {
            field: field.to_string(),
            expected: expected.to_string(),
            found: found.into(),
        }
    }
}
