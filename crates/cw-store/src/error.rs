use cw_types::TypeError;

/// Errors from graph store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Missing or invalid configuration, detected before any store access.
    #[error("configuration error: {0}")]
    Config(String),

    /// The store answered with a non-success status twice in a row.
    #[error("request to {endpoint} failed with status {status}:\n{query}")]
    Transport {
        endpoint: String,
        status: u16,
        query: String,
    },

    /// HTTP client construction or body read failure.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The store did not become reachable within the poll budget.
    #[error("store at {endpoint} not reachable after {attempts} attempts")]
    StartTimeout { endpoint: String, attempts: u32 },

    /// The store did not go down within the poll budget.
    #[error("store at {endpoint} still reachable after {attempts} attempts")]
    StopTimeout { endpoint: String, attempts: u32 },

    /// The store is running but was not launched by this gateway.
    #[error("store at {endpoint} is not managed by this process")]
    Unmanaged { endpoint: String },

    /// Ambiguous or duplicated content (get-or-create cardinality != 1).
    #[error("data integrity error: {0}")]
    Integrity(String),

    /// A response could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    #[error(transparent)]
    Type(#[from] TypeError),

    /// I/O error from process management or file cleanup.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
