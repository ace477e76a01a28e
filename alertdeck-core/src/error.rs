use thiserror::Error;

/// Faults raised by a storage collaborator. Retryable by the caller; the
/// engines perform no retries of their own.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("unrecognized continuation key")]
    UnrecognizedContinuationKey,
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}

/// Error taxonomy for the three alert engines.
#[derive(Debug, Error)]
pub enum QueryError {
    /// Storage collaborator unreachable or faulted.
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),

    /// Continuation cursor failed URL-decoding or JSON-parsing. Client can
    /// only recover with a fresh cursor.
    #[error("malformed continuation cursor: {message}")]
    DecodeCursor { message: String },

    /// Identifier failed the sort-key format check. No storage call is made.
    #[error("invalid alert identifier: {id}")]
    InvalidIdentifier { id: String },

    /// Valid detail lookup with no matching record. Distinct from an empty
    /// query page, which is a successful result.
    #[error("alert not found: {id}")]
    NotFound { id: String },
}
