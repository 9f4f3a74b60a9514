//! Core error types.

use thiserror::Error;

use crate::store::StoreError;

/// Errors raised while assembling, executing or shaping a repository query.
#[derive(Debug, Error)]
pub enum Error {
    /// Query text was blank.
    #[error("query text must not be empty")]
    EmptyQuery,

    /// An executor declined the invocation; the chain tries its next link.
    #[error("unsupported query shape: {0}")]
    UnsupportedQueryShape(String),

    /// A single-entity query matched more than one row.
    #[error("expected {expected} result, got {actual}")]
    AmbiguousResult { expected: usize, actual: usize },

    /// The declared return shape cannot hold the result.
    #[error("unsupported return shape: {0}")]
    UnsupportedReturnShape(String),

    /// The query's own LIMIT ends before the requested page starts.
    #[error("query LIMIT {limit} must be greater than the page start offset {offset}")]
    LimitBelowPageOffset { limit: usize, offset: usize },

    /// Page request cannot be satisfied.
    #[error("invalid page request: {0}")]
    InvalidPageRequest(String),

    /// A placeholder references an argument that was not supplied.
    #[error("no argument bound for parameter ${0}")]
    MissingArgument(usize),

    /// Configuration could not be loaded or is inconsistent.
    #[error("configuration error: {0}")]
    Config(String),

    /// Error raised by the store, passed through untouched.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl Error {
    /// Create a decline signal.
    pub fn unsupported(reason: impl Into<String>) -> Self {
        Error::UnsupportedQueryShape(reason.into())
    }

    /// Whether this error asks the executor chain to try its next link.
    pub fn is_decline(&self) -> bool {
        matches!(self, Error::UnsupportedQueryShape(_))
    }
}

/// Result alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;
