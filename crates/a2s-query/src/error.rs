//! Error types for A2S queries.

use std::time::Duration;

use thiserror::Error;

/// Result type alias for query operations.
pub type QueryResult<T> = Result<T, QueryError>;

/// Errors that can occur while constructing a client or running a query.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("failed to resolve {0}")]
    Resolve(String),

    #[error("socket error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no response within {0:?}")]
    Timeout(Duration),

    #[error("server returned an empty response")]
    EmptyResponse,

    #[error("unexpected response header: {0:#04x}")]
    UnexpectedHeader(u8),

    #[error("response truncated while reading {0}")]
    Truncated(&'static str),

    #[error("compressed split responses are not supported")]
    CompressedSplit,

    #[error("split response mismatch: {0}")]
    SplitMismatch(String),

    #[error("server kept issuing challenges after {0} attempts")]
    TooManyChallenges(usize),
}
