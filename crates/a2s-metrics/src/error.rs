//! Error types for the metric store.

use thiserror::Error;

/// Result type alias for metric store operations.
pub type MetricsResult<T> = Result<T, MetricsError>;

/// Errors that can occur while encoding the store.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("failed to encode metrics: {0}")]
    Encode(#[from] std::fmt::Error),
}
