//! Error types for store access and query execution

use std::time::Duration;
use thiserror::Error;

/// Store-level errors
///
/// Timeout and evaluation failures are recoverable at the executor level
/// (absorbed into an empty result plus a log entry); connection and
/// protocol errors are fatal and propagate.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Query exceeded its execution bound
    #[error("query timed out after {0:?}")]
    Timeout(Duration),

    /// The store rejected or failed to evaluate the query
    #[error("query evaluation failed: {0}")]
    Evaluation(String),

    /// No connection could be acquired
    #[error("connection unavailable: {0}")]
    Connection(String),

    /// Unexpected store-level failure
    #[error("store protocol error: {0}")]
    Protocol(String),
}

/// Result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;
