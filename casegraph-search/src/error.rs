//! Error types for the search pipeline

use casegraph_query::QueryError;
use casegraph_store::StoreError;
use thiserror::Error;

/// Pipeline errors
#[derive(Error, Debug)]
pub enum SearchError {
    /// Compilation failure (fatal, query never executed)
    #[error("query compilation failed: {0}")]
    Query(#[from] QueryError),

    /// Store failure that was not absorbed by the executor
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Permission clause could not be inserted and the pipeline is
    /// configured to fail closed
    #[error("no insertion point for permission filter")]
    PermissionInsertion,
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, SearchError>;
