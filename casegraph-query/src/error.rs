//! Error types for query compilation

use thiserror::Error;

/// Query compilation errors
///
/// Compilation errors are fatal to the request: a query that fails to
/// compile is never sent to the store.
#[derive(Error, Debug)]
pub enum QueryError {
    /// No registered renderer matched the rule's operator
    #[error("no renderer registered for operator: {operator}")]
    UnsupportedOperator { operator: String },

    /// A condition was constructed with no children
    #[error("condition has no children")]
    EmptyCondition,

    /// A rule's shape does not satisfy its renderer
    #[error("invalid rule for operator {operator}: {reason}")]
    InvalidRule { operator: String, reason: String },
}

/// Result type for query compilation
pub type Result<T> = std::result::Result<T, QueryError>;
