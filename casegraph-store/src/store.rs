//! The graph-store boundary
//!
//! The pipeline treats the store as an opaque string-in, tuple-stream-out
//! boundary: a textual graph query and a bindings map go in, result tuples
//! come out. Connection pooling internals live behind this trait; the
//! pipeline is only responsible for scoped acquisition and release.

use crate::error::Result;
use crate::tuple::ResultTuple;
use async_trait::async_trait;
use std::collections::HashMap;

/// Concrete type resolved from a type IRI
///
/// Produced by store metadata lookups and cached process-wide by the
/// pipeline; the deployed schema is assumed immutable between restarts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassInfo {
    /// Class IRI
    pub uri: String,
    /// Human-readable label, when the schema carries one
    pub label: Option<String>,
}

impl ClassInfo {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// A triple-store-like backend
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Evaluate a query with named bindings, producing a finite,
    /// single-pass tuple sequence
    async fn evaluate(
        &self,
        query: &str,
        bindings: &HashMap<String, String>,
    ) -> Result<Vec<ResultTuple>>;

    /// Look up schema metadata for a type IRI; `None` means the type is
    /// unknown to the deployed schema
    async fn resolve_class(&self, type_uri: &str) -> Result<Option<ClassInfo>>;
}
