//! Memoizing type-URI to class cache
//!
//! Append-only and process-wide: once a mapping is computed it is never
//! invalidated (the deployed schema is assumed immutable between restarts).
//! Unknown types are cached as negative results so each missing type costs
//! one metadata lookup, not one per row. Safe for concurrent reads and
//! idempotent concurrent writes: racing writers compute the same value for
//! a given key and the first insert wins.
//!
//! The cache is an explicit value owned by the pipeline and injected where
//! needed, not a global.

use casegraph_store::{ClassInfo, GraphStore, StoreError};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Thread-safe, append-only type cache
#[derive(Debug, Default)]
pub struct TypeCache {
    entries: RwLock<FxHashMap<String, Option<Arc<ClassInfo>>>>,
}

impl TypeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a type IRI, consulting the store on a miss
    ///
    /// `Ok(None)` means the type is unknown to the schema; that answer is
    /// cached too.
    pub async fn resolve<S: GraphStore>(
        &self,
        store: &S,
        type_uri: &str,
    ) -> Result<Option<Arc<ClassInfo>>, StoreError> {
        if let Some(hit) = self.entries.read().get(type_uri) {
            return Ok(hit.clone());
        }
        let resolved = store.resolve_class(type_uri).await?.map(Arc::new);
        let mut entries = self.entries.write();
        let entry = entries
            .entry(type_uri.to_string())
            .or_insert_with(|| resolved);
        Ok(entry.clone())
    }

    /// Number of cached mappings, negative results included
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use casegraph_store::MemoryStore;

    #[tokio::test]
    async fn test_second_resolve_is_a_cache_hit() {
        let store = MemoryStore::new();
        store.define_class("http://ex.org/Case", ClassInfo::new("http://ex.org/Case"));
        let cache = TypeCache::new();

        let first = cache.resolve(&store, "http://ex.org/Case").await.unwrap();
        let second = cache.resolve(&store, "http://ex.org/Case").await.unwrap();

        assert!(Arc::ptr_eq(first.as_ref().unwrap(), second.as_ref().unwrap()));
        assert_eq!(store.class_lookups(), 1);
    }

    #[tokio::test]
    async fn test_negative_result_cached() {
        let store = MemoryStore::new();
        let cache = TypeCache::new();

        assert!(cache
            .resolve(&store, "http://ex.org/Unknown")
            .await
            .unwrap()
            .is_none());
        assert!(cache
            .resolve(&store, "http://ex.org/Unknown")
            .await
            .unwrap()
            .is_none());
        assert_eq!(store.class_lookups(), 1);
        assert_eq!(cache.len(), 1);
    }
}
