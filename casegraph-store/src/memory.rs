//! In-memory store for tests and embedding
//!
//! Responses are scripted in call order; class metadata is a plain map.
//! The store also records every executed query and counts metadata
//! lookups, which the cache-idempotence tests rely on.

use crate::error::{Result, StoreError};
use crate::store::{ClassInfo, GraphStore};
use crate::tuple::ResultTuple;
use async_trait::async_trait;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Default)]
struct Script {
    responses: VecDeque<Result<Vec<ResultTuple>>>,
    executed: Vec<String>,
}

/// Scriptable in-memory [`GraphStore`]
#[derive(Default)]
pub struct MemoryStore {
    script: Mutex<Script>,
    classes: Mutex<FxHashMap<String, ClassInfo>>,
    delay: Mutex<Option<Duration>>,
    class_lookups: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful response
    pub fn push_response(&self, tuples: Vec<ResultTuple>) {
        self.script.lock().responses.push_back(Ok(tuples));
    }

    /// Queue an error response
    pub fn push_error(&self, err: StoreError) {
        self.script.lock().responses.push_back(Err(err));
    }

    /// Register class metadata for a type IRI
    pub fn define_class(&self, type_uri: impl Into<String>, info: ClassInfo) {
        self.classes.lock().insert(type_uri.into(), info);
    }

    /// Delay every evaluation (for timeout tests)
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = Some(delay);
    }

    /// Queries executed so far, in order
    pub fn executed(&self) -> Vec<String> {
        self.script.lock().executed.clone()
    }

    /// How many metadata lookups the store has served
    pub fn class_lookups(&self) -> usize {
        self.class_lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GraphStore for MemoryStore {
    async fn evaluate(
        &self,
        query: &str,
        _bindings: &HashMap<String, String>,
    ) -> Result<Vec<ResultTuple>> {
        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let mut script = self.script.lock();
        script.executed.push(query.to_string());
        // An exhausted script evaluates to no matches.
        script.responses.pop_front().unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn resolve_class(&self, type_uri: &str) -> Result<Option<ClassInfo>> {
        self.class_lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.classes.lock().get(type_uri).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_responses_in_order() {
        let store = MemoryStore::new();
        store.push_response(vec![ResultTuple::new()]);
        store.push_response(vec![]);

        let first = store.evaluate("q1", &HashMap::new()).await.unwrap();
        let second = store.evaluate("q2", &HashMap::new()).await.unwrap();
        assert_eq!(first.len(), 1);
        assert!(second.is_empty());
        assert_eq!(store.executed(), vec!["q1".to_string(), "q2".to_string()]);
    }

    #[tokio::test]
    async fn test_exhausted_script_returns_empty() {
        let store = MemoryStore::new();
        let tuples = store.evaluate("q", &HashMap::new()).await.unwrap();
        assert!(tuples.is_empty());
    }

    #[tokio::test]
    async fn test_class_lookup_counted() {
        let store = MemoryStore::new();
        store.define_class("http://ex.org/Case", ClassInfo::new("http://ex.org/Case"));
        assert!(store
            .resolve_class("http://ex.org/Case")
            .await
            .unwrap()
            .is_some());
        assert!(store
            .resolve_class("http://ex.org/Unknown")
            .await
            .unwrap()
            .is_none());
        assert_eq!(store.class_lookups(), 2);
    }
}
