//! Tuple-to-typed-result mapping
//!
//! For each tuple the mapper resolves the bound type IRI through the
//! injected [`TypeCache`], extracts all bound properties, and records the
//! canonical sort key for bindings carrying the generated sort suffix.
//! Rows whose type cannot be resolved are dropped with a warning; the
//! request still succeeds (partial-failure tolerance, not a hard error).
//!
//! When configured, tuple processing runs on parallel workers in ordered
//! chunks. Each worker receives the captured [`AuthSnapshot`] explicitly;
//! the only shared mutable state is the type cache, which is safe for
//! idempotent concurrent writes.

use crate::auth::AuthSnapshot;
use crate::error::Result;
use crate::type_cache::TypeCache;
use casegraph_query::SortDirection;
use casegraph_store::{ClassInfo, GraphStore, ResultTuple, TupleValue};
use casegraph_vocab::{query as qvocab, sort};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::Instrument;

/// One typed search hit
#[derive(Debug, Clone)]
pub struct TypedResult {
    /// Subject IRI
    pub id: String,
    /// Resolved concrete type
    pub class: Arc<ClassInfo>,
    /// All bound properties of the row
    pub properties: HashMap<String, TupleValue>,
    /// Canonical sort key, independent of the generated variable name
    pub sort_key: Option<TupleValue>,
}

/// Converts tuple streams into typed results
#[derive(Debug, Clone)]
pub struct ResultMapper {
    parallelism: usize,
}

impl ResultMapper {
    /// `parallelism` below 2 maps sequentially
    pub fn new(parallelism: usize) -> Self {
        Self {
            parallelism: parallelism.max(1),
        }
    }

    /// Map a tuple sequence, preserving input order
    ///
    /// `primary_sort` names the binding of the primary sorter; when a tuple
    /// carries several sort bindings, that one becomes the canonical key.
    pub async fn map_tuples<S: GraphStore>(
        &self,
        tuples: Vec<ResultTuple>,
        store: &Arc<S>,
        cache: &Arc<TypeCache>,
        auth: &AuthSnapshot,
        primary_sort: Option<&str>,
    ) -> Result<Vec<TypedResult>> {
        if self.parallelism < 2 || tuples.len() < 2 {
            return map_chunk(tuples, store, cache, auth, primary_sort).await;
        }

        let chunk_size = tuples.len().div_ceil(self.parallelism);
        let chunks: Vec<Vec<ResultTuple>> = tuples
            .chunks(chunk_size)
            .map(|c| c.to_vec())
            .collect();
        // Snapshot and cache are threaded into every worker explicitly;
        // join preserves chunk order.
        let futures: Vec<_> = chunks
            .into_iter()
            .map(|chunk| {
                let auth = auth.clone();
                let store = Arc::clone(store);
                let cache = Arc::clone(cache);
                let primary = primary_sort.map(str::to_string);
                async move { map_chunk(chunk, &store, &cache, &auth, primary.as_deref()).await }
            })
            .collect();
        let mapped = futures::future::try_join_all(futures).await?;
        Ok(mapped.into_iter().flatten().collect())
    }
}

async fn map_chunk<S: GraphStore>(
    tuples: Vec<ResultTuple>,
    store: &Arc<S>,
    cache: &Arc<TypeCache>,
    auth: &AuthSnapshot,
    primary_sort: Option<&str>,
) -> Result<Vec<TypedResult>> {
    let span = tracing::debug_span!(
        "map_tuples",
        user = %auth.user_id,
        rows = tuples.len()
    );
    async move {
        let mut results = Vec::with_capacity(tuples.len());
        for tuple in tuples {
            if let Some(result) = map_one(&tuple, store.as_ref(), cache, primary_sort).await? {
                results.push(result);
            }
        }
        Ok(results)
    }
    .instrument(span)
    .await
}

async fn map_one<S: GraphStore>(
    tuple: &ResultTuple,
    store: &S,
    cache: &TypeCache,
    primary_sort: Option<&str>,
) -> Result<Option<TypedResult>> {
    let Some(id) = tuple.get(qvocab::INSTANCE_VAR).map(ToString::to_string) else {
        tracing::warn!("row without instance binding dropped");
        return Ok(None);
    };
    let Some(type_uri) = tuple
        .get(qvocab::INSTANCE_TYPE_VAR)
        .map(ToString::to_string)
    else {
        tracing::warn!(id, "row without type binding dropped");
        return Ok(None);
    };
    let Some(class) = cache.resolve(store, &type_uri).await? else {
        tracing::warn!(id, type_uri, "unresolved type; row dropped");
        return Ok(None);
    };

    let mut properties = HashMap::new();
    let mut sort_key: Option<(String, TupleValue)> = None;
    for (name, value) in tuple.iter() {
        if name == qvocab::INSTANCE_VAR || name == qvocab::INSTANCE_TYPE_VAR {
            continue;
        }
        if name.ends_with(sort::SUFFIX) {
            // The primary sorter's binding wins; without one, pick
            // deterministically by name.
            match (&sort_key, primary_sort) {
                (_, Some(primary)) if name == primary => {
                    sort_key = Some((name.clone(), value.clone()));
                }
                (Some((existing, _)), Some(primary)) if existing == primary => {}
                (Some((existing, _)), _) if existing <= name => {}
                _ => sort_key = Some((name.clone(), value.clone())),
            }
        }
        properties.insert(name.clone(), value.clone());
    }

    Ok(Some(TypedResult {
        id,
        class,
        properties,
        sort_key: sort_key.map(|(_, v)| v),
    }))
}

/// Read the total from a count-wrapped query's first tuple
pub fn read_count(tuples: &[ResultTuple]) -> u64 {
    tuples
        .first()
        .and_then(|t| t.get(qvocab::COUNT_VAR))
        .map(|v| match v {
            TupleValue::Long(n) => (*n).max(0) as u64,
            other => other.to_string().parse().unwrap_or(0),
        })
        .unwrap_or(0)
}

/// Compare two canonical sort keys
///
/// Strings compare case-insensitively; values of the same comparable
/// variant use natural ordering; anything else (absent key or a type
/// mismatch) is treated as equal so sorting never fails.
pub fn compare_sort_keys(a: Option<&TupleValue>, b: Option<&TupleValue>) -> Ordering {
    match (a, b) {
        (Some(TupleValue::String(a)), Some(TupleValue::String(b))) => {
            a.to_lowercase().cmp(&b.to_lowercase())
        }
        (Some(TupleValue::Iri(a)), Some(TupleValue::Iri(b))) => a.cmp(b),
        (Some(TupleValue::Long(a)), Some(TupleValue::Long(b))) => a.cmp(b),
        (Some(TupleValue::Double(a)), Some(TupleValue::Double(b))) => {
            a.partial_cmp(b).unwrap_or(Ordering::Equal)
        }
        (Some(TupleValue::Boolean(a)), Some(TupleValue::Boolean(b))) => a.cmp(b),
        (Some(TupleValue::Date(a)), Some(TupleValue::Date(b))) => a.cmp(b),
        (Some(TupleValue::DateTime(a)), Some(TupleValue::DateTime(b))) => a.cmp(b),
        _ => Ordering::Equal,
    }
}

/// Client-side sort fallback over the canonical sort keys
///
/// Used when the store is not configured to perform the sort. Stable, so
/// rows the comparator cannot order keep their store order.
pub fn sort_results(results: &mut [TypedResult], direction: SortDirection) {
    results.sort_by(|a, b| {
        let ordering = compare_sort_keys(a.sort_key.as_ref(), b.sort_key.as_ref());
        match direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthSnapshot, StaticAuthorizer};
    use casegraph_store::MemoryStore;

    fn snapshot() -> AuthSnapshot {
        AuthSnapshot::capture(&StaticAuthorizer::user("alice"))
    }

    fn store_with_case_class() -> Arc<MemoryStore> {
        let store = MemoryStore::new();
        store.define_class(
            "http://ex.org/Case",
            ClassInfo::new("http://ex.org/Case").with_label("Case"),
        );
        Arc::new(store)
    }

    fn case_tuple(id: &str, title: &str) -> ResultTuple {
        ResultTuple::new()
            .bind(qvocab::INSTANCE_VAR, TupleValue::Iri(id.into()))
            .bind(
                qvocab::INSTANCE_TYPE_VAR,
                TupleValue::Iri("http://ex.org/Case".into()),
            )
            .bind("title", TupleValue::String(title.into()))
            .bind("title_sort", TupleValue::String(title.into()))
    }

    // ===== mapping =====

    #[tokio::test]
    async fn test_map_extracts_properties_and_sort_key() {
        let store = store_with_case_class();
        let cache = Arc::new(TypeCache::new());
        let mapper = ResultMapper::new(1);

        let results = mapper
            .map_tuples(
                vec![case_tuple("http://ex.org/1", "Annual report")],
                &store,
                &cache,
                &snapshot(),
                None,
            )
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        let result = &results[0];
        assert_eq!(result.id, "http://ex.org/1");
        assert_eq!(result.class.label.as_deref(), Some("Case"));
        assert_eq!(
            result.properties.get("title"),
            Some(&TupleValue::String("Annual report".into()))
        );
        assert_eq!(
            result.sort_key,
            Some(TupleValue::String("Annual report".into()))
        );
        // Canonical projection vars are not properties.
        assert!(!result.properties.contains_key(qvocab::INSTANCE_VAR));
    }

    #[tokio::test]
    async fn test_primary_sort_binding_wins_over_name_order() {
        let store = store_with_case_class();
        let cache = Arc::new(TypeCache::new());
        let mapper = ResultMapper::new(1);

        // "author_sort" precedes "title_sort" lexicographically; the
        // requested primary binding must still win.
        let tuple = case_tuple("http://ex.org/1", "zen")
            .bind("author_sort", TupleValue::String("aardvark".into()));
        let results = mapper
            .map_tuples(vec![tuple], &store, &cache, &snapshot(), Some("title_sort"))
            .await
            .unwrap();

        assert_eq!(
            results[0].sort_key,
            Some(TupleValue::String("zen".into()))
        );
    }

    #[tokio::test]
    async fn test_unresolved_type_row_dropped() {
        let store = store_with_case_class();
        let cache = Arc::new(TypeCache::new());
        let mapper = ResultMapper::new(1);

        let unknown = ResultTuple::new()
            .bind(qvocab::INSTANCE_VAR, TupleValue::Iri("http://ex.org/2".into()))
            .bind(
                qvocab::INSTANCE_TYPE_VAR,
                TupleValue::Iri("http://ex.org/Ghost".into()),
            );
        let results = mapper
            .map_tuples(
                vec![case_tuple("http://ex.org/1", "a"), unknown],
                &store,
                &cache,
                &snapshot(),
                None,
            )
            .await
            .unwrap();

        // Unknown-type row skipped, request still succeeds.
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "http://ex.org/1");
    }

    #[tokio::test]
    async fn test_parallel_mapping_preserves_order() {
        let store = store_with_case_class();
        let cache = Arc::new(TypeCache::new());
        let mapper = ResultMapper::new(4);

        let tuples: Vec<ResultTuple> = (0..20)
            .map(|i| case_tuple(&format!("http://ex.org/{i}"), &format!("t{i}")))
            .collect();
        let results = mapper
            .map_tuples(tuples, &store, &cache, &snapshot(), None)
            .await
            .unwrap();

        let ids: Vec<&str> = results.iter().map(|r| r.id.as_str()).collect();
        let expected: Vec<String> = (0..20).map(|i| format!("http://ex.org/{i}")).collect();
        assert_eq!(ids, expected.iter().map(String::as_str).collect::<Vec<_>>());
        // One metadata lookup total, regardless of worker count.
        assert_eq!(store.class_lookups(), 1);
    }

    // ===== count =====

    #[test]
    fn test_read_count_long_and_lexical() {
        let tuples = vec![ResultTuple::new().bind(qvocab::COUNT_VAR, TupleValue::Long(42))];
        assert_eq!(read_count(&tuples), 42);

        let tuples = vec![ResultTuple::new()
            .bind(qvocab::COUNT_VAR, TupleValue::String("17".into()))];
        assert_eq!(read_count(&tuples), 17);

        assert_eq!(read_count(&[]), 0);
    }

    // ===== sort fallback =====

    #[test]
    fn test_strings_compare_case_insensitively() {
        let apple = TupleValue::String("Apple".into());
        let banana = TupleValue::String("banana".into());
        assert_eq!(
            compare_sort_keys(Some(&apple), Some(&banana)),
            Ordering::Less
        );
    }

    #[test]
    fn test_missing_key_is_equal() {
        let value = TupleValue::Long(1);
        assert_eq!(compare_sort_keys(None, Some(&value)), Ordering::Equal);
        assert_eq!(compare_sort_keys(Some(&value), None), Ordering::Equal);
        assert_eq!(compare_sort_keys(None, None), Ordering::Equal);
    }

    #[test]
    fn test_type_mismatch_is_equal() {
        let s = TupleValue::String("x".into());
        let n = TupleValue::Long(1);
        assert_eq!(compare_sort_keys(Some(&s), Some(&n)), Ordering::Equal);
    }

    #[test]
    fn test_descending_reverses() {
        let class = Arc::new(ClassInfo::new("http://ex.org/Case"));
        let mut results: Vec<TypedResult> = ["b", "a", "c"]
            .iter()
            .map(|v| TypedResult {
                id: format!("http://ex.org/{v}"),
                class: Arc::clone(&class),
                properties: HashMap::new(),
                sort_key: Some(TupleValue::String((*v).into())),
            })
            .collect();

        sort_results(&mut results, SortDirection::Descending);
        let keys: Vec<&str> = results
            .iter()
            .filter_map(|r| r.sort_key.as_ref().and_then(TupleValue::as_str))
            .collect();
        assert_eq!(keys, vec!["c", "b", "a"]);
    }
}
