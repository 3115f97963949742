//! Faceted aggregation and count wrapping
//!
//! Grouped requests never produce typed results; each requested group-by
//! property gets its own count-wrapped re-execution of the base query, and
//! the per-value counts are accumulated into one mapping per property.

use crate::error::Result;
use casegraph_store::{GraphStore, QueryExecutor};
use casegraph_vocab::query as qvocab;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

/// `property -> (group value -> count)`
pub type GroupCounts = HashMap<String, BTreeMap<String, u64>>;

/// Wrap a query so it yields a single `count` binding
pub fn count_query(base: &str) -> String {
    format!(
        "SELECT (COUNT(DISTINCT ?{iv}) AS ?{cv}) WHERE {{\n{{\n{base}}}\n}}\n",
        iv = qvocab::INSTANCE_VAR,
        cv = qvocab::COUNT_VAR,
    )
}

/// Wrap a query so it yields `(value, count)` rows for one property
pub fn group_query(base: &str, property: &str) -> String {
    format!(
        "SELECT ?{gv} (COUNT(DISTINCT ?{iv}) AS ?{cv}) WHERE {{\n{{\n{base}}}\n?{iv} <{property}> ?{gv} .\n}} GROUP BY ?{gv}\n",
        gv = qvocab::GROUP_VALUE_VAR,
        iv = qvocab::INSTANCE_VAR,
        cv = qvocab::COUNT_VAR,
    )
}

/// Run one group-by query per property and accumulate the counts
///
/// Returns the counts plus a degraded flag covering absorbed execution
/// failures in any of the per-property passes.
pub async fn aggregate_groups<S: GraphStore>(
    executor: &QueryExecutor<S>,
    base: &str,
    properties: &[String],
    bindings: &HashMap<String, String>,
    timeout: Duration,
) -> Result<(GroupCounts, bool)> {
    let mut counts = GroupCounts::new();
    let mut degraded = false;
    for property in properties {
        let query = group_query(base, property);
        let report = executor.execute(&query, bindings, timeout).await?;
        degraded |= report.degraded;
        let entry = counts.entry(property.clone()).or_default();
        for tuple in &report.tuples {
            let Some(value) = tuple.get(qvocab::GROUP_VALUE_VAR) else {
                continue;
            };
            let count = tuple
                .get(qvocab::COUNT_VAR)
                .and_then(|v| v.as_long())
                .unwrap_or(0)
                .max(0) as u64;
            *entry.entry(value.to_string()).or_insert(0) += count;
        }
        tracing::debug!(property = %property, groups = entry.len(), "aggregated facet counts");
    }
    Ok((counts, degraded))
}
