//! Query execution against the pooled store
//!
//! The executor acquires a scoped connection, evaluates the query under a
//! hard timeout, and applies the recovery policy: timeouts and evaluation
//! failures are absorbed into an empty result plus a log entry (a search
//! never crashes its caller), while unexpected store errors propagate.

use crate::error::{Result, StoreError};
use crate::pool::StorePool;
use crate::store::GraphStore;
use crate::tuple::ResultTuple;
use std::collections::HashMap;
use std::time::Duration;

/// Result of one execution, with a flag for absorbed failures
///
/// `degraded` is the only way a caller can tell an absorbed timeout or
/// evaluation failure apart from a genuinely empty result.
#[derive(Debug, Default)]
pub struct ExecutionReport {
    pub tuples: Vec<ResultTuple>,
    pub degraded: bool,
}

impl ExecutionReport {
    fn absorbed() -> Self {
        Self {
            tuples: Vec::new(),
            degraded: true,
        }
    }
}

/// Runs queries through the pool with scoped connections
#[derive(Debug)]
pub struct QueryExecutor<S> {
    pool: StorePool<S>,
}

impl<S: GraphStore> QueryExecutor<S> {
    pub fn new(pool: StorePool<S>) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &StorePool<S> {
        &self.pool
    }

    /// Execute a query with the supplied hard timeout
    ///
    /// The connection guard lives exactly as long as this call; it is
    /// dropped (and the slot released) on every path out, including the
    /// timeout and error arms.
    pub async fn execute(
        &self,
        query: &str,
        bindings: &HashMap<String, String>,
        timeout: Duration,
    ) -> Result<ExecutionReport> {
        let conn = self.pool.acquire().await?;
        let evaluated = tokio::time::timeout(timeout, conn.store().evaluate(query, bindings)).await;
        match evaluated {
            Err(_elapsed) => {
                tracing::warn!(?timeout, query, "query timed out; returning empty result");
                Ok(ExecutionReport::absorbed())
            }
            Ok(Err(StoreError::Timeout(bound))) => {
                tracing::warn!(?bound, query, "store aborted query on timeout; returning empty result");
                Ok(ExecutionReport::absorbed())
            }
            Ok(Err(StoreError::Evaluation(reason))) => {
                tracing::warn!(
                    reason,
                    query,
                    ?bindings,
                    "query evaluation failed; returning empty result"
                );
                Ok(ExecutionReport::absorbed())
            }
            Ok(Err(fatal)) => Err(fatal),
            Ok(Ok(tuples)) => Ok(ExecutionReport {
                tuples,
                degraded: false,
            }),
        }
    }
}
