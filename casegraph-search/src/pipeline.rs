//! The search pipeline
//!
//! One synchronous request from the caller's perspective:
//! capture the authorization snapshot, merge facet-derived date ranges,
//! compile (or take the literal query verbatim), augment, execute, map.
//! Grouped requests branch into per-property aggregation; count-only
//! requests stop after the count-wrapped execution.

use crate::aggregate::{aggregate_groups, count_query, GroupCounts};
use crate::auth::{AuthSnapshot, Authorizer};
use crate::error::{Result, SearchError};
use crate::mapper::{read_count, sort_results, ResultMapper, TypedResult};
use crate::text::{PassthroughParser, TextQueryParser};
use crate::type_cache::TypeCache;
use casegraph_query::{
    date_range_rules, facet_date_arguments, facet_rules, merge_date_arguments, to_bindings,
    ArgumentValue, Condition, Node, OperationRegistry, PermissionFilter, PermissionOutcome,
    QueryAugmenter, QueryCompiler, QuerySource, Rule, SearchArguments, ValueType, Window,
};
use casegraph_store::{GraphStore, QueryExecutor, StorePool};
use casegraph_vocab::text as tvocab;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::Instrument;

/// Pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Identifier substituted for the full-text connector placeholder
    pub connector: String,
    /// Whether the store performs ORDER BY; disabled defers sorting to
    /// the mapper
    pub sort_pushdown: bool,
    /// Parallel workers for tuple mapping (1 = sequential)
    pub parallelism: usize,
    /// Concurrent store connections
    pub pool_size: usize,
    /// Fail the request instead of running unfiltered when no permission
    /// insertion point exists
    pub strict_permissions: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            connector: "text-index".to_string(),
            sort_pushdown: true,
            parallelism: 4,
            pool_size: 8,
            strict_permissions: false,
        }
    }
}

/// One page of typed results
#[derive(Debug)]
pub struct SearchPage {
    pub results: Vec<TypedResult>,
    /// Total matching items, independent of paging
    pub total: u64,
    /// Set when a timeout or evaluation failure was absorbed into an
    /// empty result along the way
    pub degraded: bool,
}

/// Pipeline output: a result page or per-property aggregation counts
#[derive(Debug)]
pub enum SearchOutcome {
    Page(SearchPage),
    Grouped { counts: GroupCounts, degraded: bool },
}

/// Compile-augment-execute-map orchestrator
pub struct SearchPipeline<S> {
    executor: QueryExecutor<S>,
    registry: OperationRegistry,
    augmenter: QueryAugmenter,
    mapper: ResultMapper,
    cache: Arc<TypeCache>,
    text_parser: Box<dyn TextQueryParser>,
    strict_permissions: bool,
}

impl<S: GraphStore> SearchPipeline<S> {
    pub fn new(store: impl Into<Arc<S>>, config: SearchConfig) -> Self {
        Self {
            executor: QueryExecutor::new(StorePool::new(store, config.pool_size)),
            registry: OperationRegistry::with_defaults(),
            augmenter: QueryAugmenter::new(config.connector, config.sort_pushdown),
            mapper: ResultMapper::new(config.parallelism),
            cache: Arc::new(TypeCache::new()),
            text_parser: Box::new(PassthroughParser),
            strict_permissions: config.strict_permissions,
        }
    }

    /// Replace the operation registry (custom renderers)
    pub fn with_registry(mut self, registry: OperationRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Replace the free-text query parser
    pub fn with_text_parser(mut self, parser: Box<dyn TextQueryParser>) -> Self {
        self.text_parser = parser;
        self
    }

    /// The process-wide type cache
    pub fn type_cache(&self) -> &Arc<TypeCache> {
        &self.cache
    }

    /// Run one search request
    pub async fn search(
        &self,
        args: &SearchArguments,
        auth: &dyn Authorizer,
    ) -> Result<SearchOutcome> {
        // Captured once, before any worker is spawned.
        let snapshot = AuthSnapshot::capture(auth);
        let span = tracing::debug_span!(
            "search",
            user = %snapshot.user_id,
            privileged = snapshot.privileged,
            grouped = !args.group_by.is_empty(),
            count_only = args.count_only,
        );
        self.search_inner(args, snapshot).instrument(span).await
    }

    async fn search_inner(
        &self,
        args: &SearchArguments,
        snapshot: AuthSnapshot,
    ) -> Result<SearchOutcome> {
        let mut arguments = args.arguments.clone();
        merge_date_arguments(&mut arguments, &facet_date_arguments(&args.facets));
        let bindings = to_bindings(&arguments);

        let base = self.base_query(args, &arguments)?;
        let filter = PermissionFilter {
            mode: args.permission_mode,
            privileged: snapshot.privileged,
            user_id: &snapshot.user_id,
        };

        // Count and group passes share the core augmentation (connector
        // and permission only, no sort or paging clauses).
        let core = self.augmenter.augment_core(&base, &filter);
        self.check_permission(core.permission)?;

        if !args.group_by.is_empty() {
            let (counts, degraded) = aggregate_groups(
                &self.executor,
                &core.query,
                &args.group_by,
                &bindings,
                args.timeout,
            )
            .await?;
            return Ok(SearchOutcome::Grouped { counts, degraded });
        }

        let count_report = self
            .executor
            .execute(&count_query(&core.query), &bindings, args.timeout)
            .await?;
        let total = read_count(&count_report.tuples);

        if args.count_only {
            return Ok(SearchOutcome::Page(SearchPage {
                results: Vec::new(),
                total,
                degraded: count_report.degraded,
            }));
        }

        let window = Window::compute(
            args.paging.max_window,
            args.paging.page_size,
            args.paging.page_number,
            false,
        );
        let augmented =
            self.augmenter
                .augment(&base, &filter, &args.sorters, window, args.paging.page_size);
        self.check_permission(augmented.permission)?;

        let report = self
            .executor
            .execute(&augmented.query, &bindings, args.timeout)
            .await?;
        let primary_sort = args.sorters.first().map(|s| s.sort_var());
        let mut results = self
            .mapper
            .map_tuples(
                report.tuples,
                self.executor.pool().store(),
                &self.cache,
                &snapshot,
                primary_sort.as_deref(),
            )
            .await?;

        if !self.augmenter.sort_pushdown() {
            if let Some(primary) = args.sorters.first() {
                sort_results(&mut results, primary.direction);
            }
        }
        let skip = (window.in_memory_skip as usize).min(results.len());
        results.drain(..skip);
        if args.paging.page_size > 0 {
            results.truncate(args.paging.page_size as usize);
        }

        Ok(SearchOutcome::Page(SearchPage {
            results,
            total,
            degraded: count_report.degraded || report.degraded,
        }))
    }

    /// Build the base query text: literal verbatim, or the condition tree
    /// AND-ed with facet, date-range, and free-text rules, compiled
    fn base_query(
        &self,
        args: &SearchArguments,
        arguments: &HashMap<String, ArgumentValue>,
    ) -> Result<String> {
        let tree = match &args.query {
            QuerySource::Literal(query) => return Ok(query.clone()),
            QuerySource::Tree(tree) => tree,
        };

        let mut extra: Vec<Node> = facet_rules(&args.facets);
        extra.extend(date_range_rules(arguments));
        if let Some(raw) = &args.text_query {
            let parsed = self.text_parser.parse(raw);
            if !parsed.is_empty() {
                extra.push(Node::Rule(Rule::new(
                    tvocab::MATCHES,
                    "contains",
                    parsed,
                    ValueType::String,
                )));
            }
        }

        let tree = if extra.is_empty() {
            tree.clone()
        } else {
            let mut children = vec![Node::Condition(tree.clone())];
            children.extend(extra);
            Condition::all(children)?
        };
        Ok(QueryCompiler::new(&self.registry).compile(&tree)?)
    }

    fn check_permission(&self, outcome: PermissionOutcome) -> Result<()> {
        if self.strict_permissions && outcome == PermissionOutcome::InsertionFailed {
            return Err(SearchError::PermissionInsertion);
        }
        Ok(())
    }
}
