//! Condition-tree compilation and query augmentation for casegraph
//!
//! This crate turns an abstract boolean search-condition tree into a
//! graph-query string and decorates it with the clauses a request needs:
//!
//! - [`Condition`]/[`Rule`]: the condition-tree data model
//! - [`OperationRegistry`]: ordered, first-match-wins rule renderers
//! - [`QueryCompiler`]: junction-aware tree-to-text compilation
//! - [`QueryAugmenter`]: permission filter, ORDER BY, OFFSET/LIMIT,
//!   full-text connector substitution
//! - [`Window`]: bounded-window pagination arithmetic
//! - [`Facet`] helpers: selection expansion and date-range merging
//!
//! Compilation errors are fatal (a query that fails to compile never
//! executes); everything here is request-local and side-effect free.

pub mod args;
pub mod augment;
pub mod compile;
pub mod condition;
pub mod error;
pub mod facet;
pub mod paginate;
pub mod registry;
pub mod sorter;

pub use args::{
    date_range_rules, to_bindings, ArgumentValue, DateRange, Paging, PermissionMode, QuerySource,
    SearchArguments, DEFAULT_MAX_WINDOW, DEFAULT_TIMEOUT,
};
pub use augment::{
    insert_permission_filter, parse_offset_limit, Augmented, PermissionFilter, PermissionOutcome,
    QueryAugmenter,
};
pub use compile::QueryCompiler;
pub use condition::{Condition, Junction, Node, Rule, ValueType};
pub use error::{QueryError, Result};
pub use facet::{facet_date_arguments, facet_rules, merge_date_arguments, Facet, RangeClass};
pub use paginate::Window;
pub use registry::{OperationRegistry, RuleRenderer};
pub use sorter::{SortDirection, Sorter};
