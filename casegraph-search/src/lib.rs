//! Search pipeline for casegraph
//!
//! This crate ties the query and store layers into one request flow:
//!
//! - [`SearchPipeline`]: compile → augment → execute → map
//! - [`AuthSnapshot`]: authorization context captured before any worker
//!   is spawned and passed explicitly
//! - [`TypeCache`]: process-wide, append-only type-URI → class cache
//! - [`ResultMapper`]: typed mapping, count short-circuit, client-side
//!   sort fallback, ordered parallel tuple processing
//! - facet/group-by aggregation over count-wrapped re-executions
//!
//! # Usage
//!
//! Build a [`SearchPipeline`] over a [`casegraph_store::GraphStore`] with a
//! [`SearchConfig`], then call [`SearchPipeline::search`] with the request
//! arguments and the authorization collaborator. The outcome is either a
//! page of typed results with a total count or, for grouped requests, a
//! per-property aggregation mapping.

pub mod aggregate;
pub mod auth;
pub mod error;
pub mod mapper;
pub mod pipeline;
pub mod text;
pub mod type_cache;

pub use aggregate::{aggregate_groups, count_query, group_query, GroupCounts};
pub use auth::{AuthSnapshot, Authorizer, StaticAuthorizer};
pub use error::{Result, SearchError};
pub use mapper::{compare_sort_keys, read_count, sort_results, ResultMapper, TypedResult};
pub use pipeline::{SearchConfig, SearchOutcome, SearchPage, SearchPipeline};
pub use text::{PassthroughParser, TextQueryParser};
pub use type_cache::TypeCache;
