//! Graph-store boundary, scoped connections, and query execution
//!
//! This crate owns the pipeline's store-facing side:
//!
//! - [`GraphStore`]: the opaque string-in, tuple-stream-out boundary
//! - [`StorePool`]/[`StoreConn`]: bounded pool with Drop-scoped guards
//! - [`QueryExecutor`]: timeout-bounded execution with the recovery policy
//!   (absorbed timeouts/evaluation failures, propagated protocol errors)
//! - [`MemoryStore`]: scriptable in-memory store for tests

pub mod error;
pub mod executor;
pub mod memory;
pub mod pool;
pub mod store;
pub mod tuple;

pub use error::{Result, StoreError};
pub use executor::{ExecutionReport, QueryExecutor};
pub use memory::MemoryStore;
pub use pool::{StoreConn, StorePool};
pub use store::{ClassInfo, GraphStore};
pub use tuple::{ResultTuple, TupleValue};
