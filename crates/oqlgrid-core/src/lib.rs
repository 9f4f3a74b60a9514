//! OQLGrid Core - OQL query construction and paged execution.
//!
//! This crate builds OQL statements for repository methods, runs them through
//! a chain of paging executors and shapes the results for the caller.

pub mod config;
pub mod error;
pub mod executor;
pub mod query;
pub mod store;

pub use config::{ExecutorConfig, DEFAULT_TWO_PHASE_THRESHOLD};
pub use error::{Error, Result};
pub use executor::{
    ExecutionPath, ExecutorChain, FallbackExecutor, OqlQueryExecutor, PageLimitingExecutor,
    SharedExecutor, SimplePagedExecutor, SmartExecutor, StoreQueryExecutor, TwoPhaseExecutor,
};
pub use query::{
    shape, Arguments, EntityMetadata, Part, PartKind, PartTree, QueryCreator, QueryMethod,
    QueryPostProcessor, QueryText, RepositoryQuery, ReturnShape, Shaped,
};
pub use store::{StoreError, StoreExecutor};

/// Re-export protocol types.
pub use oqlgrid_proto as proto;
