//! Executor chain for repository queries.
//!
//! Each executor either handles an invocation or declines it with
//! [`Error::UnsupportedQueryShape`]. A declined invocation moves on to the
//! next link registered with [`OqlQueryExecutor::then_execute_with`]; any
//! other error stops the chain.
//!
//! The standard chain built by [`ExecutorChain::standard`] is:
//!
//! ```text
//! Smart ── direct ──▶ PageLimiting ─▶ SimplePaged ─▶ store
//!   │   └─ two-phase ▶ TwoPhase ─(declined)─▶ PageLimiting ...
//!   └─(declined: not paged)─▶ StoreQuery ─▶ store
//! ```

mod page_limiting;
mod simple_paged;
mod smart;
mod store_query;
mod two_phase;

use std::sync::Arc;

use tracing::debug;

use oqlgrid_proto::ResultSet;

use crate::config::ExecutorConfig;
use crate::error::Result;
use crate::query::{Arguments, QueryMethod, QueryText};
use crate::store::StoreExecutor;

pub use page_limiting::PageLimitingExecutor;
pub use simple_paged::SimplePagedExecutor;
pub use smart::{ExecutionPath, SmartExecutor};
pub use store_query::StoreQueryExecutor;
pub use two_phase::TwoPhaseExecutor;

/// Shared handle to an executor.
pub type SharedExecutor = Arc<dyn OqlQueryExecutor>;

/// Executes a query text for one method invocation.
pub trait OqlQueryExecutor: Send + Sync {
    /// Run `query` for `method` with `args`.
    ///
    /// Returns `Error::UnsupportedQueryShape` to decline.
    fn execute(&self, method: &QueryMethod, query: &QueryText, args: &Arguments)
        -> Result<ResultSet>;

    /// Fall back to `next` whenever this executor declines.
    fn then_execute_with<E>(self, next: E) -> FallbackExecutor
    where
        Self: Sized + 'static,
        E: OqlQueryExecutor + 'static,
    {
        FallbackExecutor::new(Arc::new(self), Arc::new(next))
    }
}

impl<T: OqlQueryExecutor + ?Sized> OqlQueryExecutor for Arc<T> {
    fn execute(
        &self,
        method: &QueryMethod,
        query: &QueryText,
        args: &Arguments,
    ) -> Result<ResultSet> {
        (**self).execute(method, query, args)
    }
}

/// A link pairing an executor with the one that takes over when it declines.
pub struct FallbackExecutor {
    primary: SharedExecutor,
    next: SharedExecutor,
}

impl FallbackExecutor {
    pub fn new(primary: SharedExecutor, next: SharedExecutor) -> Self {
        Self { primary, next }
    }
}

impl OqlQueryExecutor for FallbackExecutor {
    fn execute(
        &self,
        method: &QueryMethod,
        query: &QueryText,
        args: &Arguments,
    ) -> Result<ResultSet> {
        match self.primary.execute(method, query, args) {
            Err(e) if e.is_decline() => {
                debug!(method = %method.name, reason = %e, "executor declined, trying next link");
                self.next.execute(method, query, args)
            }
            other => other,
        }
    }
}

/// Assembles executor chains.
pub struct ExecutorChain;

impl ExecutorChain {
    /// Build the standard paged chain over `store`.
    pub fn standard(store: Arc<dyn StoreExecutor>, config: &ExecutorConfig) -> SharedExecutor {
        let plain: SharedExecutor = Arc::new(StoreQueryExecutor::new(store.clone()));
        let direct: SharedExecutor = Arc::new(PageLimitingExecutor::new(Arc::new(
            SimplePagedExecutor::new(store),
        )));

        let two_phase: Option<SharedExecutor> = if config.two_phase_enabled {
            Some(Arc::new(
                TwoPhaseExecutor::new(direct.clone(), plain.clone()).then_execute_with(direct.clone()),
            ))
        } else {
            None
        };

        let smart = SmartExecutor::new(config.two_phase_threshold, direct, two_phase);
        Arc::new(smart.then_execute_with(plain))
    }
}
