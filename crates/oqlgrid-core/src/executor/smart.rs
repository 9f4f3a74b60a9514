//! Picks between direct and two-phase execution per page request.

use tracing::debug;

use oqlgrid_proto::{PageRequest, ResultSet};

use crate::error::Result;
use crate::query::paging::{is_first_page, page_request, result_bound_for_page};
use crate::query::{Arguments, QueryMethod, QueryText};

use super::{OqlQueryExecutor, SharedExecutor};

/// How a paged invocation is satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionPath {
    /// Limit the full query to the page's result bound and slice.
    Direct,
    /// Fetch the page's keys first, then the rows for those keys.
    TwoPhase,
}

/// Routes paged invocations by how deep the requested page lies.
///
/// Early and small pages are cheap to fetch and slice; past the threshold
/// the key-then-fetch strategy avoids transferring rows that are dropped.
/// Declines invocations that do not request a page.
pub struct SmartExecutor {
    threshold: usize,
    direct: SharedExecutor,
    two_phase: Option<SharedExecutor>,
}

impl SmartExecutor {
    pub fn new(threshold: usize, direct: SharedExecutor, two_phase: Option<SharedExecutor>) -> Self {
        Self {
            threshold,
            direct,
            two_phase,
        }
    }

    /// Choose the execution path for `page`.
    pub fn select_path(&self, page: &PageRequest) -> ExecutionPath {
        if is_first_page(page) || result_bound_for_page(page) < self.threshold {
            ExecutionPath::Direct
        } else {
            ExecutionPath::TwoPhase
        }
    }
}

impl OqlQueryExecutor for SmartExecutor {
    fn execute(
        &self,
        method: &QueryMethod,
        query: &QueryText,
        args: &Arguments,
    ) -> Result<ResultSet> {
        let page = page_request(method, args)?;

        match (self.select_path(page), &self.two_phase) {
            (ExecutionPath::TwoPhase, Some(two_phase)) => {
                debug!(
                    method = %method.name,
                    page = page.page_number,
                    size = page.page_size,
                    "two-phase paged execution"
                );
                two_phase.execute(method, query, args)
            }
            _ => {
                debug!(
                    method = %method.name,
                    page = page.page_number,
                    size = page.page_size,
                    "direct paged execution"
                );
                self.direct.execute(method, query, args)
            }
        }
    }
}
