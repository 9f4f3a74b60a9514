//! Bounds paged queries with a LIMIT before handing them on.

use tracing::{debug, warn};

use oqlgrid_proto::{PageRequest, ResultSet};

use crate::error::{Error, Result};
use crate::query::paging::{end_offset, page_request, result_bound_for_page, start_offset};
use crate::query::{Arguments, QueryMethod, QueryText};

use super::{OqlQueryExecutor, SharedExecutor};

/// Rewrites the query's LIMIT to the page's result bound, then delegates to
/// a paging executor that slices the page out.
pub struct PageLimitingExecutor {
    inner: SharedExecutor,
}

impl PageLimitingExecutor {
    pub fn new(inner: SharedExecutor) -> Self {
        Self { inner }
    }

    /// Apply the page's result bound to `query`.
    ///
    /// A LIMIT declared by the query itself is only ever tightened. When it
    /// ends before the page starts the invocation cannot be satisfied.
    pub fn limit_for_page(query: &QueryText, page: &PageRequest) -> Result<QueryText> {
        let bound = result_bound_for_page(page);

        let existing = match query.limit() {
            Some(existing) => existing,
            None => return Ok(query.with_limit(bound)),
        };

        if bound < existing {
            return Ok(query.adjust_limit(Some(bound)));
        }

        let start = start_offset(page);
        if existing <= start {
            return Err(Error::LimitBelowPageOffset {
                limit: existing,
                offset: start,
            });
        }

        let end = end_offset(page);
        if existing < end {
            warn!(
                limit = existing,
                page_start = start,
                page_end = end,
                "query LIMIT ends inside the requested page; page will be truncated"
            );
        }
        Ok(query.clone())
    }
}

impl OqlQueryExecutor for PageLimitingExecutor {
    fn execute(
        &self,
        method: &QueryMethod,
        query: &QueryText,
        args: &Arguments,
    ) -> Result<ResultSet> {
        let page = page_request(method, args)?;
        let limited = Self::limit_for_page(query, page)?;
        debug!(method = %method.name, query = %limited, "limited paged query");
        self.inner.execute(method, &limited, args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use parking_lot::Mutex;

    use oqlgrid_proto::Value;

    use crate::executor::SimplePagedExecutor;
    use crate::query::{EntityMetadata, ReturnShape};
    use crate::store::StoreError;

    fn q(text: &str) -> QueryText {
        QueryText::new(text).unwrap()
    }

    #[test]
    fn test_adds_limit_when_absent() {
        let limited = PageLimitingExecutor::limit_for_page(&q("SELECT * FROM /X"), &PageRequest::of(2, 10))
            .unwrap();
        assert_eq!(limited.as_str(), "SELECT * FROM /X LIMIT 30");
    }

    #[test]
    fn test_tightens_larger_limit() {
        let limited =
            PageLimitingExecutor::limit_for_page(&q("SELECT * FROM /X LIMIT 100"), &PageRequest::of(0, 10))
                .unwrap();
        assert_eq!(limited.as_str(), "SELECT * FROM /X LIMIT 10");
    }

    #[test]
    fn test_replaces_limit_too_large_for_usize() {
        let limited = PageLimitingExecutor::limit_for_page(
            &q("SELECT * FROM /X LIMIT 99999999999999999999999"),
            &PageRequest::of(0, 20),
        )
        .unwrap();
        assert_eq!(limited.as_str(), "SELECT * FROM /X LIMIT 20");
    }

    #[test]
    fn test_keeps_smaller_limit_that_covers_the_page_start() {
        // bound 30, limit 25: page [20, 30) is truncated to [20, 25)
        let query = q("SELECT * FROM /X LIMIT 25");
        let limited = PageLimitingExecutor::limit_for_page(&query, &PageRequest::of(2, 10)).unwrap();
        assert_eq!(limited, query);

        let query = q("SELECT * FROM /X LIMIT 30");
        let limited = PageLimitingExecutor::limit_for_page(&query, &PageRequest::of(2, 10)).unwrap();
        assert_eq!(limited, query);
    }

    #[test]
    fn test_rejects_limit_before_page_start() {
        let result =
            PageLimitingExecutor::limit_for_page(&q("SELECT * FROM /X LIMIT 40"), &PageRequest::of(5, 10));
        assert!(matches!(
            result,
            Err(Error::LimitBelowPageOffset {
                limit: 40,
                offset: 50
            })
        ));

        let result =
            PageLimitingExecutor::limit_for_page(&q("SELECT * FROM /X LIMIT 50"), &PageRequest::of(5, 10));
        assert!(matches!(result, Err(Error::LimitBelowPageOffset { .. })));
    }

    #[test]
    fn test_precondition_failure_never_reaches_store() {
        let calls = Arc::new(Mutex::new(0usize));
        let counter = calls.clone();
        let store = move |_: &str, _: &[Value]| -> std::result::Result<ResultSet, StoreError> {
            *counter.lock() += 1;
            Ok(ResultSet::empty())
        };
        let executor = PageLimitingExecutor::new(Arc::new(SimplePagedExecutor::new(Arc::new(store))));
        let method = QueryMethod::new("findAll", EntityMetadata::new("Person"), ReturnShape::Page);
        let args = Arguments::none().with_page(PageRequest::of(5, 10));

        let result = executor.execute(&method, &q("SELECT * FROM /X LIMIT 40"), &args);
        assert!(matches!(result, Err(Error::LimitBelowPageOffset { .. })));
        assert_eq!(*calls.lock(), 0);
    }
}
