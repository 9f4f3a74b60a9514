//! Base paging executor: fetch, then slice the page out client side.

use std::sync::Arc;

use tracing::debug;

use oqlgrid_proto::ResultSet;

use crate::error::Result;
use crate::query::paging::{end_offset, page_request, start_offset};
use crate::query::{Arguments, QueryMethod, QueryText};
use crate::store::StoreExecutor;

use super::OqlQueryExecutor;

/// Executes paged invocations and keeps only the requested page's rows.
///
/// Declines invocations that do not request a page.
pub struct SimplePagedExecutor {
    store: Arc<dyn StoreExecutor>,
}

impl SimplePagedExecutor {
    pub fn new(store: Arc<dyn StoreExecutor>) -> Self {
        Self { store }
    }
}

impl OqlQueryExecutor for SimplePagedExecutor {
    fn execute(
        &self,
        method: &QueryMethod,
        query: &QueryText,
        args: &Arguments,
    ) -> Result<ResultSet> {
        let page = page_request(method, args)?;
        let (start, end) = (start_offset(page), end_offset(page));

        debug!(method = %method.name, query = %query, start, end, "executing paged query");
        let result = self.store.execute(query.as_str(), args.values())?;
        Ok(result.slice(start, end))
    }
}
