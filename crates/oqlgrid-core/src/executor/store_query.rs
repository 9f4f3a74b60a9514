//! Terminal executor: hand the query to the store as is.

use std::sync::Arc;

use tracing::debug;

use oqlgrid_proto::ResultSet;

use crate::error::Result;
use crate::query::{Arguments, QueryMethod, QueryText};
use crate::store::StoreExecutor;

use super::OqlQueryExecutor;

/// Runs any query unchanged; never declines.
pub struct StoreQueryExecutor {
    store: Arc<dyn StoreExecutor>,
}

impl StoreQueryExecutor {
    pub fn new(store: Arc<dyn StoreExecutor>) -> Self {
        Self { store }
    }
}

impl OqlQueryExecutor for StoreQueryExecutor {
    fn execute(
        &self,
        method: &QueryMethod,
        query: &QueryText,
        args: &Arguments,
    ) -> Result<ResultSet> {
        debug!(method = %method.name, query = %query, "executing query");
        Ok(self.store.execute(query.as_str(), args.values())?)
    }
}
