//! Key-then-fetch execution for deep pages.
//!
//! Phase one projects the query down to entity keys, bounds it by the page's
//! result window and slices out the page's keys. Phase two re-issues the
//! original query restricted to those keys, so only the page's rows travel.

use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use oqlgrid_proto::{ResultSet, Value};

use crate::error::{Error, Result};
use crate::query::paging::page_request;
use crate::query::text::typed_in_list;
use crate::query::{Arguments, QueryMethod, QueryText};

use super::{OqlQueryExecutor, SharedExecutor};

static AGGREGATE_PATTERN: OnceLock<Regex> = OnceLock::new();

fn aggregate_pattern() -> &'static Regex {
    AGGREGATE_PATTERN.get_or_init(|| {
        Regex::new(r"(?i)\b(?:count|sum|avg|min|max)\s*\(|\bGROUP\s+BY\b")
            .expect("static aggregate pattern")
    })
}

/// Two-phase paged executor.
///
/// `keys` must be a paging executor that bounds and slices (normally
/// page-limiting over simple-paged); `fetch` runs the restricted query
/// unchanged. Declines aggregate queries and queries whose projection cannot
/// be located.
pub struct TwoPhaseExecutor {
    keys: SharedExecutor,
    fetch: SharedExecutor,
}

impl TwoPhaseExecutor {
    pub fn new(keys: SharedExecutor, fetch: SharedExecutor) -> Self {
        Self { keys, fetch }
    }

    /// The phase-one query projecting `key` and every ORDER BY property.
    ///
    /// Under DISTINCT the ordering may only name projected fields; the
    /// properties are read from the query's own ORDER BY clause.
    pub fn key_query(query: &QueryText, key: &str) -> Result<QueryText> {
        if aggregate_pattern().is_match(query.as_str()) {
            return Err(Error::unsupported("aggregate queries are not paged by key"));
        }

        let mut projection = vec![key.to_string()];
        for property in query.order_by_properties() {
            if !projection.contains(&property) {
                projection.push(property);
            }
        }
        let projection = format!("DISTINCT {}", projection.join(", "));

        query
            .with_projection(&projection)
            .ok_or_else(|| Error::unsupported("query projection could not be located"))
    }

    /// The phase-two query restricted to `keys`.
    ///
    /// Keys keep their type: numeric and boolean keys are not quoted.
    pub fn fetch_query(query: &QueryText, key: &str, keys: &[Value]) -> QueryText {
        query.with_restriction(&format!("{} IN SET {}", key, typed_in_list(keys)))
    }
}

impl OqlQueryExecutor for TwoPhaseExecutor {
    fn execute(
        &self,
        method: &QueryMethod,
        query: &QueryText,
        args: &Arguments,
    ) -> Result<ResultSet> {
        page_request(method, args)?;
        let key = method.entity.key_property.as_str();

        let key_query = Self::key_query(query, key)?;
        debug!(method = %method.name, query = %key_query, "resolving page keys");

        let keys: Vec<Value> = self
            .keys
            .execute(method, &key_query, args)?
            .into_rows()
            .into_iter()
            .map(|row| row.field(key).cloned().unwrap_or(row))
            .collect();

        if keys.is_empty() {
            debug!(method = %method.name, "no keys on requested page");
            return Ok(ResultSet::empty());
        }

        let fetch_query = Self::fetch_query(query, key, &keys);
        debug!(method = %method.name, query = %fetch_query, keys = keys.len(), "fetching page rows");
        let mut rows = self.fetch.execute(method, &fetch_query, args)?.into_rows();

        // Rows follow key order; rows whose key was not requested go last.
        rows.sort_by_key(|row| {
            let row_key = row.field(key).unwrap_or(row);
            keys.iter()
                .position(|candidate| candidate == row_key)
                .unwrap_or(usize::MAX)
        });
        Ok(ResultSet::Rows(rows))
    }
}
