//! Result types returned by grid stores and repository queries.

use serde::{Deserialize, Serialize};

use crate::query::PageRequest;
use crate::value::Value;

/// Raw output of a query, as produced by the store.
///
/// Stores return either nothing, a single scalar (aggregates, single-row
/// projections) or an ordered sequence of rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ResultSet {
    /// No result at all.
    Null,
    /// A bare scalar.
    Scalar(Value),
    /// Ordered rows.
    Rows(Vec<Value>),
}

impl ResultSet {
    /// Create a row result.
    pub fn rows(rows: Vec<Value>) -> Self {
        ResultSet::Rows(rows)
    }

    /// Create an empty row result.
    pub fn empty() -> Self {
        ResultSet::Rows(vec![])
    }

    /// Get the number of rows after normalization.
    pub fn len(&self) -> usize {
        match self {
            ResultSet::Null => 0,
            ResultSet::Scalar(Value::List(items)) => items.len(),
            ResultSet::Scalar(_) => 1,
            ResultSet::Rows(rows) => rows.len(),
        }
    }

    /// Check if there are no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Normalize into an ordered sequence of rows.
    ///
    /// Null becomes empty, a collection scalar is spread, any other scalar is
    /// wrapped in a one-element sequence.
    pub fn into_rows(self) -> Vec<Value> {
        match self {
            ResultSet::Null => vec![],
            ResultSet::Scalar(value) => value.into_sequence(),
            ResultSet::Rows(rows) => rows,
        }
    }

    /// Keep only rows in `[start, end)`, clamped to the available rows.
    pub fn slice(self, start: usize, end: usize) -> ResultSet {
        let rows = self.into_rows();
        let end = end.min(rows.len());
        if start >= end {
            return ResultSet::empty();
        }
        ResultSet::Rows(rows.into_iter().skip(start).take(end - start).collect())
    }
}

impl From<Vec<Value>> for ResultSet {
    fn from(rows: Vec<Value>) -> Self {
        ResultSet::Rows(rows)
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Rows on this page.
    pub content: Vec<Value>,
    /// The request that produced this page.
    pub request: PageRequest,
    /// Total number of rows across all pages, when known.
    pub total: Option<usize>,
}

impl Page {
    /// Create a page with an unknown total.
    pub fn new(content: Vec<Value>, request: PageRequest) -> Self {
        Self {
            content,
            request,
            total: None,
        }
    }

    /// Set the total row count.
    pub fn with_total(mut self, total: usize) -> Self {
        self.total = Some(total);
        self
    }

    /// Get the number of rows on this page.
    pub fn len(&self) -> usize {
        self.content.len()
    }

    /// Check if this page has no rows.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Number of pages, when the total is known.
    pub fn total_pages(&self) -> Option<usize> {
        let size = self.request.page_size.max(1);
        self.total.map(|total| total.div_ceil(size))
    }

    /// Whether a following page may exist.
    ///
    /// Without a known total, a full page is assumed to have a successor.
    pub fn has_next(&self) -> bool {
        match self.total {
            Some(total) => {
                let end = self
                    .request
                    .page_number
                    .saturating_add(1)
                    .saturating_mul(self.request.page_size);
                end < total
            }
            None => self.content.len() == self.request.page_size,
        }
    }
}
