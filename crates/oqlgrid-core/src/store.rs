//! Boundary to the grid store that actually runs OQL.

use oqlgrid_proto::{ResultSet, Value};

/// Opaque error raised by a store; never inspected or retried here.
pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

/// Executes OQL text with positional arguments against a data grid.
///
/// Implementations own connection handling, timeouts and retries.
pub trait StoreExecutor: Send + Sync {
    /// Run `query`, binding `args` to `$1..$n`.
    fn execute(&self, query: &str, args: &[Value]) -> Result<ResultSet, StoreError>;
}

impl<F> StoreExecutor for F
where
    F: Fn(&str, &[Value]) -> Result<ResultSet, StoreError> + Send + Sync,
{
    fn execute(&self, query: &str, args: &[Value]) -> Result<ResultSet, StoreError> {
        self(query, args)
    }
}
