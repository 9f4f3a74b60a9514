//! Text decorations driven by method directives.
//!
//! Each processor inspects the method metadata and decorates the query when
//! the method declares its directive and the text does not carry the marker
//! yet. [`standard_post_processors`] returns them in the order they must run.

use tracing::trace;

use super::method::QueryMethod;
use super::text::QueryText;

/// Decorates query text before it is dispatched.
pub trait QueryPostProcessor: Send + Sync {
    /// Name used in diagnostics.
    fn name(&self) -> &'static str;

    /// Return `query`, decorated for `method` when applicable.
    fn post_process(&self, method: &QueryMethod, query: QueryText) -> QueryText;
}

/// Appends the method's LIMIT directive.
pub struct LimitPostProcessor;

impl QueryPostProcessor for LimitPostProcessor {
    fn name(&self) -> &'static str {
        "limit"
    }

    fn post_process(&self, method: &QueryMethod, query: QueryText) -> QueryText {
        match method.limit {
            Some(limit) if !query.is_limited() => query.with_limit(limit),
            _ => query,
        }
    }
}

/// Prepends the method's IMPORT directive.
pub struct ImportPostProcessor;

impl QueryPostProcessor for ImportPostProcessor {
    fn name(&self) -> &'static str {
        "import"
    }

    fn post_process(&self, method: &QueryMethod, query: QueryText) -> QueryText {
        match method.import.as_deref() {
            Some(import) if method.has_import() => query.with_import(import),
            _ => query,
        }
    }
}

/// Prepends the method's index hints.
pub struct HintPostProcessor;

impl QueryPostProcessor for HintPostProcessor {
    fn name(&self) -> &'static str {
        "hint"
    }

    fn post_process(&self, method: &QueryMethod, query: QueryText) -> QueryText {
        if method.has_hints() {
            query.with_hints(method.hints.as_slice())
        } else {
            query
        }
    }
}

/// Prepends `<TRACE>` for traced methods.
pub struct TracePostProcessor;

impl QueryPostProcessor for TracePostProcessor {
    fn name(&self) -> &'static str {
        "trace"
    }

    fn post_process(&self, method: &QueryMethod, query: QueryText) -> QueryText {
        if method.is_traced() {
            query.with_trace()
        } else {
            query
        }
    }
}

/// LIMIT, IMPORT, HINT, TRACE.
pub fn standard_post_processors() -> Vec<Box<dyn QueryPostProcessor>> {
    vec![
        Box::new(LimitPostProcessor),
        Box::new(ImportPostProcessor),
        Box::new(HintPostProcessor),
        Box::new(TracePostProcessor),
    ]
}

/// Run `processors` over `query` in order.
pub(crate) fn apply_all(
    processors: &[Box<dyn QueryPostProcessor>],
    method: &QueryMethod,
    query: QueryText,
) -> QueryText {
    processors.iter().fold(query, |query, processor| {
        let processed = processor.post_process(method, query);
        trace!(processor = processor.name(), query = %processed, "post-processed query");
        processed
    })
}
