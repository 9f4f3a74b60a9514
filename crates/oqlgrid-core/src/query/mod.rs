//! Query construction for repository methods.
//!
//! This module turns method metadata and invocation arguments into OQL text,
//! dispatches it through an executor chain and shapes the result.

mod creator;
mod driver;
mod method;
pub mod paging;
mod part;
mod postprocess;
mod shaper;
pub(crate) mod text;

pub use creator::QueryCreator;
pub use driver::RepositoryQuery;
pub use method::{Arguments, EntityMetadata, QueryMethod, ReturnShape, DEFAULT_KEY_PROPERTY};
pub use part::{Part, PartKind, PartTree};
pub use postprocess::{
    standard_post_processors, HintPostProcessor, ImportPostProcessor, LimitPostProcessor,
    QueryPostProcessor, TracePostProcessor,
};
pub use shaper::{shape, Shaped};
pub use text::QueryText;
