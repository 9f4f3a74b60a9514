//! OQLGRID shared types.
//!
//! This crate defines the values that cross the boundary between repository
//! queries and the grid store that executes them.
//!
//! # Modules
//!
//! - [`value`] - Runtime values for bound arguments and result rows
//! - [`query`] - Sort and page requests
//! - [`result`] - Raw result sets and pages

pub mod query;
pub mod result;
pub mod value;

// Re-export commonly used types at crate root
pub use query::{Direction, Order, PageRequest, Sort};
pub use result::{Page, ResultSet};
pub use value::Value;
