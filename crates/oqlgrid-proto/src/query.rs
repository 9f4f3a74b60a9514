//! Ordering and paging requests attached to repository invocations.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Ascending order.
    Asc,
    /// Descending order.
    Desc,
}

impl Direction {
    /// The OQL keyword for this direction.
    pub fn keyword(&self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Ordering on a single property.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Order {
    /// Property to order by.
    pub property: String,
    /// Sort direction.
    pub direction: Direction,
}

impl Order {
    /// Create an ascending order.
    pub fn asc(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            direction: Direction::Asc,
        }
    }

    /// Create a descending order.
    pub fn desc(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            direction: Direction::Desc,
        }
    }
}

/// An ordered list of property orderings.
///
/// The order in which properties are added is the order in which they are
/// rendered; ties are never broken further.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sort {
    orders: Vec<Order>,
}

impl Sort {
    /// Create an empty sort.
    pub fn unsorted() -> Self {
        Self::default()
    }

    /// Create a sort from a list of orders.
    pub fn by(orders: Vec<Order>) -> Self {
        Self { orders }
    }

    /// Append an order.
    pub fn and(mut self, order: Order) -> Self {
        self.orders.push(order);
        self
    }

    /// Check if no ordering is requested.
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Get the orders in caller order.
    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    /// Iterate over the ordered property names.
    pub fn properties(&self) -> impl Iterator<Item = &str> {
        self.orders.iter().map(|o| o.property.as_str())
    }
}

/// A request for one page of results.
///
/// `page_number` is zero based. A page size of zero is representable but
/// rejected by the paging executors before any query is issued.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageRequest {
    /// Zero-based page index.
    pub page_number: usize,
    /// Number of rows per page.
    pub page_size: usize,
    /// Optional ordering for the page.
    pub sort: Option<Sort>,
}

impl PageRequest {
    /// Create an unsorted page request.
    pub fn of(page_number: usize, page_size: usize) -> Self {
        Self {
            page_number,
            page_size,
            sort: None,
        }
    }

    /// Create a request for the first page.
    pub fn first(page_size: usize) -> Self {
        Self::of(0, page_size)
    }

    /// Set the ordering.
    pub fn with_sort(mut self, sort: Sort) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Request for the following page, keeping size and sort.
    pub fn next(&self) -> Self {
        Self {
            page_number: self.page_number + 1,
            page_size: self.page_size,
            sort: self.sort.clone(),
        }
    }

    /// Get the sort, if it orders anything.
    pub fn sort(&self) -> Option<&Sort> {
        self.sort.as_ref().filter(|s| !s.is_empty())
    }
}
