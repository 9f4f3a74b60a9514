//! Predicate model produced by the method-name parser.
//!
//! The parser itself lives outside this crate; it hands over a [`PartTree`]
//! that [`QueryCreator`](super::creator::QueryCreator) renders into OQL.

use oqlgrid_proto::Sort;

/// Comparator of a single predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartKind {
    /// `property = $n`.
    SimpleProperty,
    /// `property > $n`.
    GreaterThan,
    /// `property >= $n`.
    GreaterThanEqual,
    /// `property < $n`.
    LessThan,
    /// `property <= $n`.
    LessThanEqual,
    /// `property LIKE $n`.
    Like,
    /// `property IN SET $n`.
    In,
    /// `property = NULL`.
    IsNull,
    /// `property != NULL`.
    IsNotNull,
    /// `property = true`.
    True,
    /// `property = false`.
    False,
}

impl PartKind {
    /// Number of method arguments the predicate consumes.
    pub fn arity(&self) -> usize {
        match self {
            PartKind::IsNull | PartKind::IsNotNull | PartKind::True | PartKind::False => 0,
            _ => 1,
        }
    }
}

/// One predicate clause: property, comparator and negation flag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Part {
    pub property: String,
    pub kind: PartKind,
    pub negated: bool,
}

impl Part {
    pub fn new(property: impl Into<String>, kind: PartKind) -> Self {
        Self {
            property: property.into(),
            kind,
            negated: false,
        }
    }

    /// Shorthand for an equality predicate.
    pub fn equal(property: impl Into<String>) -> Self {
        Self::new(property, PartKind::SimpleProperty)
    }

    /// Negate the predicate.
    pub fn negate(mut self) -> Self {
        self.negated = !self.negated;
        self
    }
}

/// Parsed method name: OR-ed groups of AND-ed predicates plus modifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartTree {
    /// Each inner list is AND-ed; the lists are OR-ed together.
    pub or_parts: Vec<Vec<Part>>,
    /// Ordering declared in the method name (`...OrderByNameAsc`).
    pub sort: Option<Sort>,
    /// `findDistinct...`.
    pub distinct: bool,
    /// `countBy...`.
    pub count: bool,
    /// `findTop5...` / `findFirst...`.
    pub max_results: Option<usize>,
}

impl PartTree {
    /// Tree without predicates (`findAll`).
    pub fn new() -> Self {
        Self::default()
    }

    /// Tree with a single AND group.
    pub fn and(parts: Vec<Part>) -> Self {
        Self {
            or_parts: vec![parts],
            ..Self::default()
        }
    }

    /// Add another OR-ed group.
    pub fn or(mut self, parts: Vec<Part>) -> Self {
        self.or_parts.push(parts);
        self
    }

    pub fn with_sort(mut self, sort: Sort) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    pub fn count(mut self) -> Self {
        self.count = true;
        self
    }

    pub fn with_max_results(mut self, max: usize) -> Self {
        self.max_results = Some(max);
        self
    }

    /// Iterate over every predicate in rendering order.
    pub fn parts(&self) -> impl Iterator<Item = &Part> {
        self.or_parts.iter().flatten()
    }

    /// Total number of arguments consumed by the predicates.
    pub fn parameter_count(&self) -> usize {
        self.parts().map(|p| p.kind.arity()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_count() {
        let tree = PartTree::and(vec![
            Part::equal("name"),
            Part::new("nickname", PartKind::IsNull),
        ])
        .or(vec![Part::new("age", PartKind::GreaterThan)]);

        assert_eq!(tree.parts().count(), 3);
        assert_eq!(tree.parameter_count(), 2);
    }

    #[test]
    fn test_double_negation() {
        let part = Part::equal("name").negate().negate();
        assert!(!part.negated);
    }
}
