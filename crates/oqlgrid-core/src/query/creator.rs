//! Renders parsed method names into OQL.

use crate::error::Result;

use super::method::EntityMetadata;
use super::part::{Part, PartKind, PartTree};
use super::text::QueryText;

/// Builds the base query of a derived repository method.
///
/// Predicates become positional `$n` parameters numbered in the order the
/// parser produced them. Ordering is left to the caller, which knows about
/// dynamic sorts.
pub struct QueryCreator<'a> {
    entity: &'a EntityMetadata,
}

impl<'a> QueryCreator<'a> {
    pub fn new(entity: &'a EntityMetadata) -> Self {
        Self { entity }
    }

    /// Render `tree` into query text.
    pub fn create(&self, tree: &PartTree) -> Result<QueryText> {
        let base = if tree.count {
            QueryText::count_for_target(self.entity.region())?
        } else if tree.distinct {
            QueryText::for_target(self.entity.region())?.with_distinct()
        } else {
            QueryText::for_target(self.entity.region())?
        };

        let mut next_parameter = 1;
        let groups: Vec<String> = tree
            .or_parts
            .iter()
            .filter(|group| !group.is_empty())
            .map(|group| {
                group
                    .iter()
                    .map(|part| Self::render(part, &mut next_parameter))
                    .collect::<Vec<_>>()
                    .join(" AND ")
            })
            .collect();

        let query = if groups.is_empty() {
            base
        } else {
            QueryText::new(format!("{} WHERE {}", base, groups.join(" OR ")))?
        };

        Ok(match tree.max_results {
            Some(max) if !tree.count => query.with_limit(max),
            _ => query,
        })
    }

    /// Render a single predicate, consuming parameters as needed.
    fn render(part: &Part, next_parameter: &mut usize) -> String {
        let property = part.property.as_str();
        let parameter = format!("${}", next_parameter);
        *next_parameter += part.kind.arity();

        match (part.kind, part.negated) {
            (PartKind::SimpleProperty, false) => format!("{} = {}", property, parameter),
            (PartKind::SimpleProperty, true) => format!("{} != {}", property, parameter),
            (PartKind::IsNull, false) | (PartKind::IsNotNull, true) => {
                format!("{} = NULL", property)
            }
            (PartKind::IsNotNull, false) | (PartKind::IsNull, true) => {
                format!("{} != NULL", property)
            }
            (PartKind::True, false) | (PartKind::False, true) => format!("{} = true", property),
            (PartKind::False, false) | (PartKind::True, true) => format!("{} = false", property),
            (kind, negated) => {
                let predicate = match kind {
                    PartKind::GreaterThan => format!("{} > {}", property, parameter),
                    PartKind::GreaterThanEqual => format!("{} >= {}", property, parameter),
                    PartKind::LessThan => format!("{} < {}", property, parameter),
                    PartKind::LessThanEqual => format!("{} <= {}", property, parameter),
                    PartKind::Like => format!("{} LIKE {}", property, parameter),
                    _ => format!("{} IN SET {}", property, parameter),
                };
                if negated {
                    format!("NOT ({})", predicate)
                } else {
                    predicate
                }
            }
        }
    }
}
