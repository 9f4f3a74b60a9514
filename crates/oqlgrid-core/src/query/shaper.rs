//! Coerces raw result sets into the shape a method declares.

use oqlgrid_proto::{Page, PageRequest, ResultSet, Value};

use crate::error::{Error, Result};

use super::method::ReturnShape;

/// A result in the shape the caller asked for.
#[derive(Debug, Clone, PartialEq)]
pub enum Shaped {
    /// No value (single-entity query without a match).
    Absent,
    /// A single entity or scalar.
    Single(Value),
    /// Ordered rows.
    Collection(Vec<Value>),
    /// One page of rows.
    Page(Page),
}

impl Shaped {
    /// Get the single value, if this is one.
    pub fn as_single(&self) -> Option<&Value> {
        match self {
            Shaped::Single(value) => Some(value),
            _ => None,
        }
    }

    /// Get the page, if this is one.
    pub fn as_page(&self) -> Option<&Page> {
        match self {
            Shaped::Page(page) => Some(page),
            _ => None,
        }
    }

    /// Rows held by this result, in order.
    pub fn into_rows(self) -> Vec<Value> {
        match self {
            Shaped::Absent => vec![],
            Shaped::Single(value) => vec![value],
            Shaped::Collection(rows) => rows,
            Shaped::Page(page) => page.content,
        }
    }
}

/// Shape `result` for a method declaring `shape`.
///
/// `page` is the invocation's page request; it is required for
/// [`ReturnShape::Page`] and ignored otherwise.
pub fn shape(result: ResultSet, shape: ReturnShape, page: Option<&PageRequest>) -> Result<Shaped> {
    let rows = result.into_rows();

    match shape {
        ReturnShape::Collection => Ok(Shaped::Collection(rows)),
        ReturnShape::Page => {
            let request = page.cloned().unwrap_or_else(|| PageRequest::first(rows.len().max(1)));
            Ok(Shaped::Page(Page::new(rows, request)))
        }
        ReturnShape::Single => match rows.len() {
            0 => Ok(Shaped::Absent),
            1 => Ok(Shaped::Single(first(rows))),
            actual => Err(Error::AmbiguousResult {
                expected: 1,
                actual,
            }),
        },
        ReturnShape::Scalar if rows.len() == 1 => Ok(Shaped::Single(first(rows))),
        other => Err(Error::UnsupportedReturnShape(format!(
            "{:?} method cannot return {} row(s)",
            other,
            rows.len()
        ))),
    }
}

fn first(rows: Vec<Value>) -> Value {
    rows.into_iter().next().unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(values: &[i64]) -> ResultSet {
        ResultSet::rows(values.iter().map(|v| Value::Int(*v)).collect())
    }

    #[test]
    fn test_single_entity_rules() {
        assert_eq!(shape(rows(&[]), ReturnShape::Single, None).unwrap(), Shaped::Absent);
        assert_eq!(shape(ResultSet::Null, ReturnShape::Single, None).unwrap(), Shaped::Absent);
        assert_eq!(
            shape(rows(&[7]), ReturnShape::Single, None).unwrap(),
            Shaped::Single(Value::Int(7))
        );
        assert!(matches!(
            shape(rows(&[7, 8]), ReturnShape::Single, None),
            Err(Error::AmbiguousResult {
                expected: 1,
                actual: 2
            })
        ));
    }

    #[test]
    fn test_collection_passes_rows_through() {
        let shaped = shape(rows(&[1, 2, 3]), ReturnShape::Collection, None).unwrap();
        assert_eq!(shaped.into_rows(), vec![Value::Int(1), Value::Int(2), Value::Int(3)]);

        let shaped = shape(ResultSet::Scalar(Value::Int(4)), ReturnShape::Collection, None).unwrap();
        assert_eq!(shaped, Shaped::Collection(vec![Value::Int(4)]));
    }

    #[test]
    fn test_page_has_unknown_total() {
        let request = PageRequest::of(1, 2);
        let shaped = shape(rows(&[3, 4]), ReturnShape::Page, Some(&request)).unwrap();
        let page = shaped.as_page().unwrap();
        assert_eq!(page.request, request);
        assert_eq!(page.len(), 2);
        assert_eq!(page.total, None);
    }

    #[test]
    fn test_scalar_projection() {
        let shaped = shape(ResultSet::Scalar(Value::Int(42)), ReturnShape::Scalar, None).unwrap();
        assert_eq!(shaped.as_single(), Some(&Value::Int(42)));
    }

    #[test]
    fn test_unsupported_shapes() {
        assert!(matches!(
            shape(rows(&[1, 2]), ReturnShape::Scalar, None),
            Err(Error::UnsupportedReturnShape(_))
        ));
        assert!(matches!(
            shape(rows(&[]), ReturnShape::Scalar, None),
            Err(Error::UnsupportedReturnShape(_))
        ));
        assert!(matches!(
            shape(rows(&[1]), ReturnShape::Void, None),
            Err(Error::UnsupportedReturnShape(_))
        ));
    }
}
