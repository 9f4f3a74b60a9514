//! Repository method metadata and invocation arguments.

use oqlgrid_proto::{PageRequest, Sort, Value};

/// Default property holding an entity's key.
pub const DEFAULT_KEY_PROPERTY: &str = "id";

/// The shape a repository method declares for its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReturnShape {
    /// Every matching row, in order.
    Collection,
    /// One page of rows plus page metadata.
    Page,
    /// At most one entity.
    Single,
    /// A projection or aggregate value.
    Scalar,
    /// Nothing.
    Void,
}

/// Where an entity lives in the grid and how it is keyed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityMetadata {
    /// Logical entity name.
    pub name: String,
    /// Explicit region path; the entity name is used when absent.
    pub region_path: Option<String>,
    /// Property that uniquely identifies an entity.
    pub key_property: String,
}

impl EntityMetadata {
    /// Create metadata for an entity stored in the region named after it.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            region_path: None,
            key_property: DEFAULT_KEY_PROPERTY.to_string(),
        }
    }

    /// Store the entity in an explicit region.
    pub fn with_region_path(mut self, path: impl Into<String>) -> Self {
        self.region_path = Some(path.into());
        self
    }

    /// Set the key property.
    pub fn with_key_property(mut self, property: impl Into<String>) -> Self {
        self.key_property = property.into();
        self
    }

    /// Region the entity is queried from.
    pub fn region(&self) -> &str {
        self.region_path.as_deref().unwrap_or(&self.name)
    }
}

/// Read-only description of a repository query method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryMethod {
    /// Method name, for diagnostics.
    pub name: String,
    /// Entity the method queries.
    pub entity: EntityMetadata,
    /// Declared result shape.
    pub return_shape: ReturnShape,
    /// LIMIT directive.
    pub limit: Option<usize>,
    /// IMPORT directive.
    pub import: Option<String>,
    /// HINT directive (index names).
    pub hints: Vec<String>,
    /// TRACE directive.
    pub trace: bool,
    /// Literal query text, when the method is annotated with one.
    pub query: Option<String>,
    /// Literal count query used to report a page's total.
    pub count_query: Option<String>,
}

impl QueryMethod {
    /// Create metadata for a derived query method without directives.
    pub fn new(name: impl Into<String>, entity: EntityMetadata, return_shape: ReturnShape) -> Self {
        Self {
            name: name.into(),
            entity,
            return_shape,
            limit: None,
            import: None,
            hints: vec![],
            trace: false,
            query: None,
            count_query: None,
        }
    }

    /// Set the LIMIT directive.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Set the IMPORT directive.
    pub fn with_import(mut self, import: impl Into<String>) -> Self {
        self.import = Some(import.into());
        self
    }

    /// Set the HINT directive.
    pub fn with_hints<I, S>(mut self, hints: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hints = hints.into_iter().map(Into::into).collect();
        self
    }

    /// Enable the TRACE directive.
    pub fn with_trace(mut self) -> Self {
        self.trace = true;
        self
    }

    /// Annotate the method with literal query text.
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Set the count query used for page totals.
    pub fn with_count_query(mut self, query: impl Into<String>) -> Self {
        self.count_query = Some(query.into());
        self
    }

    pub fn has_limit(&self) -> bool {
        self.limit.is_some()
    }

    pub fn has_import(&self) -> bool {
        self.import.as_deref().is_some_and(|i| !i.trim().is_empty())
    }

    pub fn has_hints(&self) -> bool {
        self.hints.iter().any(|h| !h.trim().is_empty())
    }

    pub fn is_traced(&self) -> bool {
        self.trace
    }

    /// Whether the method carries literal query text rather than a derived one.
    pub fn is_annotated_query(&self) -> bool {
        self.query.as_deref().is_some_and(|q| !q.trim().is_empty())
    }

    pub fn is_page_query(&self) -> bool {
        self.return_shape == ReturnShape::Page
    }

    pub fn is_collection_query(&self) -> bool {
        self.return_shape == ReturnShape::Collection
    }
}

/// Arguments of one method invocation.
///
/// `values` are bound positionally to `$1..$n`. Paging and dynamic sorting
/// travel separately and are never bound into the query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    values: Vec<Value>,
    page: Option<PageRequest>,
    sort: Option<Sort>,
}

impl Arguments {
    /// Create arguments from positional values.
    pub fn new(values: Vec<Value>) -> Self {
        Self {
            values,
            page: None,
            sort: None,
        }
    }

    /// Invocation without arguments.
    pub fn none() -> Self {
        Self::default()
    }

    /// Attach a page request.
    pub fn with_page(mut self, page: PageRequest) -> Self {
        self.page = Some(page);
        self
    }

    /// Attach a dynamic sort.
    pub fn with_sort(mut self, sort: Sort) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Positional values.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Value bound to the 1-based parameter `index`.
    pub fn parameter(&self, index: usize) -> Option<&Value> {
        index.checked_sub(1).and_then(|i| self.values.get(i))
    }

    /// Page request, if any.
    pub fn page(&self) -> Option<&PageRequest> {
        self.page.as_ref()
    }

    /// Dynamic ordering: an explicit sort wins over the page request's sort.
    pub fn sort(&self) -> Option<&Sort> {
        self.sort
            .as_ref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.page.as_ref().and_then(PageRequest::sort))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oqlgrid_proto::Order;

    #[test]
    fn test_entity_region_defaults_to_name() {
        let entity = EntityMetadata::new("Person");
        assert_eq!(entity.region(), "Person");
        assert_eq!(entity.key_property, DEFAULT_KEY_PROPERTY);

        let entity = entity.with_region_path("/app/People").with_key_property("ssn");
        assert_eq!(entity.region(), "/app/People");
        assert_eq!(entity.key_property, "ssn");
    }

    #[test]
    fn test_method_directives() {
        let method = QueryMethod::new("findByName", EntityMetadata::new("Person"), ReturnShape::Collection)
            .with_limit(10)
            .with_import("org.example.Person")
            .with_hints(["NameIdx"])
            .with_trace();

        assert!(method.has_limit());
        assert!(method.has_import());
        assert!(method.has_hints());
        assert!(method.is_traced());
        assert!(!method.is_annotated_query());
        assert!(method.is_collection_query());
    }

    #[test]
    fn test_blank_directives_are_absent() {
        let method = QueryMethod::new("findAll", EntityMetadata::new("Person"), ReturnShape::Page)
            .with_import("  ")
            .with_hints([""])
            .with_query(" ");

        assert!(!method.has_import());
        assert!(!method.has_hints());
        assert!(!method.is_annotated_query());
        assert!(method.is_page_query());
    }

    #[test]
    fn test_argument_lookup_is_one_based() {
        let args = Arguments::new(vec![Value::from("a"), Value::Int(2)]);
        assert_eq!(args.parameter(0), None);
        assert_eq!(args.parameter(1), Some(&Value::from("a")));
        assert_eq!(args.parameter(2), Some(&Value::Int(2)));
        assert_eq!(args.parameter(3), None);
    }

    #[test]
    fn test_explicit_sort_wins_over_page_sort() {
        let page = PageRequest::of(0, 10).with_sort(Sort::by(vec![Order::asc("name")]));
        let args = Arguments::none().with_page(page.clone());
        assert_eq!(args.sort(), page.sort());

        let explicit = Sort::by(vec![Order::desc("age")]);
        let args = args.with_sort(explicit.clone());
        assert_eq!(args.sort(), Some(&explicit));
    }
}
