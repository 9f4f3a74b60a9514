//! Per-method coordinator tying query construction to execution.

use std::sync::Arc;

use tracing::debug;

use oqlgrid_proto::{ResultSet, Value};

use crate::config::ExecutorConfig;
use crate::error::{Error, Result};
use crate::executor::{ExecutorChain, SharedExecutor};
use crate::store::StoreExecutor;

use super::creator::QueryCreator;
use super::method::{Arguments, QueryMethod};
use super::part::PartTree;
use super::postprocess::{apply_all, standard_post_processors, QueryPostProcessor};
use super::shaper::{shape, Shaped};
use super::text::QueryText;

/// A repository query method ready to be invoked.
///
/// Holds the method metadata, the parsed predicate tree of a derived method,
/// the executor chain and the post-processors. Built once and shared
/// read-only across invocations.
pub struct RepositoryQuery {
    method: QueryMethod,
    tree: Option<PartTree>,
    store: Arc<dyn StoreExecutor>,
    chain: SharedExecutor,
    post_processors: Vec<Box<dyn QueryPostProcessor>>,
}

impl RepositoryQuery {
    /// Create a query for `method` executing through the standard chain.
    pub fn new(method: QueryMethod, store: Arc<dyn StoreExecutor>, config: &ExecutorConfig) -> Self {
        let chain = ExecutorChain::standard(store.clone(), config);
        Self {
            method,
            tree: None,
            store,
            chain,
            post_processors: standard_post_processors(),
        }
    }

    /// Use the parser's predicate tree for a derived method.
    pub fn with_part_tree(mut self, tree: PartTree) -> Self {
        self.tree = Some(tree);
        self
    }

    /// Replace the executor chain.
    pub fn with_chain(mut self, chain: SharedExecutor) -> Self {
        self.chain = chain;
        self
    }

    /// Replace the post-processors; they run in the given order.
    pub fn with_post_processors(mut self, processors: Vec<Box<dyn QueryPostProcessor>>) -> Self {
        self.post_processors = processors;
        self
    }

    pub fn method(&self) -> &QueryMethod {
        &self.method
    }

    /// Build the query text dispatched for `args`.
    pub fn query_text(&self, args: &Arguments) -> Result<QueryText> {
        let query = self.base_query()?;
        let query = Self::bind_in_parameters(query, args)?;

        let sort = args
            .sort()
            .or_else(|| self.tree.as_ref().and_then(|tree| tree.sort.as_ref()));
        let query = query.with_order_by(sort);

        Ok(apply_all(&self.post_processors, &self.method, query))
    }

    /// Run the method for `args` and shape the result.
    pub fn execute(&self, args: &Arguments) -> Result<Shaped> {
        let query = self.query_text(args)?;
        debug!(method = %self.method.name, query = %query, "executing repository query");

        let result = self.chain.execute(&self.method, &query, args)?;
        let shaped = shape(result, self.method.return_shape, args.page())?;

        match shaped {
            Shaped::Page(page) => match self.count(args)? {
                Some(total) => Ok(Shaped::Page(page.with_total(total))),
                None => Ok(Shaped::Page(page)),
            },
            other => Ok(other),
        }
    }

    fn base_query(&self) -> Result<QueryText> {
        match self.method.query.as_deref() {
            Some(text) if self.method.is_annotated_query() => self.annotated(text),
            _ => {
                let empty = PartTree::new();
                let tree = self.tree.as_ref().unwrap_or(&empty);
                QueryCreator::new(&self.method.entity).create(tree)
            }
        }
    }

    fn annotated(&self, text: &str) -> Result<QueryText> {
        let query = QueryText::new(text)?;
        Ok(match self.method.entity.region_path.as_deref() {
            Some(path) => query.rewrite_target(path),
            None => query,
        })
    }

    /// Bind every IN placeholder to its argument, lowest index first.
    fn bind_in_parameters(query: QueryText, args: &Arguments) -> Result<QueryText> {
        let mut indexes = query.in_parameter_indexes();
        indexes.sort_unstable();
        indexes.dedup();

        indexes.into_iter().try_fold(query, |query, index| {
            let values = args
                .parameter(index)
                .cloned()
                .ok_or(Error::MissingArgument(index))?
                .into_sequence();
            Ok(query.bind_in_at(index, &values))
        })
    }

    /// Total rows reported by the method's count query, if it declares one.
    fn count(&self, args: &Arguments) -> Result<Option<usize>> {
        let text = match self.method.count_query.as_deref() {
            Some(text) if !text.trim().is_empty() => text,
            _ => return Ok(None),
        };
        let query = Self::bind_in_parameters(self.annotated(text)?, args)?;
        debug!(method = %self.method.name, query = %query, "counting page total");

        let value = match self.store.execute(query.as_str(), args.values())? {
            ResultSet::Scalar(value) => value,
            rows => rows.into_rows().into_iter().next().unwrap_or(Value::Null),
        };
        value
            .as_i64()
            .and_then(|total| usize::try_from(total).ok())
            .map(Some)
            .ok_or_else(|| {
                Error::UnsupportedReturnShape(format!("count query returned {}", value))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    use oqlgrid_proto::{Order, PageRequest, Sort};

    use crate::query::{EntityMetadata, Part, PartKind, ReturnShape};
    use crate::store::StoreError;

    fn no_store(_: &str, _: &[Value]) -> std::result::Result<ResultSet, StoreError> {
        Ok(ResultSet::empty())
    }

    fn repository(method: QueryMethod) -> RepositoryQuery {
        RepositoryQuery::new(method, Arc::new(no_store), &ExecutorConfig::default())
    }

    #[test]
    fn test_binds_in_parameters_in_ascending_order() {
        let method = QueryMethod::new("findByIds", EntityMetadata::new("Person"), ReturnShape::Collection)
            .with_query("SELECT * FROM /People WHERE age IN SET $2 AND id IN SET $1");
        let args = Arguments::new(vec![
            Value::from(vec![1, 2]),
            Value::from(30),
        ]);

        let query = repository(method).query_text(&args).unwrap();
        assert_eq!(
            query.as_str(),
            "SELECT * FROM /People WHERE age IN SET ('30') AND id IN SET ('1', '2')"
        );
    }

    #[test]
    fn test_binds_every_occurrence_of_a_repeated_placeholder() {
        let method = QueryMethod::new("findByIdOrParent", EntityMetadata::new("Person"), ReturnShape::Collection)
            .with_query("SELECT * FROM /People WHERE id IN SET $1 OR parent IN SET $1");
        let args = Arguments::new(vec![Value::from(vec![7, 8])]);

        let query = repository(method).query_text(&args).unwrap();
        assert_eq!(
            query.as_str(),
            "SELECT * FROM /People WHERE id IN SET ('7', '8') OR parent IN SET ('7', '8')"
        );
        assert!(query.in_parameter_indexes().is_empty());
    }

    #[test]
    fn test_missing_in_argument() {
        let method = QueryMethod::new("findByIds", EntityMetadata::new("Person"), ReturnShape::Collection)
            .with_query("SELECT * FROM /People WHERE id IN SET $1");
        let result = repository(method).query_text(&Arguments::none());
        assert!(matches!(result, Err(Error::MissingArgument(1))));
    }

    #[test]
    fn test_annotated_query_follows_region_path() {
        let method = QueryMethod::new(
            "findAll",
            EntityMetadata::new("Person").with_region_path("/app/People"),
            ReturnShape::Collection,
        )
        .with_query("SELECT * FROM /Person");

        let query = repository(method).query_text(&Arguments::none()).unwrap();
        assert_eq!(query.as_str(), "SELECT * FROM /app/People");
    }

    #[test]
    fn test_derived_query_with_static_sort() {
        let method = QueryMethod::new("findByLastname", EntityMetadata::new("Person"), ReturnShape::Collection)
            .with_limit(5);
        let tree = PartTree::and(vec![Part::equal("lastname")]).with_sort(Sort::by(vec![Order::asc("firstname")]));

        let query = repository(method)
            .with_part_tree(tree)
            .query_text(&Arguments::new(vec![Value::from("Doe")]))
            .unwrap();
        assert_eq!(
            query.as_str(),
            "SELECT DISTINCT * FROM /Person WHERE lastname = $1 ORDER BY firstname ASC LIMIT 5"
        );
    }

    #[test]
    fn test_dynamic_sort_wins_over_static_sort() {
        let method = QueryMethod::new("findByAgeIn", EntityMetadata::new("Person"), ReturnShape::Page);
        let tree = PartTree::and(vec![Part::new("age", PartKind::In)])
            .with_sort(Sort::by(vec![Order::asc("firstname")]));
        let page = PageRequest::of(0, 10).with_sort(Sort::by(vec![Order::desc("age")]));
        let args = Arguments::new(vec![Value::from(vec![30, 40])]).with_page(page);

        let query = repository(method).with_part_tree(tree).query_text(&args).unwrap();
        assert_eq!(
            query.as_str(),
            "SELECT DISTINCT * FROM /Person WHERE age IN SET ('30', '40') ORDER BY age DESC"
        );
    }

    #[test]
    fn test_without_post_processors() {
        let method = QueryMethod::new("findAll", EntityMetadata::new("Person"), ReturnShape::Collection)
            .with_trace();
        let query = repository(method)
            .with_post_processors(vec![])
            .query_text(&Arguments::none())
            .unwrap();
        assert_eq!(query.as_str(), "SELECT * FROM /Person");
    }

    struct Echo;

    impl crate::executor::OqlQueryExecutor for Echo {
        fn execute(&self, _: &QueryMethod, query: &QueryText, _: &Arguments) -> Result<ResultSet> {
            Ok(ResultSet::Scalar(Value::from(query.as_str())))
        }
    }

    #[test]
    fn test_custom_chain_and_scalar_shape() {
        let method = QueryMethod::new("countAll", EntityMetadata::new("Person"), ReturnShape::Scalar);
        let query = repository(method)
            .with_part_tree(PartTree::new().count())
            .with_chain(Arc::new(Echo));

        assert_eq!(query.method().name, "countAll");
        let shaped = query.execute(&Arguments::none()).unwrap();
        assert_eq!(shaped, Shaped::Single(Value::from("SELECT count(*) FROM /Person")));
    }
}
