//! Immutable OQL statement text with structural rewrites.
//!
//! Rewrites are pattern-match-and-splice operations over the whole
//! statement; there is no parser behind them. Every operation returns a new
//! [`QueryText`] and absent or empty inputs degrade to no-ops.

use std::fmt;
use std::sync::OnceLock;

use regex::{Captures, NoExpand, Regex};

use oqlgrid_proto::{Sort, Value};

use crate::error::{Error, Result};

const SELECT_TEMPLATE: &str = "SELECT * FROM ";
const COUNT_TEMPLATE: &str = "SELECT count(*) FROM ";

static SELECT_PATTERN: OnceLock<Regex> = OnceLock::new();
static DISTINCT_PATTERN: OnceLock<Regex> = OnceLock::new();
static FROM_PATTERN: OnceLock<Regex> = OnceLock::new();
static WHERE_PATTERN: OnceLock<Regex> = OnceLock::new();
static ORDER_BY_PATTERN: OnceLock<Regex> = OnceLock::new();
static LIMIT_PATTERN: OnceLock<Regex> = OnceLock::new();
static HINT_PATTERN: OnceLock<Regex> = OnceLock::new();
static IMPORT_PATTERN: OnceLock<Regex> = OnceLock::new();
static TRACE_PATTERN: OnceLock<Regex> = OnceLock::new();
static IN_PATTERN: OnceLock<Regex> = OnceLock::new();
static REGION_PATTERN: OnceLock<Regex> = OnceLock::new();

fn pattern(cell: &'static OnceLock<Regex>, source: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(source).expect("static query pattern"))
}

fn select_pattern() -> &'static Regex {
    pattern(&SELECT_PATTERN, r"(?i)\bSELECT\b")
}

fn distinct_pattern() -> &'static Regex {
    pattern(&DISTINCT_PATTERN, r"(?i)\bSELECT\s+DISTINCT\b")
}

fn from_pattern() -> &'static Regex {
    pattern(&FROM_PATTERN, r"(?i)\bFROM\b")
}

fn where_pattern() -> &'static Regex {
    pattern(&WHERE_PATTERN, r"(?i)\bWHERE\b")
}

fn order_by_pattern() -> &'static Regex {
    pattern(&ORDER_BY_PATTERN, r"(?i)\bORDER\s+BY\b")
}

fn limit_pattern() -> &'static Regex {
    pattern(&LIMIT_PATTERN, r"(?i)\s*\bLIMIT\s+(\d+)")
}

fn hint_pattern() -> &'static Regex {
    pattern(&HINT_PATTERN, r"(?i)<HINT\s+[^>]*>")
}

fn import_pattern() -> &'static Regex {
    pattern(&IMPORT_PATTERN, r"(?i)\bIMPORT\s+[^;]+;")
}

fn trace_pattern() -> &'static Regex {
    pattern(&TRACE_PATTERN, r"(?i)<TRACE>")
}

fn in_pattern() -> &'static Regex {
    pattern(&IN_PATTERN, r"(?i)\bIN\s+(?:SET|LIST)\s+(\$(\d+))")
}

fn region_pattern() -> &'static Regex {
    pattern(&REGION_PATTERN, r"/\w+(?:/\w+)*")
}

/// An OQL statement.
///
/// The text is never blank. Values are cheap to clone and safe to share
/// across threads.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryText {
    text: String,
}

impl QueryText {
    /// Wrap raw query text, rejecting blank input.
    pub fn new(text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(Error::EmptyQuery);
        }
        Ok(Self {
            text: text.trim().to_string(),
        })
    }

    /// `SELECT * FROM /<target>`.
    pub fn for_target(target: &str) -> Result<Self> {
        Self::from_template(SELECT_TEMPLATE, target)
    }

    /// `SELECT count(*) FROM /<target>`.
    pub fn count_for_target(target: &str) -> Result<Self> {
        Self::from_template(COUNT_TEMPLATE, target)
    }

    fn from_template(template: &str, target: &str) -> Result<Self> {
        let target = target.trim().trim_start_matches('/');
        if target.is_empty() {
            return Err(Error::EmptyQuery);
        }
        Ok(Self {
            text: format!("{}/{}", template, target),
        })
    }

    // Rewrites start from text that is already known to be non-blank.
    fn derive(text: String) -> Self {
        Self { text }
    }

    /// Get the statement text.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Consume into the statement text.
    pub fn into_string(self) -> String {
        self.text
    }

    /// Whether the projection is already `SELECT DISTINCT`.
    pub fn is_distinct(&self) -> bool {
        distinct_pattern().is_match(&self.text)
    }

    /// Insert `DISTINCT` after the first `SELECT`, unless already present.
    pub fn with_distinct(&self) -> Self {
        if self.is_distinct() {
            return self.clone();
        }
        Self::derive(
            select_pattern()
                .replacen(&self.text, 1, "SELECT DISTINCT")
                .into_owned(),
        )
    }

    /// Append `ORDER BY` for a non-empty sort.
    ///
    /// Ordering forces `SELECT DISTINCT`. Properties are rendered in caller
    /// order. An existing ORDER BY is extended, and an existing LIMIT stays the
    /// trailing clause.
    pub fn with_order_by(&self, sort: Option<&Sort>) -> Self {
        let sort = match sort {
            Some(sort) if !sort.is_empty() => sort,
            _ => return self.clone(),
        };

        let orders = sort
            .orders()
            .iter()
            .map(|o| format!("{} {}", o.property, o.direction))
            .collect::<Vec<_>>()
            .join(", ");

        let distinct = self.with_distinct();
        let limit = distinct.limit();
        let body = distinct.strip_limit();

        let mut text = if order_by_pattern().is_match(body.as_str()) {
            format!("{}, {}", body.as_str(), orders)
        } else {
            format!("{} ORDER BY {}", body.as_str(), orders)
        };
        if let Some(limit) = limit {
            text.push_str(&format!(" LIMIT {}", limit));
        }
        Self::derive(text)
    }

    /// Properties named in the ORDER BY clause, in clause order.
    pub fn order_by_properties(&self) -> Vec<String> {
        let order = match order_by_pattern().find(&self.text) {
            Some(order) => order,
            None => return vec![],
        };
        let clause = &self.text[order.end()..];
        let clause = match limit_pattern().find(clause) {
            Some(limit) => &clause[..limit.start()],
            None => clause,
        };
        clause
            .split(',')
            .filter_map(|item| item.split_whitespace().next())
            .map(str::to_string)
            .collect()
    }

    /// Whether the statement carries a `LIMIT n` clause.
    pub fn is_limited(&self) -> bool {
        limit_pattern().is_match(&self.text)
    }

    /// The value of the `LIMIT` clause, if any.
    ///
    /// A value too large for `usize` saturates to `usize::MAX`.
    pub fn limit(&self) -> Option<usize> {
        limit_pattern()
            .captures(&self.text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().parse().unwrap_or(usize::MAX))
    }

    /// The value of the `LIMIT` clause, or `usize::MAX` when unbounded.
    pub fn limit_value(&self) -> usize {
        self.limit().unwrap_or(usize::MAX)
    }

    /// Append `LIMIT n`. The caller guarantees there is no existing LIMIT.
    pub fn with_limit(&self, limit: usize) -> Self {
        Self::derive(format!("{} LIMIT {}", self.text, limit))
    }

    /// Replace any existing LIMIT with `limit`; `None` leaves the text as is.
    pub fn adjust_limit(&self, limit: Option<usize>) -> Self {
        match limit {
            Some(limit) => self.strip_limit().with_limit(limit),
            None => self.clone(),
        }
    }

    /// Remove every LIMIT clause.
    pub fn strip_limit(&self) -> Self {
        if !self.is_limited() {
            return self.clone();
        }
        let stripped = limit_pattern().replace_all(&self.text, "");
        Self::derive(stripped.trim().to_string())
    }

    /// Bind `values` into the first unbound `IN SET $k` / `IN LIST $k`.
    pub fn bind_in(&self, values: &[Value]) -> Self {
        if values.is_empty() {
            return self.clone();
        }
        match in_pattern().captures(&self.text).and_then(|caps| caps.get(1)) {
            Some(placeholder) => self.splice(placeholder.range(), &in_list(values)),
            None => self.clone(),
        }
    }

    /// Bind `values` into every IN placeholder numbered `index`.
    pub fn bind_in_at(&self, index: usize, values: &[Value]) -> Self {
        if values.is_empty() || !self.in_parameter_indexes().contains(&index) {
            return self.clone();
        }
        let list = in_list(values);
        let bound = in_pattern().replace_all(&self.text, |caps: &Captures<'_>| {
            let clause = &caps[0];
            match (caps.get(0), caps.get(1)) {
                (Some(whole), Some(placeholder)) if caps[2].parse::<usize>().ok() == Some(index) => {
                    format!("{}{}", &clause[..placeholder.start() - whole.start()], list)
                }
                _ => clause.to_string(),
            }
        });
        Self::derive(bound.into_owned())
    }

    fn splice(&self, range: std::ops::Range<usize>, replacement: &str) -> Self {
        let mut text = String::with_capacity(self.text.len() + replacement.len());
        text.push_str(&self.text[..range.start]);
        text.push_str(replacement);
        text.push_str(&self.text[range.end..]);
        Self::derive(text)
    }

    /// Parameter indexes of unbound IN placeholders, in textual order.
    pub fn in_parameter_indexes(&self) -> Vec<usize> {
        in_pattern()
            .captures_iter(&self.text)
            .filter_map(|caps| caps.get(2)?.as_str().parse().ok())
            .collect()
    }

    /// Prepend `<HINT 'a', 'b'>` unless hints are empty or already present.
    pub fn with_hints<S: AsRef<str>>(&self, hints: &[S]) -> Self {
        let hints: Vec<&str> = hints
            .iter()
            .map(|h| h.as_ref().trim().trim_matches('\''))
            .filter(|h| !h.is_empty())
            .collect();
        if hints.is_empty() || hint_pattern().is_match(&self.text) {
            return self.clone();
        }
        let quoted = hints
            .iter()
            .map(|h| format!("'{}'", h))
            .collect::<Vec<_>>()
            .join(", ");
        Self::derive(format!("<HINT {}> {}", quoted, self.text))
    }

    /// Prepend `IMPORT <clause>;` unless empty or an import is already present.
    pub fn with_import(&self, import: &str) -> Self {
        let clause = import.trim().trim_end_matches(';').trim();
        let clause = match clause.get(..6) {
            Some(prefix)
                if prefix.eq_ignore_ascii_case("IMPORT")
                    && clause[6..].chars().next().map_or(true, char::is_whitespace) =>
            {
                clause[6..].trim()
            }
            _ => clause,
        };
        if clause.is_empty() || import_pattern().is_match(&self.text) {
            return self.clone();
        }
        Self::derive(format!("IMPORT {}; {}", clause, self.text))
    }

    /// Prepend `<TRACE>` unless already present.
    pub fn with_trace(&self) -> Self {
        if trace_pattern().is_match(&self.text) {
            return self.clone();
        }
        Self::derive(format!("<TRACE> {}", self.text))
    }

    /// Replace every region path token with `path`.
    pub fn rewrite_target(&self, path: &str) -> Self {
        let path = path.trim();
        if path.trim_start_matches('/').is_empty() {
            return self.clone();
        }
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{}", path)
        };
        Self::derive(
            region_pattern()
                .replace_all(&self.text, NoExpand(&path))
                .into_owned(),
        )
    }

    /// Replace the projection of the outer `SELECT` with `projection`.
    ///
    /// Returns `None` when no `SELECT ... FROM` pair can be located.
    pub fn with_projection(&self, projection: &str) -> Option<Self> {
        let select = select_pattern().find(&self.text)?;
        let from = from_pattern().find_at(&self.text, select.end())?;
        let text = format!(
            "{}SELECT {} {}",
            &self.text[..select.start()],
            projection.trim(),
            &self.text[from.start()..]
        );
        Some(Self::derive(text))
    }

    /// Restrict the statement with an additional predicate.
    ///
    /// The predicate is AND-ed in front of an existing WHERE condition (which
    /// is parenthesized) or becomes the WHERE clause, placed before any ORDER
    /// BY. LIMIT clauses are dropped.
    pub fn with_restriction(&self, predicate: &str) -> Self {
        let base = self.strip_limit();
        let text = base.as_str();
        let (head, tail) = match order_by_pattern().find(text) {
            Some(order) => (text[..order.start()].trim_end(), Some(&text[order.start()..])),
            None => (text, None),
        };

        let mut restricted = match where_pattern().find(head) {
            Some(clause) => format!(
                "{}WHERE {} AND ({})",
                &head[..clause.start()],
                predicate,
                head[clause.end()..].trim()
            ),
            None => format!("{} WHERE {}", head, predicate),
        };
        if let Some(tail) = tail {
            restricted.push(' ');
            restricted.push_str(tail);
        }
        Self::derive(restricted)
    }
}

/// Render `values` as a parenthesized IN literal list.
pub(crate) fn in_list(values: &[Value]) -> String {
    literal_list(values, Value::to_oql_literal)
}

/// Like [`in_list`], but numbers and booleans stay unquoted.
pub(crate) fn typed_in_list(values: &[Value]) -> String {
    literal_list(values, Value::to_typed_oql_literal)
}

fn literal_list(values: &[Value], render: fn(&Value) -> String) -> String {
    let literals = values.iter().map(render).collect::<Vec<_>>().join(", ");
    format!("({})", literals)
}

impl fmt::Display for QueryText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl AsRef<str> for QueryText {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

impl TryFrom<&str> for QueryText {
    type Error = Error;

    fn try_from(text: &str) -> Result<Self> {
        Self::new(text)
    }
}

impl TryFrom<String> for QueryText {
    type Error = Error;

    fn try_from(text: String) -> Result<Self> {
        Self::new(text)
    }
}
