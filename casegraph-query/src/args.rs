//! Search-request arguments
//!
//! [`SearchArguments`] is the full request handed to the pipeline: either a
//! pre-built query string or a condition tree (mutually exclusive by
//! construction of [`QuerySource`]), plus named arguments, sorters, facets,
//! paging, the permission-filter mode, and optional grouping fields.
//! Created per request and read-only after being handed to the compiler.

use crate::condition::{Condition, Node, Rule, ValueType};
use crate::facet::Facet;
use crate::sorter::Sorter;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Default per-query execution timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default hard cap on rows the store is asked to return or skip at once
pub const DEFAULT_MAX_WINDOW: u64 = 10_000;

/// Either a literal query string or a condition tree
///
/// A literal query bypasses tree compilation entirely; it is augmented and
/// executed verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum QuerySource {
    Literal(String),
    Tree(Condition),
}

/// Inclusive datetime range; `None` means unbounded on that side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDateTime>, end: Option<NaiveDateTime>) -> Self {
        Self { start, end }
    }

    /// Intersection of two ranges: max of starts, min of ends, a missing
    /// bound treated as unbounded on that side
    pub fn intersect(&self, other: &DateRange) -> DateRange {
        let start = match (self.start, other.start) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
        let end = match (self.end, other.end) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        DateRange { start, end }
    }
}

/// A named argument value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ArgumentValue {
    Single(String),
    List(Vec<String>),
    DateRange(DateRange),
}

/// Permission-filter mode for a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PermissionMode {
    /// No permission filtering requested by the caller
    None,
    /// Restrict to records the principal may read
    #[default]
    Read,
    /// Restrict to records the principal may write
    Write,
}

/// Paging parameters
///
/// `page_number` is 1-based. A `page_size` of 0 means no limit, and a
/// `max_window` of 0 means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paging {
    pub page_number: u64,
    pub page_size: u64,
    pub max_window: u64,
}

impl Default for Paging {
    fn default() -> Self {
        Self {
            page_number: 1,
            page_size: 25,
            max_window: DEFAULT_MAX_WINDOW,
        }
    }
}

impl Paging {
    pub fn new(page_number: u64, page_size: u64) -> Self {
        Self {
            page_number: page_number.max(1),
            page_size,
            ..Self::default()
        }
    }

    pub fn with_max_window(mut self, max_window: u64) -> Self {
        self.max_window = max_window;
        self
    }
}

/// Full search request
#[derive(Debug, Clone)]
pub struct SearchArguments {
    /// Query source: literal text or a condition tree
    pub query: QuerySource,
    /// Named arguments bound alongside the query
    pub arguments: HashMap<String, ArgumentValue>,
    /// Free-text query field, handed untouched to the text-query parser
    pub text_query: Option<String>,
    /// Sort specifications; the first sorter is primary
    pub sorters: Vec<Sorter>,
    /// Facets with selected values
    pub facets: Vec<Facet>,
    /// Paging parameters
    pub paging: Paging,
    /// Permission-filter mode
    pub permission_mode: PermissionMode,
    /// Group-by property IRIs; non-empty switches to aggregation output
    pub group_by: Vec<String>,
    /// Return only the total count, no typed results
    pub count_only: bool,
    /// Hard per-query execution bound
    pub timeout: Duration,
}

impl SearchArguments {
    /// Request built from a condition tree
    pub fn tree(tree: Condition) -> Self {
        Self::from_source(QuerySource::Tree(tree))
    }

    /// Request built from a literal query string (bypasses compilation)
    pub fn literal(query: impl Into<String>) -> Self {
        Self::from_source(QuerySource::Literal(query.into()))
    }

    fn from_source(query: QuerySource) -> Self {
        Self {
            query,
            arguments: HashMap::new(),
            text_query: None,
            sorters: Vec::new(),
            facets: Vec::new(),
            paging: Paging::default(),
            permission_mode: PermissionMode::default(),
            group_by: Vec::new(),
            count_only: false,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_argument(mut self, name: impl Into<String>, value: ArgumentValue) -> Self {
        self.arguments.insert(name.into(), value);
        self
    }

    pub fn with_text_query(mut self, text: impl Into<String>) -> Self {
        self.text_query = Some(text.into());
        self
    }

    pub fn with_sorter(mut self, sorter: Sorter) -> Self {
        self.sorters.push(sorter);
        self
    }

    pub fn with_facet(mut self, facet: Facet) -> Self {
        self.facets.push(facet);
        self
    }

    pub fn with_paging(mut self, paging: Paging) -> Self {
        self.paging = paging;
        self
    }

    pub fn with_permission_mode(mut self, mode: PermissionMode) -> Self {
        self.permission_mode = mode;
        self
    }

    pub fn with_group_by(mut self, property: impl Into<String>) -> Self {
        self.group_by.push(property.into());
        self
    }

    pub fn counting(mut self) -> Self {
        self.count_only = true;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Expand every `DateRange` argument into a `between`-style rule node
///
/// Keys are treated as the predicate IRI to constrain. Single-sided ranges
/// become one-sided comparisons.
pub fn date_range_rules(arguments: &HashMap<String, ArgumentValue>) -> Vec<Node> {
    let mut rules = Vec::new();
    // Deterministic output order for the compiler.
    let mut keys: Vec<&String> = arguments.keys().collect();
    keys.sort();
    for key in keys {
        let ArgumentValue::DateRange(range) = &arguments[key] else {
            continue;
        };
        let rule = match (range.start, range.end) {
            (Some(start), Some(end)) => Rule::with_values(
                key.clone(),
                "between",
                vec![start.to_string(), end.to_string()],
                ValueType::DateTime,
            ),
            (Some(start), None) => {
                Rule::new(key.clone(), ">=", start.to_string(), ValueType::DateTime)
            }
            (None, Some(end)) => {
                Rule::new(key.clone(), "<=", end.to_string(), ValueType::DateTime)
            }
            (None, None) => continue,
        };
        rules.push(Node::Rule(rule));
    }
    rules
}

/// Flatten `Single` and `List` arguments into the string bindings map the
/// store accepts alongside the query; date ranges are compiled into the
/// query text instead and are skipped here
pub fn to_bindings(arguments: &HashMap<String, ArgumentValue>) -> HashMap<String, String> {
    arguments
        .iter()
        .filter_map(|(name, value)| match value {
            ArgumentValue::Single(v) => Some((name.clone(), v.clone())),
            ArgumentValue::List(vs) => Some((name.clone(), vs.join(","))),
            ArgumentValue::DateRange(_) => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn dt(date: &str) -> NaiveDateTime {
        NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_range_intersection_bounded() {
        let basic = DateRange::new(Some(dt("2020-01-01")), Some(dt("2020-12-31")));
        let facet = DateRange::new(Some(dt("2020-06-01")), None);
        let merged = basic.intersect(&facet);
        assert_eq!(merged.start, Some(dt("2020-06-01")));
        assert_eq!(merged.end, Some(dt("2020-12-31")));
    }

    #[test]
    fn test_range_intersection_unbounded_sides() {
        let a = DateRange::new(None, None);
        let b = DateRange::new(Some(dt("2021-03-01")), None);
        let merged = a.intersect(&b);
        assert_eq!(merged.start, Some(dt("2021-03-01")));
        assert_eq!(merged.end, None);
    }

    #[test]
    fn test_date_range_rules_shapes() {
        let mut args = HashMap::new();
        args.insert(
            "http://ex.org/created".to_string(),
            ArgumentValue::DateRange(DateRange::new(Some(dt("2020-01-01")), Some(dt("2020-02-01")))),
        );
        args.insert(
            "http://ex.org/closed".to_string(),
            ArgumentValue::DateRange(DateRange::new(None, Some(dt("2020-03-01")))),
        );
        args.insert(
            "http://ex.org/owner".to_string(),
            ArgumentValue::Single("bob".into()),
        );

        let rules = date_range_rules(&args);
        assert_eq!(rules.len(), 2);
        // Sorted by key: closed before created.
        let Node::Rule(first) = &rules[0] else {
            panic!("expected rule");
        };
        assert_eq!(first.operator, "<=");
        let Node::Rule(second) = &rules[1] else {
            panic!("expected rule");
        };
        assert_eq!(second.operator, "between");
        assert_eq!(second.values.len(), 2);
    }

    #[test]
    fn test_bindings_skip_date_ranges() {
        let mut args = HashMap::new();
        args.insert("a".to_string(), ArgumentValue::Single("1".into()));
        args.insert(
            "b".to_string(),
            ArgumentValue::List(vec!["x".into(), "y".into()]),
        );
        args.insert(
            "c".to_string(),
            ArgumentValue::DateRange(DateRange::new(None, None)),
        );
        let bindings = to_bindings(&args);
        assert_eq!(bindings.len(), 2);
        assert_eq!(bindings["b"], "x,y");
    }

    #[test]
    fn test_builder_defaults() {
        let args = SearchArguments::literal("SELECT * WHERE { }");
        assert_eq!(args.paging.page_number, 1);
        assert_eq!(args.permission_mode, PermissionMode::Read);
        assert!(!args.count_only);
    }
}
