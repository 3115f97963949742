//! Result tuples
//!
//! A [`ResultTuple`] is one row of a query result: an immutable set of
//! name-to-value bindings, consumed once by the mapper.

use chrono::{DateTime, NaiveDate, Utc};
use rustc_hash::FxHashMap;
use std::fmt;

/// A single bound value in a result tuple
#[derive(Debug, Clone, PartialEq)]
pub enum TupleValue {
    Iri(String),
    String(String),
    Long(i64),
    Double(f64),
    Boolean(bool),
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
}

impl TupleValue {
    /// Borrow the textual content of IRI and string values
    pub fn as_str(&self) -> Option<&str> {
        match self {
            TupleValue::Iri(s) | TupleValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_long(&self) -> Option<i64> {
        match self {
            TupleValue::Long(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for TupleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TupleValue::Iri(s) | TupleValue::String(s) => f.write_str(s),
            TupleValue::Long(v) => write!(f, "{v}"),
            TupleValue::Double(v) => write!(f, "{v}"),
            TupleValue::Boolean(v) => write!(f, "{v}"),
            TupleValue::Date(v) => write!(f, "{v}"),
            TupleValue::DateTime(v) => write!(f, "{}", v.to_rfc3339()),
        }
    }
}

/// One result row: binding-name to value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultTuple {
    bindings: FxHashMap<String, TupleValue>,
}

impl ResultTuple {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style binding insertion
    pub fn bind(mut self, name: impl Into<String>, value: TupleValue) -> Self {
        self.bindings.insert(name.into(), value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&TupleValue> {
        self.bindings.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &TupleValue)> {
        self.bindings.iter()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_and_get() {
        let tuple = ResultTuple::new()
            .bind("instance", TupleValue::Iri("http://ex.org/1".into()))
            .bind("count", TupleValue::Long(7));
        assert_eq!(
            tuple.get("instance").and_then(TupleValue::as_str),
            Some("http://ex.org/1")
        );
        assert_eq!(tuple.get("count").and_then(TupleValue::as_long), Some(7));
        assert!(tuple.get("missing").is_none());
        assert_eq!(tuple.len(), 2);
    }

    #[test]
    fn test_display_lexical_forms() {
        assert_eq!(TupleValue::Long(42).to_string(), "42");
        assert_eq!(TupleValue::Boolean(true).to_string(), "true");
        assert_eq!(TupleValue::String("x".into()).to_string(), "x");
    }
}
