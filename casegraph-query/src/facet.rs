//! Facets and facet-derived query constraints
//!
//! A facet is a filterable, countable dimension over one property. Selected
//! facet values become extra AND-ed rules before compilation; selections on
//! date-classed facets additionally become date-range arguments that are
//! intersected with the basic-search form's ranges.

use crate::args::{ArgumentValue, DateRange};
use crate::condition::{Node, Rule, ValueType};
use casegraph_vocab::facet as fvocab;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Value class of a facet's property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RangeClass {
    /// Plain discrete values
    #[default]
    None,
    Date,
    DateTime,
    Boolean,
}

/// A filterable dimension with its selected values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facet {
    /// Property IRI the facet is derived from
    pub uri: String,
    /// Value class, controlling how selections are interpreted
    pub range_class: RangeClass,
    /// Selected values; may contain the no-value sentinel
    pub selected: BTreeSet<String>,
}

impl Facet {
    pub fn new(uri: impl Into<String>, range_class: RangeClass) -> Self {
        Self {
            uri: uri.into(),
            range_class,
            selected: BTreeSet::new(),
        }
    }

    pub fn with_selected(mut self, value: impl Into<String>) -> Self {
        self.selected.insert(value.into());
        self
    }

    fn value_type(&self) -> ValueType {
        match self.range_class {
            RangeClass::None => ValueType::String,
            RangeClass::Date => ValueType::Date,
            RangeClass::DateTime => ValueType::DateTime,
            RangeClass::Boolean => ValueType::Boolean,
        }
    }
}

/// Translate facet selections into rule nodes AND-ed onto the tree
///
/// The no-value sentinel compiles to a negated-presence rule, never a
/// value match. Date-classed selections are handled by
/// [`facet_date_arguments`] instead and skipped here.
pub fn facet_rules(facets: &[Facet]) -> Vec<Node> {
    let mut nodes = Vec::new();
    for facet in facets {
        if facet.selected.contains(fvocab::NO_VALUE) {
            nodes.push(Node::Rule(Rule::without_values(
                facet.uri.clone(),
                "notExists",
            )));
        }
        if matches!(facet.range_class, RangeClass::Date | RangeClass::DateTime) {
            continue;
        }
        let values: Vec<String> = facet
            .selected
            .iter()
            .filter(|v| v.as_str() != fvocab::NO_VALUE)
            .cloned()
            .collect();
        match values.len() {
            0 => {}
            1 => nodes.push(Node::Rule(Rule::new(
                facet.uri.clone(),
                "=",
                values.into_iter().next().unwrap(),
                facet.value_type(),
            ))),
            _ => nodes.push(Node::Rule(Rule::with_values(
                facet.uri.clone(),
                "in",
                values,
                facet.value_type(),
            ))),
        }
    }
    nodes
}

/// Derive date-range arguments from date-classed facet selections
///
/// Each selected value is an ISO day (`YYYY-MM-DD`); the facet's range is
/// the envelope of its selected days. Unparseable selections are ignored.
pub fn facet_date_arguments(facets: &[Facet]) -> HashMap<String, ArgumentValue> {
    let mut out = HashMap::new();
    for facet in facets {
        if !matches!(facet.range_class, RangeClass::Date | RangeClass::DateTime) {
            continue;
        }
        let days: Vec<NaiveDate> = facet
            .selected
            .iter()
            .filter(|v| v.as_str() != fvocab::NO_VALUE)
            .filter_map(|v| NaiveDate::parse_from_str(v, "%Y-%m-%d").ok())
            .collect();
        let (Some(first), Some(last)) = (days.iter().min(), days.iter().max()) else {
            continue;
        };
        let start: NaiveDateTime = first.and_hms_opt(0, 0, 0).unwrap();
        let end: NaiveDateTime = last.and_hms_opt(23, 59, 59).unwrap();
        out.insert(
            facet.uri.clone(),
            ArgumentValue::DateRange(DateRange::new(Some(start), Some(end))),
        );
    }
    out
}

/// Merge facet-derived arguments into the basic-search arguments
///
/// For every key present in both maps where both values are date ranges,
/// the basic range is replaced by the intersection of the two. Facet keys
/// absent from the basic map are inserted as-is.
pub fn merge_date_arguments(
    basic: &mut HashMap<String, ArgumentValue>,
    facet: &HashMap<String, ArgumentValue>,
) {
    for (key, value) in facet {
        match (basic.get(key), value) {
            (Some(ArgumentValue::DateRange(existing)), ArgumentValue::DateRange(incoming)) => {
                let merged = existing.intersect(incoming);
                basic.insert(key.clone(), ArgumentValue::DateRange(merged));
            }
            (Some(_), _) => {}
            (None, _) => {
                basic.insert(key.clone(), value.clone());
            }
        }
    }
}
