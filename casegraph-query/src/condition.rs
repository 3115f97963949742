//! Condition-tree data model
//!
//! A search filter is a tree of [`Condition`] nodes (boolean junctions)
//! whose leaves are [`Rule`]s (a predicate on a single field). The tree is
//! built once per request, read-only after being handed to the compiler,
//! and never forms a cycle.

use crate::error::{QueryError, Result};
use serde::{Deserialize, Serialize};

/// Boolean combinator governing how sibling nodes are connected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Junction {
    /// Sequential blocks, implicitly conjunctive
    And,
    /// Blocks joined with UNION connectors
    Or,
}

/// Concrete type of a rule's values, controlling literal rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueType {
    String,
    Long,
    Double,
    Boolean,
    Date,
    DateTime,
    Iri,
}

/// Leaf predicate on one field
///
/// Immutable once built; `values` keeps insertion order (it matters for
/// operators like `between`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// Predicate IRI the rule constrains
    pub field: String,
    /// Operator name, resolved against the operation registry
    pub operator: String,
    /// Operand values, ordered
    pub values: Vec<String>,
    /// How the values are rendered as literals
    pub value_type: ValueType,
}

impl Rule {
    /// Create a single-valued rule
    pub fn new(
        field: impl Into<String>,
        operator: impl Into<String>,
        value: impl Into<String>,
        value_type: ValueType,
    ) -> Self {
        Self {
            field: field.into(),
            operator: operator.into(),
            values: vec![value.into()],
            value_type,
        }
    }

    /// Create a multi-valued rule (e.g. `in`, `between`)
    pub fn with_values(
        field: impl Into<String>,
        operator: impl Into<String>,
        values: Vec<String>,
        value_type: ValueType,
    ) -> Self {
        Self {
            field: field.into(),
            operator: operator.into(),
            values,
            value_type,
        }
    }

    /// Create a value-less rule (e.g. `exists`, `notExists`)
    pub fn without_values(
        field: impl Into<String>,
        operator: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            operator: operator.into(),
            values: Vec::new(),
            value_type: ValueType::String,
        }
    }
}

/// A node in the condition tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    Rule(Rule),
    Condition(Condition),
}

/// Boolean junction over an ordered, non-empty list of children
///
/// Fields are private so the non-empty invariant holds for every
/// constructed value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    junction: Junction,
    children: Vec<Node>,
}

impl Condition {
    /// Create a condition; rejects an empty child list
    pub fn new(junction: Junction, children: Vec<Node>) -> Result<Self> {
        if children.is_empty() {
            return Err(QueryError::EmptyCondition);
        }
        Ok(Self { junction, children })
    }

    /// Convenience constructor for an AND over the given children
    pub fn all(children: Vec<Node>) -> Result<Self> {
        Self::new(Junction::And, children)
    }

    /// Convenience constructor for an OR over the given children
    pub fn any(children: Vec<Node>) -> Result<Self> {
        Self::new(Junction::Or, children)
    }

    pub fn junction(&self) -> Junction {
        self.junction
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Append a child node
    pub fn push(&mut self, node: Node) {
        self.children.push(node);
    }
}
