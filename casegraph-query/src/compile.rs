//! Condition-tree to query-text compilation
//!
//! The compiler walks a [`Condition`] tree recursively, rendering each leaf
//! through the [`OperationRegistry`] and wrapping every child in its own
//! block. Sibling blocks under an OR junction are joined with `UNION`
//! connectors (between every adjacent pair, never after the last); AND
//! siblings are sequential blocks with no explicit connector.
//!
//! Every compiled query ends with the fixed object-binding fragment so the
//! store always projects the canonical subject variable and its type, which
//! the result mapper depends on.

use crate::condition::{Condition, Junction, Node};
use crate::error::Result;
use crate::registry::OperationRegistry;
use casegraph_vocab::query as qvocab;

/// Compiles condition trees into query text
pub struct QueryCompiler<'a> {
    registry: &'a OperationRegistry,
}

impl<'a> QueryCompiler<'a> {
    pub fn new(registry: &'a OperationRegistry) -> Self {
        Self { registry }
    }

    /// Compile a tree into a complete SELECT query
    ///
    /// Fails fast on the first rule whose operator has no registered
    /// renderer; no partial query text escapes this function on error.
    pub fn compile(&self, tree: &Condition) -> Result<String> {
        let mut body = String::new();
        self.compile_condition(tree, &mut body)?;
        // Object binding: every query projects the canonical subject and its
        // type regardless of tree shape.
        body.push_str(&format!(
            "?{} a ?{} .\n",
            qvocab::INSTANCE_VAR,
            qvocab::INSTANCE_TYPE_VAR
        ));
        Ok(format!("SELECT DISTINCT * WHERE {{\n{body}}}\n"))
    }

    fn compile_condition(&self, condition: &Condition, out: &mut String) -> Result<()> {
        let children = condition.children();
        for (idx, child) in children.iter().enumerate() {
            out.push_str("{\n");
            match child {
                Node::Rule(rule) => self.registry.render(rule, out)?,
                Node::Condition(nested) => self.compile_condition(nested, out)?,
            }
            out.push_str("}\n");
            if condition.junction() == Junction::Or && idx + 1 < children.len() {
                out.push_str("UNION\n");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::{Rule, ValueType};
    use crate::error::QueryError;

    fn rule(field: &str, value: &str) -> Node {
        Node::Rule(Rule::new(
            format!("http://ex.org/vocab#{field}"),
            "=",
            value,
            ValueType::String,
        ))
    }

    fn compile(tree: &Condition) -> String {
        let registry = OperationRegistry::with_defaults();
        QueryCompiler::new(&registry).compile(tree).unwrap()
    }

    fn union_count(query: &str) -> usize {
        query.matches("UNION").count()
    }

    #[test]
    fn test_single_rule_no_connector() {
        let tree = Condition::all(vec![rule("title", "report")]).unwrap();
        let query = compile(&tree);
        assert_eq!(union_count(&query), 0);
        assert_eq!(
            query
                .matches("?instance <http://ex.org/vocab#title>")
                .count(),
            1
        );
    }

    #[test]
    fn test_or_emits_n_minus_one_connectors() {
        for n in 2..=5 {
            let children: Vec<Node> =
                (0..n).map(|i| rule("state", &format!("s{i}"))).collect();
            let tree = Condition::any(children).unwrap();
            assert_eq!(union_count(&compile(&tree)), n - 1);
        }
    }

    #[test]
    fn test_and_emits_no_connectors() {
        let tree = Condition::all(vec![
            rule("title", "a"),
            rule("state", "open"),
            rule("owner", "bob"),
        ])
        .unwrap();
        assert_eq!(union_count(&compile(&tree)), 0);
    }

    #[test]
    fn test_nested_junctions() {
        // (title = a AND (state = open OR state = closed))
        let inner = Condition::any(vec![rule("state", "open"), rule("state", "closed")]).unwrap();
        let tree = Condition::all(vec![rule("title", "a"), Node::Condition(inner)]).unwrap();
        let query = compile(&tree);
        // One connector from the inner OR, none from the outer AND.
        assert_eq!(union_count(&query), 1);
    }

    #[test]
    fn test_object_binding_always_appended() {
        let tree = Condition::all(vec![rule("title", "a")]).unwrap();
        let query = compile(&tree);
        assert!(query.contains("?instance a ?instanceType ."));
    }

    #[test]
    fn test_unsupported_operator_aborts_compilation() {
        let bad = Node::Rule(Rule::new(
            "http://ex.org/vocab#title",
            "soundsLike",
            "x",
            ValueType::String,
        ));
        let tree = Condition::all(vec![rule("title", "a"), bad]).unwrap();
        let registry = OperationRegistry::with_defaults();
        let err = QueryCompiler::new(&registry).compile(&tree);
        assert!(matches!(err, Err(QueryError::UnsupportedOperator { .. })));
    }
}
