//! Operation registry and rule renderers
//!
//! A [`RuleRenderer`] turns one [`Rule`] into a query-text fragment. The
//! [`OperationRegistry`] holds renderers in registration order and resolves
//! a rule to the **first** renderer whose [`RuleRenderer::applies`] returns
//! true. No match is a fatal compilation error, never a silent no-op.
//!
//! The closed built-in operator set is dispatched through small enums
//! inside each renderer; the registry itself stays an ordered list so
//! deployments can append their own renderers ahead of or behind the
//! defaults.

use crate::condition::{Rule, ValueType};
use crate::error::{QueryError, Result};
use casegraph_vocab::{query as qvocab, text, xsd};

/// Renders a single rule into an appended query-text fragment
///
/// Renderers are pure: no shared mutable state, output depends only on
/// the rule.
pub trait RuleRenderer: Send + Sync {
    /// Whether this renderer can handle the rule
    fn applies(&self, rule: &Rule) -> bool;

    /// Append the rule's fragment to `out`
    fn render(&self, rule: &Rule, out: &mut String) -> Result<()>;
}

/// Ordered, first-match-wins renderer collection
pub struct OperationRegistry {
    renderers: Vec<Box<dyn RuleRenderer>>,
}

impl OperationRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            renderers: Vec::new(),
        }
    }

    /// Create a registry with the built-in renderers
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(ComparisonRenderer));
        registry.register(Box::new(TextMatchRenderer));
        registry.register(Box::new(MembershipRenderer));
        registry.register(Box::new(PresenceRenderer));
        registry.register(Box::new(BetweenRenderer));
        registry
    }

    /// Append a renderer; evaluation order is registration order
    pub fn register(&mut self, renderer: Box<dyn RuleRenderer>) {
        self.renderers.push(renderer);
    }

    /// Resolve the first applicable renderer for a rule
    pub fn renderer_for(&self, rule: &Rule) -> Result<&dyn RuleRenderer> {
        self.renderers
            .iter()
            .map(|r| r.as_ref())
            .find(|r| r.applies(rule))
            .ok_or_else(|| QueryError::UnsupportedOperator {
                operator: rule.operator.clone(),
            })
    }

    /// Render a rule through its resolved renderer
    pub fn render(&self, rule: &Rule, out: &mut String) -> Result<()> {
        self.renderer_for(rule)?.render(rule, out)
    }
}

impl Default for OperationRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Local name of a field IRI, sanitized for use in generated variables
pub(crate) fn local_name(field: &str) -> String {
    let tail = field
        .rsplit_once('#')
        .or_else(|| field.rsplit_once('/'))
        .map(|(_, t)| t)
        .unwrap_or(field);
    tail.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Escape a string for embedding in a quoted query literal
fn escape(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

/// Render one operand value as a query literal
pub(crate) fn format_literal(value: &str, value_type: ValueType) -> String {
    match value_type {
        ValueType::Iri => format!("<{value}>"),
        ValueType::String => format!("\"{}\"", escape(value)),
        ValueType::Long | ValueType::Double | ValueType::Boolean => value.to_string(),
        ValueType::Date => format!("\"{}\"^^<{}>", escape(value), xsd::DATE),
        ValueType::DateTime => format!("\"{}\"^^<{}>", escape(value), xsd::DATE_TIME),
    }
}

fn single_value<'a>(rule: &'a Rule) -> Result<&'a str> {
    rule.values
        .first()
        .map(String::as_str)
        .ok_or_else(|| QueryError::InvalidRule {
            operator: rule.operator.clone(),
            reason: "requires a value".into(),
        })
}

// ===== built-in renderers =====

#[derive(Clone, Copy)]
enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    fn parse(operator: &str) -> Option<Self> {
        match operator {
            "=" => Some(Self::Eq),
            "!=" => Some(Self::Ne),
            "<" => Some(Self::Lt),
            "<=" => Some(Self::Le),
            ">" => Some(Self::Gt),
            ">=" => Some(Self::Ge),
            _ => None,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        }
    }

    fn var_tag(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::Lt => "lt",
            Self::Le => "le",
            Self::Gt => "gt",
            Self::Ge => "ge",
        }
    }
}

/// `=`, `!=`, `<`, `<=`, `>`, `>=`
///
/// Equality renders a plain triple pattern; the others bind the object to
/// a generated variable and constrain it with a FILTER.
pub struct ComparisonRenderer;

impl RuleRenderer for ComparisonRenderer {
    fn applies(&self, rule: &Rule) -> bool {
        CompareOp::parse(&rule.operator).is_some()
    }

    fn render(&self, rule: &Rule, out: &mut String) -> Result<()> {
        let op = CompareOp::parse(&rule.operator).ok_or_else(|| {
            QueryError::UnsupportedOperator {
                operator: rule.operator.clone(),
            }
        })?;
        let value = single_value(rule)?;
        let literal = format_literal(value, rule.value_type);
        match op {
            CompareOp::Eq => {
                out.push_str(&format!(
                    "?{} <{}> {} .\n",
                    qvocab::INSTANCE_VAR,
                    rule.field,
                    literal
                ));
            }
            other => {
                let var = format!("{}_{}", local_name(&rule.field), other.var_tag());
                out.push_str(&format!(
                    "?{} <{}> ?{} .\nFILTER (?{} {} {})\n",
                    qvocab::INSTANCE_VAR,
                    rule.field,
                    var,
                    var,
                    other.symbol(),
                    literal
                ));
            }
        }
        Ok(())
    }
}

/// `contains` / `matches` over the full-text connector
///
/// Emits the connector placeholder as the match predicate; the augmenter
/// substitutes the configured connector identifier later.
pub struct TextMatchRenderer;

impl RuleRenderer for TextMatchRenderer {
    fn applies(&self, rule: &Rule) -> bool {
        matches!(rule.operator.as_str(), "contains" | "matches")
    }

    fn render(&self, rule: &Rule, out: &mut String) -> Result<()> {
        let value = single_value(rule)?;
        let var = format!("{}_match", local_name(&rule.field));
        out.push_str(&format!(
            "?{} <{}> ?{} .\n?{} <{}> \"{}\" .\n",
            qvocab::INSTANCE_VAR,
            text::MATCHES,
            var,
            var,
            text::CONNECTOR_PLACEHOLDER,
            escape(value)
        ));
        Ok(())
    }
}

/// `in` — VALUES block over the rule's values
pub struct MembershipRenderer;

impl RuleRenderer for MembershipRenderer {
    fn applies(&self, rule: &Rule) -> bool {
        rule.operator == "in"
    }

    fn render(&self, rule: &Rule, out: &mut String) -> Result<()> {
        if rule.values.is_empty() {
            return Err(QueryError::InvalidRule {
                operator: rule.operator.clone(),
                reason: "requires at least one value".into(),
            });
        }
        let var = format!("{}_in", local_name(&rule.field));
        let literals: Vec<String> = rule
            .values
            .iter()
            .map(|v| format_literal(v, rule.value_type))
            .collect();
        out.push_str(&format!(
            "VALUES ?{} {{ {} }}\n?{} <{}> ?{} .\n",
            var,
            literals.join(" "),
            qvocab::INSTANCE_VAR,
            rule.field,
            var
        ));
        Ok(())
    }
}

/// `exists` / `notExists` — presence and negated-presence patterns
pub struct PresenceRenderer;

impl RuleRenderer for PresenceRenderer {
    fn applies(&self, rule: &Rule) -> bool {
        matches!(rule.operator.as_str(), "exists" | "notExists")
    }

    fn render(&self, rule: &Rule, out: &mut String) -> Result<()> {
        let var = format!("{}_any", local_name(&rule.field));
        if rule.operator == "exists" {
            out.push_str(&format!(
                "?{} <{}> ?{} .\n",
                qvocab::INSTANCE_VAR,
                rule.field,
                var
            ));
        } else {
            out.push_str(&format!(
                "FILTER NOT EXISTS {{ ?{} <{}> ?{} . }}\n",
                qvocab::INSTANCE_VAR,
                rule.field,
                var
            ));
        }
        Ok(())
    }
}

/// `between` — inclusive two-sided FILTER; expects exactly two values
pub struct BetweenRenderer;

impl RuleRenderer for BetweenRenderer {
    fn applies(&self, rule: &Rule) -> bool {
        rule.operator == "between"
    }

    fn render(&self, rule: &Rule, out: &mut String) -> Result<()> {
        if rule.values.len() != 2 {
            return Err(QueryError::InvalidRule {
                operator: rule.operator.clone(),
                reason: format!("requires exactly two values, got {}", rule.values.len()),
            });
        }
        let var = format!("{}_between", local_name(&rule.field));
        let low = format_literal(&rule.values[0], rule.value_type);
        let high = format_literal(&rule.values[1], rule.value_type);
        out.push_str(&format!(
            "?{} <{}> ?{} .\nFILTER (?{} >= {} && ?{} <= {})\n",
            qvocab::INSTANCE_VAR,
            rule.field,
            var,
            var,
            low,
            var,
            high
        ));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(op: &str) -> Rule {
        Rule::new("http://ex.org/vocab#title", op, "abc", ValueType::String)
    }

    // ===== registry resolution =====

    #[test]
    fn test_unsupported_operator_fails() {
        let registry = OperationRegistry::with_defaults();
        let err = registry.renderer_for(&rule("soundsLike"));
        match err {
            Err(QueryError::UnsupportedOperator { operator }) => {
                assert_eq!(operator, "soundsLike");
            }
            Ok(_) => panic!("expected UnsupportedOperator, got Ok(_)"),
            Err(other) => panic!("expected UnsupportedOperator, got {other:?}"),
        }
    }

    #[test]
    fn test_first_match_wins() {
        struct GreedyRenderer;
        impl RuleRenderer for GreedyRenderer {
            fn applies(&self, _rule: &Rule) -> bool {
                true
            }
            fn render(&self, _rule: &Rule, out: &mut String) -> Result<()> {
                out.push_str("GREEDY\n");
                Ok(())
            }
        }

        let mut registry = OperationRegistry::new();
        registry.register(Box::new(GreedyRenderer));
        registry.register(Box::new(ComparisonRenderer));

        let mut out = String::new();
        registry.render(&rule("="), &mut out).unwrap();
        assert_eq!(out, "GREEDY\n");
    }

    #[test]
    fn test_empty_registry_matches_nothing() {
        let registry = OperationRegistry::new();
        assert!(registry.renderer_for(&rule("=")).is_err());
    }

    // ===== built-in fragments =====

    #[test]
    fn test_equality_fragment() {
        let registry = OperationRegistry::with_defaults();
        let mut out = String::new();
        registry.render(&rule("="), &mut out).unwrap();
        assert_eq!(out, "?instance <http://ex.org/vocab#title> \"abc\" .\n");
    }

    #[test]
    fn test_comparison_generates_filter() {
        let registry = OperationRegistry::with_defaults();
        let r = Rule::new("http://ex.org/vocab#size", ">=", "10", ValueType::Long);
        let mut out = String::new();
        registry.render(&r, &mut out).unwrap();
        assert!(out.contains("?instance <http://ex.org/vocab#size> ?size_ge ."));
        assert!(out.contains("FILTER (?size_ge >= 10)"));
    }

    #[test]
    fn test_text_match_uses_placeholder() {
        let registry = OperationRegistry::with_defaults();
        let mut out = String::new();
        registry.render(&rule("contains"), &mut out).unwrap();
        assert!(out.contains(text::CONNECTOR_PLACEHOLDER));
        assert!(out.contains("?title_match"));
    }

    #[test]
    fn test_membership_values_block() {
        let registry = OperationRegistry::with_defaults();
        let r = Rule::with_values(
            "http://ex.org/vocab#state",
            "in",
            vec!["open".into(), "closed".into()],
            ValueType::String,
        );
        let mut out = String::new();
        registry.render(&r, &mut out).unwrap();
        assert!(out.contains("VALUES ?state_in { \"open\" \"closed\" }"));
    }

    #[test]
    fn test_not_exists_negated_presence() {
        let registry = OperationRegistry::with_defaults();
        let r = Rule::without_values("http://ex.org/vocab#handler", "notExists");
        let mut out = String::new();
        registry.render(&r, &mut out).unwrap();
        assert!(out.starts_with("FILTER NOT EXISTS {"));
    }

    #[test]
    fn test_between_requires_two_values() {
        let registry = OperationRegistry::with_defaults();
        let r = Rule::new("http://ex.org/vocab#size", "between", "1", ValueType::Long);
        assert!(matches!(
            registry.render(&r, &mut String::new()),
            Err(QueryError::InvalidRule { .. })
        ));
    }

    #[test]
    fn test_iri_and_typed_literals() {
        assert_eq!(format_literal("http://x/y", ValueType::Iri), "<http://x/y>");
        assert_eq!(
            format_literal("2020-01-01", ValueType::Date),
            format!("\"2020-01-01\"^^<{}>", xsd::DATE)
        );
        assert_eq!(format_literal("42", ValueType::Long), "42");
    }

    #[test]
    fn test_string_escaping() {
        assert_eq!(
            format_literal("say \"hi\"", ValueType::String),
            "\"say \\\"hi\\\"\""
        );
    }

    #[test]
    fn test_local_name_sanitized() {
        assert_eq!(local_name("http://ex.org/vocab#created-at"), "created_at");
        assert_eq!(local_name("http://ex.org/plain/path"), "path");
        assert_eq!(local_name("bare"), "bare");
    }
}
