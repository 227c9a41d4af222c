//! Rule-based validation of an import graph.
//!
//! Two modes are supported:
//!
//! - [`Mode::Forbidden`] allows everything except edges that a forbidden rule
//!   explicitly denies. Every matching `(rule, import pattern)` pair produces
//!   its own violation, so one edge can be reported several times.
//! - [`Mode::Allowed`] denies everything that no allowed rule permits. Rules are
//!   tried in declaration order, the first one permitting an edge wins, and an
//!   edge nothing permits yields exactly one violation.
//!
//! Validation is total: once the rules are compiled and the mode is parsed
//! nothing here can fail.

use crate::error::{ImportMapsError, Result};
use crate::graph::Graph;
use crate::matcher::Rule;
use crate::stdlib::StandardDependency;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Validation mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Default-allow; forbidden rules deny.
    #[default]
    Forbidden,
    /// Default-deny; allowed rules permit.
    Allowed,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mode::Forbidden => "forbidden",
            Mode::Allowed => "allowed",
        })
    }
}

impl FromStr for Mode {
    type Err = ImportMapsError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "forbidden" => Ok(Mode::Forbidden),
            "allowed" => Ok(Mode::Allowed),
            other => Err(ImportMapsError::invalid_mode(other)),
        }
    }
}

/// A rule violation on a single edge.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Violation {
    /// The importing node.
    pub source: String,
    /// The imported node.
    pub import: String,
    /// The forbidden import pattern that matched. Always `None` in allowed mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    pub message: String,
}

/// Compiled forbidden and allowed rules, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct Ruleset {
    pub forbidden: Vec<Rule>,
    pub allowed: Vec<Rule>,
}

impl Ruleset {
    pub fn new(forbidden: Vec<Rule>, allowed: Vec<Rule>) -> Self {
        Self { forbidden, allowed }
    }

    /// Validates `graph` in the given mode.
    ///
    /// `stdlib` is only consulted in allowed mode.
    #[tracing::instrument(level = "debug", skip_all, fields(mode = %mode))]
    pub fn validate(
        &self,
        graph: &Graph,
        mode: Mode,
        stdlib: &dyn StandardDependency,
    ) -> Vec<Violation> {
        let violations = match mode {
            Mode::Forbidden => self.validate_forbidden(graph),
            Mode::Allowed => self.validate_allowed(graph, stdlib),
        };
        tracing::info!(
            edges = graph.edge_count(),
            violations = violations.len(),
            "Validation finished"
        );
        violations
    }

    fn validate_forbidden(&self, graph: &Graph) -> Vec<Violation> {
        let mut violations = Vec::new();

        for rule in &self.forbidden {
            for (source, imports) in graph.iter() {
                if !rule.applies_to(source) {
                    continue;
                }
                for target in imports {
                    for pattern in rule.matching_imports(target) {
                        tracing::debug!(source, target = %target, pattern = %pattern, "Forbidden import");
                        violations.push(Violation {
                            source: source.to_string(),
                            import: target.clone(),
                            pattern: Some(pattern.as_str().to_string()),
                            message: format!(
                                "{} imports {} (matched rule: {} -> {})",
                                source,
                                target,
                                rule.source_pattern(),
                                pattern
                            ),
                        });
                    }
                }
            }
        }

        violations
    }

    fn validate_allowed(&self, graph: &Graph, stdlib: &dyn StandardDependency) -> Vec<Violation> {
        let mut violations = Vec::new();

        for (source, target) in graph.edges() {
            let permitted = self
                .allowed
                .iter()
                .filter(|rule| rule.applies_to(source))
                .any(|rule| {
                    (rule.allows_stdlib() && stdlib.is_standard(target)) || rule.permits(target)
                });

            if !permitted {
                tracing::debug!(source, target, "Import not covered by any allowed rule");
                violations.push(Violation {
                    source: source.to_string(),
                    import: target.to_string(),
                    pattern: None,
                    message: format!(
                        "{} imports {}, but no allowed rule matched",
                        source, target
                    ),
                });
            }
        }

        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stdlib::Stdlib;

    fn rule(source: &str, imports: &[&str]) -> Rule {
        Rule::compile(source, imports, None, "test").unwrap()
    }

    fn no_stdlib() -> impl Fn(&str) -> bool {
        |_: &str| false
    }

    #[test]
    fn test_mode_parses_known_names_only() {
        assert_eq!("forbidden".parse::<Mode>().unwrap(), Mode::Forbidden);
        assert_eq!("allowed".parse::<Mode>().unwrap(), Mode::Allowed);
        let err = "strict".parse::<Mode>().unwrap_err();
        assert!(matches!(err, ImportMapsError::InvalidMode { ref value } if value == "strict"));
    }

    #[test]
    fn test_mode_defaults_to_forbidden() {
        assert_eq!(Mode::default(), Mode::Forbidden);
        assert_eq!(Mode::Allowed.to_string(), "allowed");
    }

    #[test]
    fn test_allowed_mode_repeated_import_is_one_violation() {
        let graph: Graph = serde_json::from_str(r#"{"a": ["b", "b"]}"#).unwrap();
        let rules = Ruleset::new(vec![], vec![rule("^a$", &["^c$"])]);

        let violations = rules.validate(&graph, Mode::Allowed, &no_stdlib());
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].message, "a imports b, but no allowed rule matched");
    }

    #[test]
    fn test_empty_ruleset_forbidden_mode_finds_nothing() {
        let graph = Graph::from_edges([("a", vec!["b", "c"]), ("b", vec!["c"])]);
        let violations = Ruleset::default().validate(&graph, Mode::Forbidden, &no_stdlib());
        assert!(violations.is_empty());
    }

    #[test]
    fn test_empty_graph_allowed_mode_finds_nothing() {
        let violations = Ruleset::default().validate(&Graph::new(), Mode::Allowed, &no_stdlib());
        assert!(violations.is_empty());
    }

    #[test]
    fn test_forbidden_rule_reports_matching_edge() {
        let rules = Ruleset::new(vec![rule("^a$", &["^b$"])], vec![]);
        let graph = Graph::from_edges([("a", vec!["b"])]);

        let violations = rules.validate(&graph, Mode::Forbidden, &no_stdlib());

        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].source, "a");
        assert_eq!(violations[0].import, "b");
        assert_eq!(violations[0].pattern.as_deref(), Some("^b$"));
        assert!(violations[0].message.contains("^a$ -> ^b$"));
    }

    #[test]
    fn test_forbidden_mode_accumulates_across_rules() {
        let rules = Ruleset::new(vec![rule("^a$", &["b"]), rule("a", &["^b$"])], vec![]);
        let graph = Graph::from_edges([("a", vec!["b"])]);

        let violations = rules.validate(&graph, Mode::Forbidden, &no_stdlib());
        assert_eq!(violations.len(), 2, "both rules deny the same edge");
    }

    #[test]
    fn test_forbidden_mode_accumulates_across_patterns_of_one_rule() {
        let rules = Ruleset::new(vec![rule("^a$", &["b", "^b"])], vec![]);
        let graph = Graph::from_edges([("a", vec!["b"])]);

        let violations = rules.validate(&graph, Mode::Forbidden, &no_stdlib());
        let patterns: Vec<_> = violations.iter().filter_map(|v| v.pattern.as_deref()).collect();
        assert_eq!(patterns, vec!["b", "^b"]);
    }

    #[test]
    fn test_forbidden_rule_ignores_other_sources() {
        let rules = Ruleset::new(vec![rule("^a$", &["^b$"])], vec![]);
        let graph = Graph::from_edges([("c", vec!["b"])]);

        assert!(rules.validate(&graph, Mode::Forbidden, &no_stdlib()).is_empty());
    }

    #[test]
    fn test_allowed_mode_reports_unmatched_edge_once() {
        let rules = Ruleset::new(vec![], vec![rule("^a$", &["^c$"]), rule("a", &["^d$"])]);
        let graph = Graph::from_edges([("a", vec!["b"])]);

        let violations = rules.validate(&graph, Mode::Allowed, &no_stdlib());

        assert_eq!(violations.len(), 1, "one violation per edge, not per rule");
        assert_eq!(violations[0].source, "a");
        assert_eq!(violations[0].import, "b");
        assert!(violations[0].message.contains("no allowed rule matched"));
        assert!(violations[0].pattern.is_none());
    }

    #[test]
    fn test_allowed_mode_permits_standard_dependency_by_default() {
        let rules = Ruleset::new(vec![], vec![rule("^a$", &["^c$"])]);
        let graph = Graph::from_edges([("a", vec!["b"])]);
        let b_is_standard = |id: &str| id == "b";

        assert!(rules.validate(&graph, Mode::Allowed, &b_is_standard).is_empty());
    }

    #[test]
    fn test_allowed_mode_respects_disabled_stdlib_flag() {
        let strict = Rule::compile("^a$", &["^c$"], Some(false), "test").unwrap();
        let rules = Ruleset::new(vec![], vec![strict]);
        let graph = Graph::from_edges([("a", vec!["std::fmt"])]);

        let violations = rules.validate(&graph, Mode::Allowed, &Stdlib::Rust);
        assert_eq!(violations.len(), 1);
    }

    #[test]
    fn test_allowed_mode_later_rule_can_permit() {
        let rules = Ruleset::new(vec![], vec![rule("^a$", &["^c$"]), rule("^a", &["^b$"])]);
        let graph = Graph::from_edges([("a", vec!["b", "c"])]);

        assert!(rules.validate(&graph, Mode::Allowed, &no_stdlib()).is_empty());
    }

    #[test]
    fn test_allowed_mode_source_without_rules_fails_every_edge() {
        let rules = Ruleset::new(vec![], vec![rule("^x$", &[".*"])]);
        let graph = Graph::from_edges([("a", vec!["b", "c"])]);

        let violations = rules.validate(&graph, Mode::Allowed, &no_stdlib());
        assert_eq!(violations.len(), 2);
    }

    #[test]
    fn test_source_without_edges_never_violates() {
        let graph = Graph::from_edges([("a", Vec::<String>::new())]);
        let forbidden = Ruleset::new(vec![rule(".*", &[".*"])], vec![]);

        assert!(forbidden.validate(&graph, Mode::Forbidden, &no_stdlib()).is_empty());
        assert!(Ruleset::default().validate(&graph, Mode::Allowed, &no_stdlib()).is_empty());
    }

    #[test]
    fn test_forbidden_rules_are_ignored_in_allowed_mode() {
        let rules = Ruleset::new(vec![rule(".*", &[".*"])], vec![rule(".*", &[".*"])]);
        let graph = Graph::from_edges([("a", vec!["b"])]);

        assert!(rules.validate(&graph, Mode::Allowed, &no_stdlib()).is_empty());
    }
}
