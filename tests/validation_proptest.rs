//! Property-based tests for validation and coupling metrics.
//!
//! Graphs are generated as `(source, imports)` pairs over a small node
//! alphabet so that rules and shared dependencies actually collide.

use importmaps_core::{Graph, Mode, Rule, Ruleset, Stdlib, Violation, calculate_coupling};
use proptest::prelude::*;

fn node() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["a", "b", "c", "d", "e", "std"]).prop_map(String::from)
}

fn any_pairs() -> impl Strategy<Value = Vec<(String, Vec<String>)>> {
    prop::collection::vec((node(), prop::collection::vec(node(), 0..4)), 0..8)
}

/// The same edges, with pair order and every import list reversed.
fn reversed(pairs: &[(String, Vec<String>)]) -> Vec<(String, Vec<String>)> {
    pairs
        .iter()
        .rev()
        .map(|(source, imports)| (source.clone(), imports.iter().rev().cloned().collect()))
        .collect()
}

fn rules() -> Ruleset {
    let compile = |source: &str, imports: &[&str], slot: &str| {
        Rule::compile(source, imports, None, slot).expect("fixed patterns are valid")
    };
    Ruleset::new(
        vec![
            compile("^a", &["b", "c"], "forbidden[0]"),
            compile("a|b", &["^c$"], "forbidden[1]"),
        ],
        vec![
            compile("^a$", &["^b$"], "allowed[0]"),
            compile("^c$", &["."], "allowed[1]"),
        ],
    )
}

fn sorted(mut violations: Vec<Violation>) -> Vec<Violation> {
    violations.sort();
    violations
}

proptest! {
    /// Coupling metrics only depend on which edges exist, not on the order
    /// they were declared in.
    #[test]
    fn prop_coupling_is_order_independent(pairs in any_pairs()) {
        let forward = calculate_coupling(&Graph::from_edges(pairs.clone()));
        let backward = calculate_coupling(&Graph::from_edges(reversed(&pairs)));
        prop_assert_eq!(forward, backward);
    }

    /// Running the analysis twice gives identical results.
    #[test]
    fn prop_coupling_is_idempotent(pairs in any_pairs()) {
        let graph = Graph::from_edges(pairs);
        prop_assert_eq!(calculate_coupling(&graph), calculate_coupling(&graph));
    }

    /// Instability is always a number in [0, 1], and every edge is counted
    /// once as efferent and once as afferent.
    #[test]
    fn prop_instability_is_bounded(pairs in any_pairs()) {
        let graph = Graph::from_edges(pairs);
        let analysis = calculate_coupling(&graph);

        prop_assert_eq!(analysis.len(), graph.nodes().len());
        for (_, m) in analysis.iter() {
            prop_assert!(!m.instability.is_nan());
            prop_assert!((0.0..=1.0).contains(&m.instability));
        }
        let afferent: usize = analysis.iter().map(|(_, m)| m.afferent).sum();
        let efferent: usize = analysis.iter().map(|(_, m)| m.efferent).sum();
        prop_assert_eq!(afferent, graph.edge_count());
        prop_assert_eq!(efferent, graph.edge_count());
    }

    /// Both modes report the same violations regardless of declaration order.
    #[test]
    fn prop_validation_is_order_independent(pairs in any_pairs()) {
        let forward = Graph::from_edges(pairs.clone());
        let backward = Graph::from_edges(reversed(&pairs));
        let rules = rules();

        for mode in [Mode::Forbidden, Mode::Allowed] {
            prop_assert_eq!(
                sorted(rules.validate(&forward, mode, &Stdlib::Rust)),
                sorted(rules.validate(&backward, mode, &Stdlib::Rust))
            );
        }
    }

    /// Allowed mode reports at most one violation per edge, and only edges
    /// no rule permits.
    #[test]
    fn prop_allowed_mode_reports_each_edge_at_most_once(pairs in any_pairs()) {
        let graph = Graph::from_edges(pairs);
        let violations = rules().validate(&graph, Mode::Allowed, &Stdlib::Rust);

        prop_assert!(violations.len() <= graph.edge_count());
        for v in &violations {
            if v.source == "a" {
                prop_assert!(v.import != "std", "a's rule lets standard imports through");
            }
            prop_assert!(v.source != "c", "c may import anything");
            prop_assert!(v.pattern.is_none());
        }
    }

    /// Without rules, forbidden mode never reports anything.
    #[test]
    fn prop_forbidden_mode_without_rules_is_silent(pairs in any_pairs()) {
        let graph = Graph::from_edges(pairs);
        prop_assert!(Ruleset::default().validate(&graph, Mode::Forbidden, &Stdlib::None).is_empty());
    }
}
