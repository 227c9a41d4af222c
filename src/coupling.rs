//! Afferent/efferent coupling and instability per node.

use crate::graph::Graph;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Coupling metrics of a single node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CouplingMetrics {
    /// Ca: edges pointing into the node.
    pub afferent: usize,
    /// Ce: edges leaving the node.
    pub efferent: usize,
    /// I = Ce / (Ca + Ce), or 0.0 for a node with no edges.
    pub instability: f64,
}

impl CouplingMetrics {
    pub fn new(afferent: usize, efferent: usize) -> Self {
        let total = afferent + efferent;
        let instability = if total == 0 {
            0.0
        } else {
            efferent as f64 / total as f64
        };
        Self {
            afferent,
            efferent,
            instability,
        }
    }
}

/// Coupling metrics for every node of a graph, keyed and ordered by node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CouplingAnalysis {
    pub packages: BTreeMap<String, CouplingMetrics>,
}

impl CouplingAnalysis {
    pub fn get(&self, node: &str) -> Option<&CouplingMetrics> {
        self.packages.get(node)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CouplingMetrics)> {
        self.packages.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

/// Computes coupling metrics for every node mentioned in `graph`, whether as
/// a source or only as an import target.
#[tracing::instrument(level = "debug", skip_all, fields(sources = graph.len()))]
pub fn calculate_coupling(graph: &Graph) -> CouplingAnalysis {
    let mut counts: BTreeMap<&str, (usize, usize)> =
        graph.nodes().into_iter().map(|n| (n, (0, 0))).collect();

    for (source, target) in graph.edges() {
        if let Some((_, efferent)) = counts.get_mut(source) {
            *efferent += 1;
        }
        if let Some((afferent, _)) = counts.get_mut(target) {
            *afferent += 1;
        }
    }

    let packages: BTreeMap<String, CouplingMetrics> = counts
        .into_iter()
        .map(|(node, (afferent, efferent))| {
            (node.to_string(), CouplingMetrics::new(afferent, efferent))
        })
        .collect();

    tracing::debug!(nodes = packages.len(), "Computed coupling metrics");
    CouplingAnalysis { packages }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_dependency_is_stable_and_importers_unstable() {
        let graph = Graph::from_edges([("a", vec!["b"]), ("c", vec!["b"])]);
        let analysis = calculate_coupling(&graph);

        let b = analysis.get("b").expect("import-only node must be present");
        assert_eq!((b.afferent, b.efferent), (2, 0));
        assert_eq!(b.instability, 0.0);

        let a = analysis.get("a").unwrap();
        assert_eq!((a.afferent, a.efferent), (0, 1));
        assert_eq!(a.instability, 1.0);
        assert_eq!(analysis.len(), 3);
    }

    #[test]
    fn test_mixed_node_instability() {
        let graph = Graph::from_edges([("a", vec!["b"]), ("b", vec!["c", "d", "e"])]);
        let b = *calculate_coupling(&graph).get("b").unwrap();
        assert_eq!(b, CouplingMetrics::new(1, 3));
        assert!((b.instability - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_repeated_import_counts_once() {
        let graph = Graph::from_edges([("a", vec!["b", "b"]), ("c", vec!["b"])]);
        let analysis = calculate_coupling(&graph);

        assert_eq!(analysis.get("a"), Some(&CouplingMetrics::new(0, 1)));
        assert_eq!(analysis.get("b"), Some(&CouplingMetrics::new(2, 0)));
    }

    #[test]
    fn test_isolated_node_has_zero_instability() {
        let graph = Graph::from_edges([("lonely", Vec::<String>::new())]);
        let m = *calculate_coupling(&graph).get("lonely").unwrap();
        assert_eq!(m, CouplingMetrics::new(0, 0));
        assert_eq!(m.instability, 0.0);
        assert!(!m.instability.is_nan());
    }

    #[test]
    fn test_counts_accumulate_across_sources() {
        let graph = Graph::from_edges([
            ("a", vec!["hub"]),
            ("b", vec!["hub"]),
            ("c", vec!["hub"]),
            ("hub", vec!["a"]),
        ]);
        let analysis = calculate_coupling(&graph);
        assert_eq!(analysis.get("hub").unwrap().afferent, 3);
        assert_eq!(analysis.get("a").unwrap().afferent, 1);
        assert_eq!(analysis.get("a").unwrap().efferent, 1);
    }

    #[test]
    fn test_self_import_counts_both_directions() {
        let graph = Graph::from_edges([("a", vec!["a"])]);
        let a = *calculate_coupling(&graph).get("a").unwrap();
        assert_eq!((a.afferent, a.efferent), (1, 1));
        assert_eq!(a.instability, 0.5);
    }

    #[test]
    fn test_empty_graph_has_no_packages() {
        assert!(calculate_coupling(&Graph::new()).is_empty());
    }
}
