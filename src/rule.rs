//! Rule Trait
//!
//! This module defines the [`Rule`] trait, the common shape of the
//! `importmaps` commands: each one analyzes an input into structured data,
//! then renders that data and reports whether the run passed.
//!
//! # Implementing a Rule
//!
//! ```rust
//! use importmaps_core::error::Result;
//! use importmaps_core::graph::Graph;
//! use importmaps_core::rule::{Rule, Verdict};
//!
//! struct NoEmptyGraph;
//!
//! impl Rule for NoEmptyGraph {
//!     type Config = Graph;
//!     type Data = usize;
//!
//!     fn name() -> &'static str {
//!         "no_empty_graph"
//!     }
//!
//!     fn description() -> &'static str {
//!         "Fails when the graph has no edges"
//!     }
//!
//!     fn analyze(&self, graph: &Graph) -> Result<usize> {
//!         Ok(graph.edge_count())
//!     }
//!
//!     fn run(&self, graph: &Graph) -> Result<Verdict> {
//!         Ok(Verdict::from_clean(self.analyze(graph)? > 0))
//!     }
//! }
//!
//! let graph = Graph::from_edges([("a", vec!["b"])]);
//! assert_eq!(NoEmptyGraph.run(&graph).unwrap(), Verdict::Pass);
//! assert_eq!(NoEmptyGraph.run(&Graph::new()).unwrap(), Verdict::Fail);
//! ```

use crate::error::Result;
use serde::Serialize;
use std::fmt::Debug;

/// Outcome of a rule run.
///
/// A failing verdict is a normal result, not an error: the rule ran to
/// completion and found something to report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Fail,
}

impl Verdict {
    /// `Pass` when `clean` holds, `Fail` otherwise.
    pub fn from_clean(clean: bool) -> Self {
        if clean { Verdict::Pass } else { Verdict::Fail }
    }

    pub fn is_pass(self) -> bool {
        self == Verdict::Pass
    }
}

/// Common trait for all `importmaps` commands.
///
/// Each rule specifies its own configuration and data types via associated
/// types.
pub trait Rule: Sized {
    /// The effective settings this rule runs with.
    type Config: Clone + Debug;

    /// The structured result of [`Rule::analyze`], serialisable for the
    /// JSON/YAML outputs.
    type Data: Debug + Serialize;

    /// Returns the name of this rule. Used in logs.
    fn name() -> &'static str;

    /// Returns a human-readable description of this rule.
    fn description() -> &'static str;

    /// Performs the analysis without producing any output.
    ///
    /// # Errors
    ///
    /// Returns an error if the input cannot be loaded.
    fn analyze(&self, config: &Self::Config) -> Result<Self::Data>;

    /// Runs the analysis, writes the rendered result and returns the verdict.
    ///
    /// # Errors
    ///
    /// Returns an error if the analysis fails or the output cannot be
    /// rendered or written. Findings are reported through the verdict.
    fn run(&self, config: &Self::Config) -> Result<Verdict>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ImportMapsError;

    struct ThresholdRule;

    #[derive(Clone, Debug)]
    struct ThresholdConfig {
        limit: usize,
        values: Vec<usize>,
    }

    impl Rule for ThresholdRule {
        type Config = ThresholdConfig;
        type Data = Vec<usize>;

        fn name() -> &'static str {
            "threshold"
        }

        fn description() -> &'static str {
            "Flags values above a limit"
        }

        fn analyze(&self, config: &ThresholdConfig) -> Result<Vec<usize>> {
            if config.values.is_empty() {
                return Err(ImportMapsError::invalid_input("no values"));
            }
            Ok(config
                .values
                .iter()
                .copied()
                .filter(|v| *v > config.limit)
                .collect())
        }

        fn run(&self, config: &ThresholdConfig) -> Result<Verdict> {
            Ok(Verdict::from_clean(self.analyze(config)?.is_empty()))
        }
    }

    #[test]
    fn test_verdict_from_clean() {
        assert_eq!(Verdict::from_clean(true), Verdict::Pass);
        assert_eq!(Verdict::from_clean(false), Verdict::Fail);
        assert!(Verdict::Pass.is_pass());
        assert!(!Verdict::Fail.is_pass());
    }

    #[test]
    fn test_rule_run_reports_findings_through_verdict() {
        let config = ThresholdConfig {
            limit: 3,
            values: vec![1, 5],
        };
        assert_eq!(ThresholdRule.run(&config).unwrap(), Verdict::Fail);
        assert_eq!(ThresholdRule.analyze(&config).unwrap(), vec![5]);
    }

    #[test]
    fn test_rule_run_propagates_analysis_errors() {
        let config = ThresholdConfig {
            limit: 3,
            values: vec![],
        };
        assert!(ThresholdRule.run(&config).is_err());
        assert_eq!(ThresholdRule::name(), "threshold");
    }
}
