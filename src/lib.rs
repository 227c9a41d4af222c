//! # importmaps - architectural rules for import graphs
//!
//! importmaps is a CLI tool and library for checking the dependency structure
//! of a codebase. Given a directed graph of modules and the modules they
//! import, it provides:
//!
//! - **Rule validation**: regular-expression rules that either forbid edges
//!   (everything else is allowed) or allow edges (everything else is denied)
//! - **Coupling metrics**: afferent coupling, efferent coupling and
//!   instability per node
//! - **Threshold evaluation**: flags nodes whose coupling exceeds configured
//!   limits
//!
//! ## Architecture
//!
//! - [`matcher`], [`validate`], [`coupling`], [`thresholds`] - the analysis
//!   core; pure functions over an in-memory [`Graph`]
//! - [`graph`] and [`extract`] - loading graphs from JSON/YAML files or
//!   extracting them from Rust crate sources
//! - [`stdlib`] - which identifiers count as standard-library imports
//! - [`config`] - configuration file loading and merging with CLI arguments
//! - [`reporting`], [`html_report`], [`ci_report`], [`cli_report`] -
//!   rendering results as text, diagrams, HTML, SARIF, JUnit or tables
//! - [`check_rule`], [`graph_rule`] - the `check` and `graph` commands
//! - [`error`] - centralized error types for the crate
//!
//! ## Usage as a Library
//!
//! ```rust
//! use importmaps_core::{Graph, Mode, Rule, Ruleset, Stdlib};
//!
//! # fn main() -> importmaps_core::Result<()> {
//! let graph = Graph::from_edges([
//!     ("app/api", vec!["app/domain", "app/db"]),
//!     ("app/domain", vec![]),
//! ]);
//! let rules = Ruleset::new(
//!     vec![Rule::compile("^app/api", &["^app/db$"], None, "forbidden[0]")?],
//!     vec![],
//! );
//!
//! let violations = rules.validate(&graph, Mode::Forbidden, &Stdlib::None);
//! assert_eq!(violations.len(), 1);
//! assert_eq!(violations[0].import, "app/db");
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! All functions that can fail return [`Result<T>`], which is a type alias for
//! `std::result::Result<T, ImportMapsError>`. Validation and metric
//! computation themselves never fail once rules are compiled.

// Module declarations
pub mod check_rule;
pub mod ci_report;
pub mod cli;
pub mod cli_report;
pub mod config;
pub mod coupling;
pub mod error;
pub mod extract;
pub mod file_utils;
pub mod graph;
pub mod graph_rule;
pub mod html_report;
pub mod html_utils;
pub mod matcher;
pub mod reporting;
pub mod rule;
pub mod stdlib;
pub mod thresholds;
pub mod validate;

// Core exports
pub use crate::coupling::{CouplingAnalysis, CouplingMetrics, calculate_coupling};
pub use crate::graph::{Graph, load_graph, load_graph_file};
pub use crate::matcher::{Pattern, Rule};
pub use crate::stdlib::{StandardDependency, Stdlib};
pub use crate::thresholds::{
    CouplingLevel, CouplingViolation, CouplingWarning, Thresholds, ThresholdsConfig, evaluate,
    warnings,
};
pub use crate::validate::{Mode, Ruleset, Violation};

// Config exports
pub use crate::config::{
    CheckSettings, GraphSettings, ImportMapsConfig, load_config, merge_check_args,
    merge_graph_args,
};

// Command exports
pub use crate::check_rule::{CheckRule, check_graph};
pub use crate::cli::{Cli, Commands, OutputFormat};
pub use crate::graph_rule::GraphRule;
pub use crate::reporting::{CheckReport, CouplingReport};

// Error exports
pub use crate::error::{ImportMapsError, Result};

// CI report exports
pub use crate::ci_report::{Finding, Severity, ToFindings, to_junit, to_sarif};
pub use crate::cli_report::render_summary_line;
