//! Rendering check results.
//!
//! Every renderer works on a [`CheckReport`] and emits nodes in sorted order
//! with sorted adjacency lists, so output only depends on graph content.
//! Node names are passed through [`shorten`] for display; serialized formats
//! (JSON, YAML, SARIF, JUnit) keep full identifiers.

use crate::ci_report::{
    self, Finding, RULE_COUPLING_THRESHOLD, RULE_COUPLING_WARNING, RULE_FORBIDDEN_IMPORT,
    RULE_UNALLOWED_IMPORT, Severity, ToFindings,
};
use crate::cli::OutputFormat;
use crate::cli_report;
use crate::coupling::CouplingAnalysis;
use crate::error::Result;
use crate::graph::Graph;
use crate::html_report;
use crate::thresholds::{CouplingViolation, CouplingWarning, Thresholds};
use crate::validate::{Mode, Violation};
use prettytable::{Cell, Row, Table, format};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt::Write as _;

/// Strips `module_path` and a following `/` or `::` from `id`.
///
/// Identifiers outside the prefix, and the prefix itself, are returned
/// unchanged.
///
/// ```
/// use importmaps_core::reporting::shorten;
///
/// assert_eq!(shorten("example.com/app/internal/db", Some("example.com/app")), "internal/db");
/// assert_eq!(shorten("crate::api", Some("crate")), "api");
/// assert_eq!(shorten("crate::api", Some("crate::")), "api");
/// assert_eq!(shorten("crate", Some("crate")), "crate");
/// assert_eq!(shorten("serde", Some("crate")), "serde");
/// ```
pub fn shorten<'a>(id: &'a str, module_path: Option<&str>) -> &'a str {
    let Some(prefix) = module_path.filter(|p| !p.is_empty()) else {
        return id;
    };
    let Some(rest) = id.strip_prefix(prefix) else {
        return id;
    };
    let prefix_has_separator = prefix.ends_with('/') || prefix.ends_with("::");
    let shortened = match rest.strip_prefix("::").or_else(|| rest.strip_prefix('/')) {
        Some(stripped) => stripped,
        None if prefix_has_separator => rest,
        // `crate_x` must not shorten against `crate`.
        None => return id,
    };
    if shortened.is_empty() { id } else { shortened }
}

/// Coupling results attached to a check.
#[derive(Debug, Clone, Serialize)]
pub struct CouplingReport {
    pub thresholds: Thresholds,
    pub analysis: CouplingAnalysis,
    pub violations: Vec<CouplingViolation>,
    pub warnings: Vec<CouplingWarning>,
}

/// Everything a run produced, ready for rendering.
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    /// `None` when the graph was rendered without validation.
    pub mode: Option<Mode>,
    pub graph: Graph,
    pub violations: Vec<Violation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupling: Option<CouplingReport>,
}

impl CheckReport {
    /// A report for an unvalidated graph.
    pub fn graph_only(graph: Graph) -> Self {
        Self {
            mode: None,
            graph,
            violations: Vec::new(),
            coupling: None,
        }
    }

    pub fn coupling_violation_count(&self) -> usize {
        self.coupling.as_ref().map_or(0, |c| c.violations.len())
    }

    /// Whether the check passes: no rule violations and no coupling
    /// violations. Coupling warnings do not count.
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty() && self.coupling_violation_count() == 0
    }

    /// Edges carrying at least one rule violation.
    pub fn violating_edges(&self) -> BTreeSet<(&str, &str)> {
        self.violations
            .iter()
            .map(|v| (v.source.as_str(), v.import.as_str()))
            .collect()
    }

    /// Nodes that are the source of at least one rule violation.
    pub fn violating_nodes(&self) -> BTreeSet<&str> {
        self.violations.iter().map(|v| v.source.as_str()).collect()
    }

    /// Renders the report in `format`.
    pub fn render(&self, format: OutputFormat, module_path: Option<&str>) -> Result<String> {
        match format {
            OutputFormat::Text => Ok(render_text(self, module_path)),
            OutputFormat::Mermaid => Ok(render_mermaid(self, module_path)),
            OutputFormat::Graphviz => Ok(render_graphviz(self, module_path)),
            OutputFormat::Html => Ok(html_report::render_html(self, module_path)),
            OutputFormat::Json => Ok(serde_json::to_string_pretty(self)?),
            OutputFormat::Yaml => Ok(serde_yaml::to_string(self)?),
            OutputFormat::Table => Ok(cli_report::render_cli_table(&self.to_findings())),
            OutputFormat::Sarif => ci_report::to_sarif(&self.to_findings()),
            OutputFormat::Junit => ci_report::to_junit(&self.to_findings(), "importmaps"),
        }
    }
}

impl ToFindings for CheckReport {
    fn to_findings(&self) -> Vec<Finding> {
        let (rule_id, rule_name) = match self.mode {
            Some(Mode::Allowed) => (RULE_UNALLOWED_IMPORT, "Unallowed Import"),
            _ => (RULE_FORBIDDEN_IMPORT, "Forbidden Import"),
        };

        let mut findings: Vec<Finding> = self
            .violations
            .iter()
            .map(|v| Finding {
                rule_id: rule_id.to_string(),
                rule_name: rule_name.to_string(),
                severity: Severity::Error,
                message: v.message.clone(),
                node: Some(v.source.clone()),
                fingerprint: Some(match &v.pattern {
                    Some(pattern) => format!("{}:{}->{}:{}", rule_id, v.source, v.import, pattern),
                    None => format!("{}:{}->{}", rule_id, v.source, v.import),
                }),
            })
            .collect();

        if let Some(coupling) = &self.coupling {
            findings.extend(coupling.violations.iter().map(|v| Finding {
                rule_id: RULE_COUPLING_THRESHOLD.to_string(),
                rule_name: "Coupling Threshold".to_string(),
                severity: Severity::Error,
                message: v.reasons.join("; "),
                node: Some(v.package.clone()),
                fingerprint: Some(format!("{}:{}", RULE_COUPLING_THRESHOLD, v.package)),
            }));
            findings.extend(coupling.warnings.iter().map(|w| Finding {
                rule_id: RULE_COUPLING_WARNING.to_string(),
                rule_name: "Coupling Warning".to_string(),
                severity: Severity::Warning,
                message: w.reasons.join("; "),
                node: Some(w.package.clone()),
                fingerprint: Some(format!("{}:{}", RULE_COUPLING_WARNING, w.package)),
            }));
        }

        findings
    }
}

/// Sorted, de-duplicated imports of each source.
fn sorted_adjacency(graph: &Graph) -> Vec<(&str, Vec<&str>)> {
    graph
        .iter()
        .map(|(source, imports)| {
            let targets: BTreeSet<&str> = imports.iter().map(String::as_str).collect();
            (source, targets.into_iter().collect())
        })
        .collect()
}

pub fn render_text(report: &CheckReport, module_path: Option<&str>) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Import graph:");
    for (source, targets) in sorted_adjacency(&report.graph) {
        for target in targets {
            let _ = writeln!(
                out,
                "  {} --> {}",
                shorten(source, module_path),
                shorten(target, module_path)
            );
        }
    }

    if let Some(mode) = report.mode {
        let _ = writeln!(out);
        if report.violations.is_empty() {
            let _ = writeln!(out, "No {} mode violations.", mode);
        } else {
            let _ = writeln!(
                out,
                "Violations ({}, {} mode):",
                report.violations.len(),
                mode
            );
            let mut violations: Vec<&Violation> = report.violations.iter().collect();
            violations.sort();
            for v in violations {
                let _ = writeln!(out, "  - {}", v.message);
            }
        }
    }

    if let Some(coupling) = &report.coupling {
        let _ = writeln!(out);
        let _ = writeln!(out, "Coupling:");
        out.push_str(&coupling_table(coupling, module_path));

        if !coupling.violations.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "Coupling Violations ({}):", coupling.violations.len());
            for v in &coupling.violations {
                let _ = writeln!(
                    out,
                    "  - {}: {}",
                    shorten(&v.package, module_path),
                    v.reasons.join("; ")
                );
            }
        }
    }

    out
}

fn coupling_table(coupling: &CouplingReport, module_path: Option<&str>) -> String {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BOX_CHARS);
    table.set_titles(Row::new(vec![
        Cell::new("Node"),
        Cell::new("Ca"),
        Cell::new("Ce"),
        Cell::new("I"),
        Cell::new("Status"),
    ]));
    for (node, metrics) in coupling.analysis.iter() {
        table.add_row(Row::new(vec![
            Cell::new(shorten(node, module_path)),
            Cell::new(&metrics.afferent.to_string()),
            Cell::new(&metrics.efferent.to_string()),
            Cell::new(&format!("{:.2}", metrics.instability)),
            Cell::new(coupling.thresholds.level(metrics).as_str()),
        ]));
    }
    table.to_string()
}

/// Mermaid node ids must be plain identifiers; labels go in quotes.
fn mermaid_label(label: &str) -> String {
    label.replace('"', "#quot;")
}

/// Renders the graph as the body of a mermaid flowchart, without fences.
pub fn mermaid_flowchart(report: &CheckReport, module_path: Option<&str>) -> String {
    let nodes: Vec<&str> = report.graph.nodes().into_iter().collect();
    let id_of = |node: &str| nodes.binary_search(&node).unwrap_or_default();
    let bad_edges = report.violating_edges();
    let bad_nodes = report.violating_nodes();

    let mut out = String::from("graph TD\n");
    for (i, node) in nodes.iter().enumerate() {
        let _ = writeln!(
            out,
            "    n{}[\"{}\"]",
            i,
            mermaid_label(shorten(node, module_path))
        );
    }

    let mut link = 0;
    let mut bad_links = Vec::new();
    for (source, targets) in sorted_adjacency(&report.graph) {
        for target in targets {
            if bad_edges.contains(&(source, target)) {
                let _ = writeln!(out, "    %% violation");
                bad_links.push(link);
            }
            let _ = writeln!(out, "    n{} --> n{}", id_of(source), id_of(target));
            link += 1;
        }
    }

    if !bad_nodes.is_empty() {
        let _ = writeln!(out, "    classDef violation fill:#fdd,stroke:#c00,stroke-width:2px");
        let ids: Vec<String> = bad_nodes.iter().map(|n| format!("n{}", id_of(*n))).collect();
        let _ = writeln!(out, "    class {} violation", ids.join(","));
    }
    for link in bad_links {
        let _ = writeln!(out, "    linkStyle {} stroke:#c00,stroke-width:2px", link);
    }

    out
}

pub fn render_mermaid(report: &CheckReport, module_path: Option<&str>) -> String {
    format!("```mermaid\n{}```\n", mermaid_flowchart(report, module_path))
}

fn dot_quote(id: &str) -> String {
    format!("\"{}\"", id.replace('\\', "\\\\").replace('"', "\\\""))
}

pub fn render_graphviz(report: &CheckReport, module_path: Option<&str>) -> String {
    let bad_edges = report.violating_edges();

    let mut out = String::from("digraph G {\n    rankdir=LR;\n    node [shape=box];\n");
    for (source, targets) in sorted_adjacency(&report.graph) {
        for target in targets {
            let edge = format!(
                "{} -> {}",
                dot_quote(shorten(source, module_path)),
                dot_quote(shorten(target, module_path))
            );
            if bad_edges.contains(&(source, target)) {
                let _ = writeln!(out, "    {} [color=red];", edge);
            } else {
                let _ = writeln!(out, "    {};", edge);
            }
        }
    }
    out.push_str("}\n");
    out
}
