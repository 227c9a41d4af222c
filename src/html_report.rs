//! Standalone HTML rendering of a [`CheckReport`].

use crate::html_utils;
use crate::reporting::{CheckReport, mermaid_flowchart, shorten};
use crate::validate::Violation;
use maud::{Markup, html};

const COUPLING_EXPLANATIONS: [(&str, &str); 4] = [
    ("Ca (afferent coupling)", "Number of distinct nodes that import this node."),
    ("Ce (efferent coupling)", "Number of distinct nodes this node imports."),
    (
        "I (instability)",
        "Ce / (Ca + Ce). 0 means maximally stable, 1 maximally unstable. A node with no edges has instability 0.",
    ),
    (
        "Status",
        "high when any maximum is exceeded, medium when only a warning level is exceeded, low otherwise. Cells are coloured against the warning and maximum limits.",
    ),
];

/// Renders the report as a complete HTML page with summary cards, the
/// import graph as a mermaid diagram, and tables for violations and coupling.
pub fn render_html(report: &CheckReport, module_path: Option<&str>) -> String {
    let title = match report.mode {
        Some(mode) => format!("Import Check Report ({} mode)", mode),
        None => "Import Graph".to_string(),
    };

    let coupling_violations = report.coupling_violation_count();
    let cards = html! {
        div class="cards" {
            (html_utils::render_card("Nodes", report.graph.nodes().len(), false))
            (html_utils::render_card("Edges", report.graph.edge_count(), false))
            @if report.mode.is_some() {
                (html_utils::render_card("Violations", report.violations.len(), !report.violations.is_empty()))
            }
            @if report.coupling.is_some() {
                (html_utils::render_card("Coupling Violations", coupling_violations, coupling_violations > 0))
            }
        }
    };

    let diagram = html! {
        h2 { "Import Graph" }
        div class="diagram" {
            pre class="mermaid" { (mermaid_flowchart(report, module_path)) }
        }
    };

    let body_content = html! {
        (cards)
        (diagram)
        @if report.mode.is_some() {
            (violations_table(&report.violations, module_path))
        }
        @if report.coupling.is_some() {
            (coupling_table(report, module_path))
            (html_utils::render_metric_explanation_list(&COUPLING_EXPLANATIONS))
        }
    };

    html_utils::render_html_doc(&title, body_content)
}

fn violations_table(violations: &[Violation], module_path: Option<&str>) -> Markup {
    let mut sorted: Vec<&Violation> = violations.iter().collect();
    sorted.sort();

    html! {
        h2 { "Violations" }
        @if sorted.is_empty() {
            p style="color: green; text-align: center;" { "No violations." }
        } @else {
            table class="sortable-table" {
                thead {
                    tr {
                        th class="sortable-header" data-column-index="0" data-sort-type="string" { "Source" }
                        th class="sortable-header" data-column-index="1" data-sort-type="string" { "Import" }
                        th class="sortable-header" data-column-index="2" data-sort-type="string" { "Message" }
                    }
                }
                tbody {
                    @for v in sorted {
                        tr {
                            td { (shorten(&v.source, module_path)) }
                            td { (shorten(&v.import, module_path)) }
                            td { (v.message) }
                        }
                    }
                }
            }
        }
    }
}

fn coupling_table(report: &CheckReport, module_path: Option<&str>) -> Markup {
    let Some(coupling) = &report.coupling else {
        return html! {};
    };
    let t = &coupling.thresholds;

    html! {
        h2 { "Coupling" }
        table class="sortable-table" {
            caption {
                (format!(
                    "Max Ca {}, max Ce {}, max I {:.2}",
                    t.max_afferent, t.max_efferent, t.max_instability
                ))
            }
            thead {
                tr {
                    th class="sortable-header" data-column-index="0" data-sort-type="string" { "Node" }
                    th class="sortable-header" data-column-index="1" data-sort-type="number" { "Ca" }
                    th class="sortable-header" data-column-index="2" data-sort-type="number" { "Ce" }
                    th class="sortable-header" data-column-index="3" data-sort-type="number" { "I" }
                    th class="sortable-header" data-column-index="4" data-sort-type="string" { "Status" }
                }
            }
            tbody {
                @for (node, m) in coupling.analysis.iter() {
                    tr {
                        td { (shorten(node, module_path)) }
                        td style=(html_utils::get_cell_style(m.afferent as f64, t.warn_afferent as f64, t.max_afferent as f64)) {
                            (m.afferent)
                        }
                        td style=(html_utils::get_cell_style(m.efferent as f64, t.warn_efferent as f64, t.max_efferent as f64)) {
                            (m.efferent)
                        }
                        td style=(html_utils::get_cell_style(m.instability, t.warn_instability, t.max_instability)) {
                            (format!("{:.2}", m.instability))
                        }
                        td { (t.level(m).as_str()) }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coupling::calculate_coupling;
    use crate::graph::Graph;
    use crate::reporting::CouplingReport;
    use crate::thresholds::{Thresholds, evaluate, warnings};
    use crate::validate::Mode;

    fn graph() -> Graph {
        Graph::from_edges([("app/api", vec!["app/db"]), ("app/db", vec![])])
    }

    #[test]
    fn test_graph_only_page_has_diagram_but_no_tables() {
        let html = render_html(&CheckReport::graph_only(graph()), Some("app"));

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Import Graph</title>"));
        assert!(html.contains("<pre class=\"mermaid\">graph TD"));
        assert!(html.contains("n0[&quot;api&quot;]"));
        assert!(!html.contains("<h2>Violations</h2>"));
        assert!(!html.contains("<h2>Coupling</h2>"));
    }

    #[test]
    fn test_violations_are_listed() {
        let report = CheckReport {
            mode: Some(Mode::Allowed),
            graph: graph(),
            violations: vec![Violation {
                source: "app/api".to_string(),
                import: "app/db".to_string(),
                pattern: None,
                message: "app/api imports app/db, but no allowed rule matched".to_string(),
            }],
            coupling: None,
        };
        let html = render_html(&report, Some("app"));

        assert!(html.contains("Import Check Report (allowed mode)"));
        assert!(html.contains("card bad"));
        assert!(html.contains("<td>api</td><td>db</td>"));
        assert!(html.contains("but no allowed rule matched"));
    }

    #[test]
    fn test_clean_check_says_so() {
        let report = CheckReport {
            mode: Some(Mode::Forbidden),
            graph: graph(),
            violations: Vec::new(),
            coupling: None,
        };
        let html = render_html(&report, None);
        assert!(html.contains("No violations."));
        assert!(!html.contains("card bad"));
    }

    #[test]
    fn test_coupling_table_colours_cells() {
        let g = graph();
        let analysis = calculate_coupling(&g);
        let thresholds = Thresholds::default();
        let report = CheckReport {
            mode: Some(Mode::Forbidden),
            coupling: Some(CouplingReport {
                violations: evaluate(&analysis, &thresholds),
                warnings: warnings(&analysis, &thresholds),
                analysis,
                thresholds,
            }),
            graph: g,
            violations: Vec::new(),
        };
        let html = render_html(&report, Some("app"));

        assert!(html.contains("<h2>Coupling</h2>"));
        assert!(html.contains("Coupling Violations"));
        // api has I = 1.00, above the default maximum of 0.80.
        assert!(html.contains("style=\"background-color: hsl(0, 100%, 80%);\">1.00</td>"));
        assert!(html.contains("<td>high</td>"));
        assert!(html.contains("Metric Explanations"));
    }
}
