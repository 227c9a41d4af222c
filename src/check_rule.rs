use crate::ci_report::ToFindings;
use crate::cli_report::render_summary_line;
use crate::config::CheckSettings;
use crate::coupling::calculate_coupling;
use crate::error::Result;
use crate::file_utils::write_output;
use crate::graph::{Graph, load_graph};
use crate::reporting::{CheckReport, CouplingReport};
use crate::rule::{Rule, Verdict};
use crate::thresholds::{evaluate, warnings};

/// Validates an import graph against the configured rules and, when enabled,
/// the coupling thresholds.
#[derive(Debug, Default)]
pub struct CheckRule;

impl CheckRule {
    pub fn new() -> Self {
        Self
    }
}

/// Runs validation and the optional coupling analysis on an in-memory graph.
pub fn check_graph(graph: Graph, settings: &CheckSettings) -> CheckReport {
    let violations = settings
        .rules
        .validate(&graph, settings.mode, &settings.stdlib);

    let coupling = settings.metrics.then(|| {
        let analysis = calculate_coupling(&graph);
        let coupling_violations = evaluate(&analysis, &settings.thresholds);
        let coupling_warnings = warnings(&analysis, &settings.thresholds);
        tracing::info!(
            nodes = analysis.len(),
            violations = coupling_violations.len(),
            warnings = coupling_warnings.len(),
            "Coupling analysis finished"
        );
        CouplingReport {
            thresholds: settings.thresholds,
            analysis,
            violations: coupling_violations,
            warnings: coupling_warnings,
        }
    });

    CheckReport {
        mode: Some(settings.mode),
        graph,
        violations,
        coupling,
    }
}

impl Rule for CheckRule {
    type Config = CheckSettings;
    type Data = CheckReport;

    fn name() -> &'static str {
        "check"
    }

    fn description() -> &'static str {
        "Validates import edges against forbidden/allowed rules and coupling thresholds"
    }

    #[tracing::instrument(level = "debug", skip_all, fields(path = %settings.path.display()))]
    fn analyze(&self, settings: &CheckSettings) -> Result<CheckReport> {
        let graph = load_graph(&settings.path)?;
        Ok(check_graph(graph, settings))
    }

    fn run(&self, settings: &CheckSettings) -> Result<Verdict> {
        let report = self.analyze(settings)?;

        let rendered = report.render(settings.format, settings.module_path.as_deref())?;
        write_output(&rendered, settings.output_file.as_deref())?;

        eprintln!("{}", render_summary_line(&report.to_findings()));
        Ok(Verdict::from_clean(report.is_clean()))
    }
}
