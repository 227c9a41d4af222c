use crate::config::GraphSettings;
use crate::error::Result;
use crate::file_utils::write_output;
use crate::graph::{Graph, load_graph};
use crate::reporting::CheckReport;
use crate::rule::{Rule, Verdict};

/// Renders an import graph without validating it.
#[derive(Debug, Default)]
pub struct GraphRule;

impl GraphRule {
    pub fn new() -> Self {
        Self
    }
}

impl Rule for GraphRule {
    type Config = GraphSettings;
    type Data = Graph;

    fn name() -> &'static str {
        "graph"
    }

    fn description() -> &'static str {
        "Renders the import graph"
    }

    #[tracing::instrument(level = "debug", skip_all, fields(path = %settings.path.display()))]
    fn analyze(&self, settings: &GraphSettings) -> Result<Graph> {
        load_graph(&settings.path)
    }

    fn run(&self, settings: &GraphSettings) -> Result<Verdict> {
        let report = CheckReport::graph_only(self.analyze(settings)?);
        let rendered = report.render(settings.format, settings.module_path.as_deref())?;
        write_output(&rendered, settings.output_file.as_deref())?;
        Ok(Verdict::Pass)
    }
}
