//! Command-line interface definitions.

use crate::error::ImportMapsError;
use crate::stdlib::Stdlib;
use crate::validate::Mode;
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Validate import graphs against architectural rules and measure coupling.
#[derive(Parser, Debug)]
#[command(name = "importmaps", version, about, long_about = None)]
pub struct Cli {
    /// Path to a configuration file. Defaults to the first importmaps.toml,
    /// .importmaps.toml, .importmaps.yaml or .importmaps.yml found walking up
    /// from the current directory.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate the import graph against the configured rules.
    Check(CheckArgs),
    /// Render the import graph without validating it.
    Graph(GraphArgs),
}

#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    /// A crate directory, or a .json/.yaml file mapping modules to their imports.
    pub path: PathBuf,

    /// Validation mode. Overrides `general.mode`.
    #[arg(long, value_enum)]
    pub mode: Option<Mode>,

    /// Output format. Overrides `general.format`.
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Compute coupling metrics and enforce the coupling thresholds.
    #[arg(long)]
    pub metrics: bool,

    /// Prefix stripped from node names in rendered output.
    #[arg(long, value_name = "PREFIX")]
    pub module_path: Option<String>,

    /// Which imports count as standard-library imports in allowed mode.
    #[arg(long, value_enum)]
    pub stdlib: Option<Stdlib>,

    /// Write the report to this file instead of stdout.
    #[arg(long, value_name = "FILE")]
    pub output_file: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct GraphArgs {
    /// A crate directory, or a .json/.yaml file mapping modules to their imports.
    pub path: PathBuf,

    /// Output format. Overrides `general.format`.
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Prefix stripped from node names in rendered output.
    #[arg(long, value_name = "PREFIX")]
    pub module_path: Option<String>,

    /// Write the report to this file instead of stdout.
    #[arg(long, value_name = "FILE")]
    pub output_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Plain text edge list and summary
    #[default]
    Text,
    /// Mermaid flowchart in a fenced block
    Mermaid,
    /// Graphviz DOT
    Graphviz,
    /// Standalone HTML report
    Html,
    Json,
    Yaml,
    /// Findings table
    Table,
    /// SARIF 2.1.0
    Sarif,
    /// JUnit XML
    Junit,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 9] = [
        OutputFormat::Text,
        OutputFormat::Mermaid,
        OutputFormat::Graphviz,
        OutputFormat::Html,
        OutputFormat::Json,
        OutputFormat::Yaml,
        OutputFormat::Table,
        OutputFormat::Sarif,
        OutputFormat::Junit,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Text => "text",
            OutputFormat::Mermaid => "mermaid",
            OutputFormat::Graphviz => "graphviz",
            OutputFormat::Html => "html",
            OutputFormat::Json => "json",
            OutputFormat::Yaml => "yaml",
            OutputFormat::Table => "table",
            OutputFormat::Sarif => "sarif",
            OutputFormat::Junit => "junit",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = ImportMapsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        OutputFormat::ALL
            .into_iter()
            .find(|f| f.as_str() == lower)
            .ok_or_else(|| ImportMapsError::invalid_format(s))
    }
}
