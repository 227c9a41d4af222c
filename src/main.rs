//! `importmaps`: validate import graphs against architectural rules.
//!
//! Exits with status 1 when a check finds rule or coupling violations, or
//! when the run itself fails.

use clap::Parser;
use color_eyre::eyre::Result;
use importmaps_core::check_rule::CheckRule;
use importmaps_core::cli::{Cli, Commands};
use importmaps_core::config::{load_config, merge_check_args, merge_graph_args};
use importmaps_core::graph_rule::GraphRule;
use importmaps_core::rule::{Rule, Verdict};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;
    tracing::debug!(?cli, "Parsed CLI arguments");

    match run(&cli) {
        Ok(Verdict::Pass) => Ok(ExitCode::SUCCESS),
        Ok(Verdict::Fail) => Ok(ExitCode::FAILURE),
        Err(err) => {
            for suggestion in err.suggestions() {
                eprintln!("hint: {}", suggestion);
            }
            Err(err.into())
        }
    }
}

/// Logs go to stderr so rendered reports on stdout stay machine-readable.
/// `-v` flags take precedence over `RUST_LOG`.
fn init_tracing(verbose: u8) -> Result<()> {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn run(cli: &Cli) -> importmaps_core::Result<Verdict> {
    let (_, config) = load_config(cli.config.as_deref())?;

    match &cli.command {
        Commands::Check(args) => {
            let settings = merge_check_args(args, &config)?;
            tracing::info!(mode = %settings.mode, format = %settings.format, "Running check");
            CheckRule::new().run(&settings)
        }
        Commands::Graph(args) => {
            let settings = merge_graph_args(args, &config)?;
            GraphRule::new().run(&settings)
        }
    }
}
