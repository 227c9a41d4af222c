//! Configuration file support for importmaps.
//!
//! Configuration is read from TOML or YAML and merged with command-line
//! arguments. CLI arguments take precedence over config file values, which
//! take precedence over built-in defaults.
//!
//! ```toml
//! [general]
//! mode = "allowed"
//! module_path = "crate"
//!
//! [[allowed]]
//! source = "^crate::api"
//! imports = ["^crate::domain", "^serde$"]
//!
//! [metrics]
//! enabled = true
//!
//! [metrics.coupling]
//! max_efferent = 12
//! ```

use crate::cli::{CheckArgs, GraphArgs, OutputFormat};
use crate::error::{ImportMapsError, Result};
use crate::matcher::Rule;
use crate::stdlib::Stdlib;
use crate::thresholds::{Thresholds, ThresholdsConfig};
use crate::validate::{Mode, Ruleset};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration file names searched for, in order, in each directory.
pub const DEFAULT_CONFIG_FILES: &[&str] = &[
    "importmaps.toml",
    ".importmaps.toml",
    ".importmaps.yaml",
    ".importmaps.yml",
];

/// A parsed configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImportMapsConfig {
    /// Settings shared by every command.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Rules checked in forbidden mode, in declaration order.
    #[serde(default)]
    pub forbidden: Vec<RuleConfig>,

    /// Rules checked in allowed mode, in declaration order.
    #[serde(default)]
    pub allowed: Vec<RuleConfig>,

    #[serde(default)]
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeneralConfig {
    /// `forbidden` or `allowed`.
    pub mode: Option<String>,

    /// Output format name, see [`OutputFormat`].
    pub format: Option<String>,

    /// Prefix stripped from node names in rendered output.
    pub module_path: Option<String>,

    /// `rust`, `go` or `none`.
    pub stdlib: Option<String>,

    pub output_file: Option<PathBuf>,
}

/// One rule as written in the configuration. Patterns are compiled by
/// [`ImportMapsConfig::compile_rules`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleConfig {
    pub source: String,

    #[serde(default)]
    pub imports: Vec<String>,

    /// Whether standard dependencies are implicitly allowed. Allowed mode only;
    /// unset means yes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stdlib: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricsConfig {
    /// Compute coupling metrics on every check.
    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub coupling: ThresholdsConfig,
}

impl ImportMapsConfig {
    /// Compiles every rule, failing on the first malformed pattern.
    pub fn compile_rules(&self) -> Result<Ruleset> {
        let compile = |rules: &[RuleConfig], list: &str| -> Result<Vec<Rule>> {
            rules
                .iter()
                .enumerate()
                .map(|(i, r)| {
                    Rule::compile(&r.source, &r.imports, r.stdlib, &format!("{}[{}]", list, i))
                })
                .collect()
        };

        let ruleset = Ruleset::new(
            compile(&self.forbidden, "forbidden")?,
            compile(&self.allowed, "allowed")?,
        );
        tracing::debug!(
            forbidden = ruleset.forbidden.len(),
            allowed = ruleset.allowed.len(),
            "Compiled rules"
        );
        Ok(ruleset)
    }

    /// The configured mode, if any.
    pub fn mode(&self) -> Result<Option<Mode>> {
        self.general.mode.as_deref().map(str::parse).transpose()
    }

    pub fn format(&self) -> Result<Option<OutputFormat>> {
        self.general.format.as_deref().map(str::parse).transpose()
    }

    pub fn stdlib(&self) -> Result<Option<Stdlib>> {
        self.general.stdlib.as_deref().map(str::parse).transpose()
    }
}

/// Load configuration from a specific file path.
///
/// Returns `Ok(None)` if the file doesn't exist or cannot be read (with a
/// warning in the latter case), and an error if the file exists but is not a
/// valid configuration. Files ending in `.yaml`/`.yml` are read as YAML,
/// everything else as TOML.
pub fn load_config_from_path(path: &Path) -> Result<Option<ImportMapsConfig>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "Could not read config file, using defaults"
            );
            return Ok(None);
        }
    };

    let config: ImportMapsConfig = if crate::graph::is_yaml(path) {
        serde_yaml::from_str(&content).map_err(|e| {
            ImportMapsError::config_error_in_file(
                format!("Failed to parse YAML: {}", e),
                path.to_path_buf(),
                e,
            )
        })?
    } else {
        toml::from_str(&content).map_err(|e| ImportMapsError::from(e).with_path(path.to_path_buf()))?
    };

    Ok(Some(config))
}

/// Searches `start` and its ancestors for a config file and loads the first
/// one found.
pub fn discover_config_from(start: &Path) -> Result<Option<(PathBuf, ImportMapsConfig)>> {
    let mut current_dir = start.to_path_buf();

    loop {
        for config_name in DEFAULT_CONFIG_FILES {
            let config_path = current_dir.join(config_name);
            if let Some(config) = load_config_from_path(&config_path)? {
                return Ok(Some((config_path, config)));
            }
        }

        if !current_dir.pop() {
            break;
        }
    }

    Ok(None)
}

/// Discover and load configuration starting from the current directory.
pub fn discover_and_load_config() -> Result<Option<(PathBuf, ImportMapsConfig)>> {
    let current_dir = std::env::current_dir()?;
    discover_config_from(&current_dir)
}

/// Loads configuration from `config_path` if given, otherwise discovers it.
///
/// Always yields a configuration: when nothing is found the default
/// configuration is returned together with `None` for the path.
#[tracing::instrument(level = "debug", skip_all)]
pub fn load_config(config_path: Option<&Path>) -> Result<(Option<PathBuf>, ImportMapsConfig)> {
    let loaded = match config_path {
        Some(path) => {
            let loaded = load_config_from_path(path)?;
            if loaded.is_none() {
                tracing::warn!(path = %path.display(), "Config file not found, using defaults");
            }
            loaded.map(|config| (path.to_path_buf(), config))
        }
        None => discover_and_load_config()?,
    };

    match loaded {
        Some((path, config)) => {
            tracing::info!(path = %path.display(), "Loaded configuration");
            Ok((Some(path), config))
        }
        None => {
            tracing::debug!("No configuration file found, using defaults");
            Ok((None, ImportMapsConfig::default()))
        }
    }
}

/// Effective settings for `importmaps check`.
#[derive(Debug, Clone)]
pub struct CheckSettings {
    pub path: PathBuf,
    pub mode: Mode,
    pub format: OutputFormat,
    pub metrics: bool,
    pub module_path: Option<String>,
    pub stdlib: Stdlib,
    pub output_file: Option<PathBuf>,
    pub thresholds: Thresholds,
    pub rules: Ruleset,
}

/// Effective settings for `importmaps graph`.
#[derive(Debug, Clone)]
pub struct GraphSettings {
    pub path: PathBuf,
    pub format: OutputFormat,
    pub module_path: Option<String>,
    pub output_file: Option<PathBuf>,
}

/// Merge check CLI args with config file values.
///
/// Config strings are parsed and rules compiled here, so every configuration
/// problem surfaces before a graph is loaded. Thresholds are only resolved
/// (and checked) when metrics are enabled.
pub fn merge_check_args(cli_args: &CheckArgs, config: &ImportMapsConfig) -> Result<CheckSettings> {
    let mode = match cli_args.mode {
        Some(mode) => mode,
        None => config.mode()?.unwrap_or_default(),
    };
    let format = match cli_args.output {
        Some(format) => format,
        None => config.format()?.unwrap_or_default(),
    };
    let stdlib = match cli_args.stdlib {
        Some(stdlib) => stdlib,
        None => config.stdlib()?.unwrap_or_default(),
    };
    let metrics = cli_args.metrics || config.metrics.enabled;
    let thresholds = if metrics {
        config.metrics.coupling.resolve()?
    } else {
        Thresholds::default()
    };

    Ok(CheckSettings {
        path: cli_args.path.clone(),
        mode,
        format,
        metrics,
        module_path: cli_args
            .module_path
            .clone()
            .or_else(|| config.general.module_path.clone()),
        stdlib,
        output_file: cli_args
            .output_file
            .clone()
            .or_else(|| config.general.output_file.clone()),
        thresholds,
        rules: config.compile_rules()?,
    })
}

/// Merge graph CLI args with config file values.
pub fn merge_graph_args(cli_args: &GraphArgs, config: &ImportMapsConfig) -> Result<GraphSettings> {
    let format = match cli_args.output {
        Some(format) => format,
        None => config.format()?.unwrap_or_default(),
    };

    Ok(GraphSettings {
        path: cli_args.path.clone(),
        format,
        module_path: cli_args
            .module_path
            .clone()
            .or_else(|| config.general.module_path.clone()),
        output_file: cli_args
            .output_file
            .clone()
            .or_else(|| config.general.output_file.clone()),
    })
}
