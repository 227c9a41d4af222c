//! Error types for importmaps.
//!
//! Configuration and pattern problems are detected eagerly, before any graph
//! is validated, and surface as one of the variants below. The analysis
//! phase itself (validation, coupling metrics, thresholds) cannot fail.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// The main error type for importmaps operations.
#[derive(Debug)]
pub enum ImportMapsError {
    /// The configuration could not be parsed or holds an invalid value.
    ConfigError {
        /// Description of the configuration issue.
        message: String,
        /// The config file path, if applicable.
        path: Option<PathBuf>,
        /// The underlying error.
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A rule pattern is not a valid regular expression.
    InvalidPattern {
        /// The pattern text as written in the configuration.
        pattern: String,
        /// Where the pattern lives, e.g. `forbidden[1].imports[0]`.
        location: String,
        /// The regex compiler's complaint.
        source: regex::Error,
    },

    /// The validation mode is neither `forbidden` nor `allowed`.
    InvalidMode {
        /// The rejected value.
        value: String,
    },

    /// The output format name is not recognised.
    InvalidFormat {
        /// The rejected value.
        value: String,
    },

    /// A graph file or source file could not be parsed.
    ParseError {
        /// The file that failed to parse.
        file: Option<PathBuf>,
        /// Context about what was being parsed.
        context: String,
        /// The underlying error.
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An error occurred during file system operations.
    IoError {
        /// The operation being performed.
        operation: String,
        /// The path involved in the error.
        path: Option<PathBuf>,
        /// The underlying IO error.
        source: Option<io::Error>,
    },

    /// An invalid argument or input.
    InvalidInput {
        /// Description of the invalid input.
        message: String,
        /// The argument or value that was invalid.
        argument: Option<String>,
    },
}

impl ImportMapsError {
    /// Creates a new `ConfigError` with the given message.
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
            path: None,
            source: None,
        }
    }

    /// Creates a new `ConfigError` for a config file that failed to
    /// deserialize.
    pub fn config_error_in_file(
        message: impl Into<String>,
        path: PathBuf,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::ConfigError {
            message: message.into(),
            path: Some(path),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a new `InvalidPattern` error.
    ///
    /// # Examples
    /// ```
    /// use importmaps_core::error::ImportMapsError;
    ///
    /// let source = regex::Regex::new("(").unwrap_err();
    /// let err = ImportMapsError::invalid_pattern("(", "forbidden[0].source", source);
    /// assert!(err.to_string().contains("forbidden[0].source"));
    /// ```
    pub fn invalid_pattern(
        pattern: impl Into<String>,
        location: impl Into<String>,
        source: regex::Error,
    ) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            location: location.into(),
            source,
        }
    }

    /// Creates a new `InvalidMode` error.
    pub fn invalid_mode(value: impl Into<String>) -> Self {
        Self::InvalidMode {
            value: value.into(),
        }
    }

    /// Creates a new `InvalidFormat` error.
    pub fn invalid_format(value: impl Into<String>) -> Self {
        Self::InvalidFormat {
            value: value.into(),
        }
    }

    /// Creates a new `ParseError` with the given context.
    pub fn parse_error(context: impl Into<String>) -> Self {
        Self::ParseError {
            file: None,
            context: context.into(),
            source: None,
        }
    }

    /// Creates a new `IoError` with a path and underlying error.
    pub fn io_error_with_source(
        operation: impl Into<String>,
        path: PathBuf,
        source: io::Error,
    ) -> Self {
        Self::IoError {
            operation: operation.into(),
            path: Some(path),
            source: Some(source),
        }
    }

    /// Creates a new `InvalidInput` error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
            argument: None,
        }
    }

    /// Creates a new `InvalidInput` error naming the offending argument.
    pub fn invalid_input_with_arg(message: impl Into<String>, argument: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
            argument: Some(argument.into()),
        }
    }

    /// Attaches a file path to a `ConfigError` or `ParseError` that lacks one.
    pub fn with_path(self, new_path: PathBuf) -> Self {
        match self {
            Self::ConfigError {
                message,
                path: None,
                source,
            } => Self::ConfigError {
                message,
                path: Some(new_path),
                source,
            },
            Self::ParseError {
                file: None,
                context,
                source,
            } => Self::ParseError {
                file: Some(new_path),
                context,
                source,
            },
            other => other,
        }
    }

    /// Returns the name of the error variant.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ConfigError { .. } => "ConfigError",
            Self::InvalidPattern { .. } => "InvalidPattern",
            Self::InvalidMode { .. } => "InvalidMode",
            Self::InvalidFormat { .. } => "InvalidFormat",
            Self::ParseError { .. } => "ParseError",
            Self::IoError { .. } => "IoError",
            Self::InvalidInput { .. } => "InvalidInput",
        }
    }

    /// Returns suggested recovery actions for the error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::ConfigError { .. } => vec![
                "Check the configuration file syntax".to_string(),
                "Verify every rule has a `source` and an `imports` list".to_string(),
                "Instability thresholds must lie between 0.0 and 1.0".to_string(),
            ],
            Self::InvalidPattern { location, .. } => vec![
                format!("Fix the regular expression at {}", location),
                "Escape literal dots and slashes where needed".to_string(),
            ],
            Self::InvalidMode { .. } => {
                vec!["Use `forbidden` or `allowed` as the check mode".to_string()]
            }
            Self::InvalidFormat { .. } => vec![
                "Use one of: text, mermaid, graphviz, html, json, yaml, table, sarif, junit"
                    .to_string(),
            ],
            Self::ParseError { file, .. } => {
                let mut s = vec!["Check that the input is well-formed".to_string()];
                if file.is_some() {
                    s.push(
                        "Graph files must map module names to lists of imported module names"
                            .to_string(),
                    );
                }
                s
            }
            Self::IoError { .. } => vec![
                "Check that the path exists and is accessible".to_string(),
                "Verify you have the necessary permissions".to_string(),
            ],
            Self::InvalidInput { .. } => vec![
                "Review the command-line arguments".to_string(),
                "Pass a crate directory or a .json/.yaml graph file".to_string(),
            ],
        }
    }
}

impl fmt::Display for ImportMapsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigError { message, path, .. } => {
                if let Some(p) = path {
                    write!(f, "Configuration error in '{}': {}", p.display(), message)
                } else {
                    write!(f, "Configuration error: {}", message)
                }
            }
            Self::InvalidPattern {
                pattern,
                location,
                source,
            } => write!(
                f,
                "Invalid pattern `{}` at {}: {}",
                pattern, location, source
            ),
            Self::InvalidMode { value } => {
                write!(f, "Invalid mode '{}': expected forbidden or allowed", value)
            }
            Self::InvalidFormat { value } => write!(f, "Unsupported format '{}'", value),
            Self::ParseError { file, context, .. } => {
                if let Some(file) = file {
                    write!(f, "Parse error in '{}': {}", file.display(), context)
                } else {
                    write!(f, "Parse error: {}", context)
                }
            }
            Self::IoError {
                operation, path, ..
            } => {
                if let Some(p) = path {
                    write!(
                        f,
                        "IO error during '{}' at '{}': operation failed",
                        operation,
                        p.display()
                    )
                } else {
                    write!(f, "IO error during '{}': operation failed", operation)
                }
            }
            Self::InvalidInput { message, argument } => {
                if let Some(arg) = argument {
                    write!(f, "Invalid input '{}': {}", arg, message)
                } else {
                    write!(f, "Invalid input: {}", message)
                }
            }
        }
    }
}

impl std::error::Error for ImportMapsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ConfigError { source, .. } => source.as_ref().map(|s| s.as_ref() as _),
            Self::InvalidPattern { source, .. } => Some(source),
            Self::ParseError { source, .. } => source.as_ref().map(|s| s.as_ref() as _),
            Self::IoError { source, .. } => source.as_ref().map(|e| e as _),
            Self::InvalidMode { .. } | Self::InvalidFormat { .. } | Self::InvalidInput { .. } => {
                None
            }
        }
    }
}

impl From<io::Error> for ImportMapsError {
    fn from(err: io::Error) -> Self {
        Self::IoError {
            operation: "file operation".to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl From<toml::de::Error> for ImportMapsError {
    fn from(err: toml::de::Error) -> Self {
        Self::ConfigError {
            message: format!("Failed to parse TOML: {}", err),
            path: None,
            source: Some(Box::new(err)),
        }
    }
}

impl From<serde_yaml::Error> for ImportMapsError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::ParseError {
            file: None,
            context: format!("Failed to parse/serialize YAML: {}", err),
            source: Some(Box::new(err)),
        }
    }
}

impl From<serde_json::Error> for ImportMapsError {
    fn from(err: serde_json::Error) -> Self {
        Self::ParseError {
            file: None,
            context: format!("Failed to parse/serialize JSON: {}", err),
            source: Some(Box::new(err)),
        }
    }
}

impl From<syn::Error> for ImportMapsError {
    fn from(err: syn::Error) -> Self {
        Self::ParseError {
            file: None,
            context: format!("Failed to parse Rust source: {}", err),
            source: Some(Box::new(err)),
        }
    }
}

impl From<walkdir::Error> for ImportMapsError {
    fn from(err: walkdir::Error) -> Self {
        Self::IoError {
            operation: "directory traversal".to_string(),
            path: err.path().map(PathBuf::from),
            source: None,
        }
    }
}

/// A type alias for `Result<T, ImportMapsError>`.
pub type Result<T> = std::result::Result<T, ImportMapsError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn regex_error(pattern: &str) -> regex::Error {
        match regex::Regex::new(pattern) {
            Ok(_) => panic!("Expected `{}` to be rejected", pattern),
            Err(e) => e,
        }
    }

    #[test]
    fn test_config_error_creates_basic_error() {
        let err = ImportMapsError::config_error("invalid format");
        assert!(matches!(err, ImportMapsError::ConfigError { .. }));
        assert_eq!(err.name(), "ConfigError");
    }

    #[test]
    fn test_invalid_pattern_display_names_pattern_and_location() {
        let err =
            ImportMapsError::invalid_pattern("a(b", "allowed[2].imports[1]", regex_error("a(b"));
        let display = err.to_string();
        assert!(display.contains("a(b"), "should mention the pattern");
        assert!(
            display.contains("allowed[2].imports[1]"),
            "should mention where the pattern lives"
        );
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_invalid_mode_display_lists_accepted_modes() {
        let err = ImportMapsError::invalid_mode("strict");
        let display = err.to_string();
        assert!(display.contains("strict"));
        assert!(display.contains("forbidden"));
        assert!(display.contains("allowed"));
        assert_eq!(err.name(), "InvalidMode");
    }

    #[test]
    fn test_with_path_fills_missing_config_path() {
        let err = ImportMapsError::config_error("bad").with_path(PathBuf::from("/x/.importmaps.toml"));
        assert!(
            matches!(err, ImportMapsError::ConfigError { path: Some(ref p), .. } if p.ends_with(".importmaps.toml"))
        );
    }

    #[test]
    fn test_with_path_keeps_existing_path() {
        let yaml_err = serde_yaml::from_str::<serde_yaml::Value>("a: [").unwrap_err();
        let err = ImportMapsError::config_error_in_file("bad", PathBuf::from("/first"), yaml_err)
            .with_path(PathBuf::from("/second"));
        assert!(matches!(err, ImportMapsError::ConfigError { path: Some(ref p), .. } if p == &PathBuf::from("/first")));
    }

    #[test]
    fn test_config_error_in_file_keeps_source_and_path() {
        let yaml_err = serde_yaml::from_str::<serde_yaml::Value>("a: [").unwrap_err();
        let err = ImportMapsError::config_error_in_file(
            "Failed to parse YAML",
            PathBuf::from("/repo/.importmaps.yaml"),
            yaml_err,
        );
        assert!(err.to_string().contains("/repo/.importmaps.yaml"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_display_io_error_with_path() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "not found");
        let err = ImportMapsError::io_error_with_source("read", PathBuf::from("/g.json"), io_err);
        let display = err.to_string();
        assert!(display.contains("IO error"));
        assert!(display.contains("g.json"));
    }

    #[test]
    fn test_display_invalid_input_with_argument() {
        let err = ImportMapsError::invalid_input_with_arg("not a graph", "/bad/path");
        let display = err.to_string();
        assert!(display.contains("Invalid input"));
        assert!(display.contains("/bad/path"));
    }

    #[test]
    fn test_suggestions_invalid_pattern_mentions_location() {
        let err = ImportMapsError::invalid_pattern("(", "forbidden[0].source", regex_error("("));
        assert!(
            err.suggestions()
                .iter()
                .any(|s| s.contains("forbidden[0].source"))
        );
    }

    #[test]
    fn test_every_variant_has_suggestions() {
        let errors = vec![
            ImportMapsError::config_error("x"),
            ImportMapsError::invalid_pattern("(", "loc", regex_error("(")),
            ImportMapsError::invalid_mode("x"),
            ImportMapsError::invalid_format("x"),
            ImportMapsError::parse_error("x"),
            ImportMapsError::from(io::Error::other("x")),
            ImportMapsError::invalid_input("x"),
        ];
        for err in errors {
            assert!(
                !err.suggestions().is_empty(),
                "{} should carry suggestions",
                err.name()
            );
        }
    }

    #[test]
    fn test_from_toml_de_error_creates_config_error() {
        let toml_err = toml::from_str::<toml::Value>("invalid = [unclosed").unwrap_err();
        let err: ImportMapsError = toml_err.into();
        assert!(matches!(err, ImportMapsError::ConfigError { .. }));
        assert!(err.to_string().contains("TOML"));
    }

    #[test]
    fn test_from_serde_json_error_creates_parse_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{invalid}").unwrap_err();
        let err: ImportMapsError = json_err.into();
        assert!(matches!(err, ImportMapsError::ParseError { .. }));
        assert!(err.to_string().contains("JSON"));
    }

    #[test]
    fn test_from_serde_yaml_error_creates_parse_error() {
        let yaml_err = serde_yaml::from_str::<serde_yaml::Value>("a: [b").unwrap_err();
        let err: ImportMapsError = yaml_err.into();
        assert!(matches!(err, ImportMapsError::ParseError { .. }));
        assert!(err.to_string().contains("YAML"));
    }

    #[test]
    fn test_from_syn_error_creates_parse_error() {
        let syn_err = match syn::parse_str::<syn::File>("fn invalid {") {
            Ok(_) => panic!("Expected syn error"),
            Err(e) => e,
        };
        let err: ImportMapsError = syn_err.into();
        assert!(matches!(err, ImportMapsError::ParseError { .. }));
        assert!(err.to_string().contains("Rust source"));
    }
}
