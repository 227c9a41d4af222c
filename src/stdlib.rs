//! Recognising standard/platform dependencies.
//!
//! Allowed-mode validation lets a rule implicitly permit imports of the
//! language's standard library. What counts as "standard" depends on the
//! ecosystem the graph was extracted from, so the validator only sees the
//! [`StandardDependency`] trait.

use crate::error::{ImportMapsError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Decides whether a node identifier names a standard dependency.
pub trait StandardDependency {
    fn is_standard(&self, id: &str) -> bool;
}

impl<F> StandardDependency for F
where
    F: Fn(&str) -> bool,
{
    fn is_standard(&self, id: &str) -> bool {
        self(id)
    }
}

const RUST_STD_ROOTS: &[&str] = &["std", "core", "alloc", "proc_macro", "test"];

/// Built-in standard-library conventions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Stdlib {
    /// `std`, `core`, `alloc`, `proc_macro` and `test`, plus their submodules.
    #[default]
    Rust,
    /// Import paths whose first element has no dot (`fmt`, `net/http`).
    Go,
    /// Nothing is standard.
    None,
}

impl StandardDependency for Stdlib {
    fn is_standard(&self, id: &str) -> bool {
        match self {
            Stdlib::Rust => {
                let root = id.split("::").next().unwrap_or(id);
                RUST_STD_ROOTS.contains(&root)
            }
            Stdlib::Go => {
                let first = id.split('/').next().unwrap_or(id);
                !first.is_empty() && !first.contains('.')
            }
            Stdlib::None => false,
        }
    }
}

impl fmt::Display for Stdlib {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stdlib::Rust => "rust",
            Stdlib::Go => "go",
            Stdlib::None => "none",
        })
    }
}

impl FromStr for Stdlib {
    type Err = ImportMapsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "rust" => Ok(Stdlib::Rust),
            "go" => Ok(Stdlib::Go),
            "none" => Ok(Stdlib::None),
            other => Err(ImportMapsError::config_error(format!(
                "Unknown stdlib '{}': expected rust, go or none",
                other
            ))),
        }
    }
}
