//! Compiled rule patterns.
//!
//! Patterns are regular expressions matched anywhere in a node identifier
//! (anchor with `^`/`$` for whole-identifier matches). They are compiled once
//! when the configuration is loaded; matching afterwards cannot fail.

use crate::error::{ImportMapsError, Result};
use regex::Regex;
use std::fmt;

/// A regular expression together with the text it was compiled from.
#[derive(Debug, Clone)]
pub struct Pattern {
    regex: Regex,
}

impl Pattern {
    /// Compiles `pattern`; `location` names the configuration slot it came
    /// from and is reported back on failure.
    pub fn compile(pattern: &str, location: impl Into<String>) -> Result<Self> {
        Regex::new(pattern)
            .map(|regex| Self { regex })
            .map_err(|e| ImportMapsError::invalid_pattern(pattern, location, e))
    }

    /// Whether the pattern matches somewhere in `id`.
    pub fn is_match(&self, id: &str) -> bool {
        self.regex.is_match(id)
    }

    /// The pattern text as written in the configuration.
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A compiled import rule.
#[derive(Debug, Clone)]
pub struct Rule {
    source: Pattern,
    imports: Vec<Pattern>,
    allow_stdlib: Option<bool>,
}

impl Rule {
    /// Compiles a rule. `location` is the rule's slot, such as `forbidden[3]`;
    /// individual patterns are reported as `<location>.source` and
    /// `<location>.imports[i]`.
    pub fn compile<S: AsRef<str>>(
        source: &str,
        imports: &[S],
        allow_stdlib: Option<bool>,
        location: &str,
    ) -> Result<Self> {
        let source = Pattern::compile(source, format!("{}.source", location))?;
        let imports = imports
            .iter()
            .enumerate()
            .map(|(i, p)| Pattern::compile(p.as_ref(), format!("{}.imports[{}]", location, i)))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            source,
            imports,
            allow_stdlib,
        })
    }

    /// Whether this rule applies to edges leaving `source`.
    pub fn applies_to(&self, source: &str) -> bool {
        self.source.is_match(source)
    }

    /// Every import pattern matching `target`, in declaration order.
    pub fn matching_imports<'a>(&'a self, target: &'a str) -> impl Iterator<Item = &'a Pattern> {
        self.imports.iter().filter(move |p| p.is_match(target))
    }

    /// Whether any import pattern matches `target`.
    pub fn permits(&self, target: &str) -> bool {
        self.imports.iter().any(|p| p.is_match(target))
    }

    /// Whether standard dependencies pass this rule implicitly. Unset means yes.
    pub fn allows_stdlib(&self) -> bool {
        self.allow_stdlib.unwrap_or(true)
    }

    pub fn source_pattern(&self) -> &Pattern {
        &self.source
    }

    pub fn import_patterns(&self) -> &[Pattern] {
        &self.imports
    }
}
