//! Coupling thresholds and their evaluation.
//!
//! A node whose metrics exceed any hard limit (strictly greater than) is a
//! coupling violation, with one reason per exceeded dimension. Warn limits
//! only sort nodes into the [`CouplingLevel::Medium`] bucket for reporting.

use crate::coupling::{CouplingAnalysis, CouplingMetrics};
use crate::error::{ImportMapsError, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_EFFERENT: usize = 10;
pub const DEFAULT_MAX_AFFERENT: usize = 15;
pub const DEFAULT_MAX_INSTABILITY: f64 = 0.8;
pub const DEFAULT_WARN_EFFERENT: usize = 7;
pub const DEFAULT_WARN_AFFERENT: usize = 10;
pub const DEFAULT_WARN_INSTABILITY: f64 = 0.6;

/// Threshold values as written in the configuration; anything left out
/// falls back to its default. An explicit `0` is a real limit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThresholdsConfig {
    pub max_efferent: Option<usize>,
    pub max_afferent: Option<usize>,
    pub max_instability: Option<f64>,
    pub warn_efferent: Option<usize>,
    pub warn_afferent: Option<usize>,
    pub warn_instability: Option<f64>,
}

impl ThresholdsConfig {
    /// Fills in defaults and checks the instability limits lie in `0.0..=1.0`.
    pub fn resolve(&self) -> Result<Thresholds> {
        let thresholds = Thresholds {
            max_efferent: self.max_efferent.unwrap_or(DEFAULT_MAX_EFFERENT),
            max_afferent: self.max_afferent.unwrap_or(DEFAULT_MAX_AFFERENT),
            max_instability: self.max_instability.unwrap_or(DEFAULT_MAX_INSTABILITY),
            warn_efferent: self.warn_efferent.unwrap_or(DEFAULT_WARN_EFFERENT),
            warn_afferent: self.warn_afferent.unwrap_or(DEFAULT_WARN_AFFERENT),
            warn_instability: self.warn_instability.unwrap_or(DEFAULT_WARN_INSTABILITY),
        };

        for (name, value) in [
            ("max_instability", thresholds.max_instability),
            ("warn_instability", thresholds.warn_instability),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ImportMapsError::config_error(format!(
                    "metrics.coupling.{} must be between 0.0 and 1.0, got {}",
                    name, value
                )));
            }
        }

        if thresholds.warn_efferent > thresholds.max_efferent {
            tracing::warn!(
                warn = thresholds.warn_efferent,
                max = thresholds.max_efferent,
                "warn_efferent is above max_efferent; the warning bucket will be empty"
            );
        }
        if thresholds.warn_afferent > thresholds.max_afferent {
            tracing::warn!(
                warn = thresholds.warn_afferent,
                max = thresholds.max_afferent,
                "warn_afferent is above max_afferent; the warning bucket will be empty"
            );
        }
        if thresholds.warn_instability > thresholds.max_instability {
            tracing::warn!(
                warn = thresholds.warn_instability,
                max = thresholds.max_instability,
                "warn_instability is above max_instability; the warning bucket will be empty"
            );
        }

        Ok(thresholds)
    }
}

/// Resolved coupling thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub max_efferent: usize,
    pub max_afferent: usize,
    pub max_instability: f64,
    pub warn_efferent: usize,
    pub warn_afferent: usize,
    pub warn_instability: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            max_efferent: DEFAULT_MAX_EFFERENT,
            max_afferent: DEFAULT_MAX_AFFERENT,
            max_instability: DEFAULT_MAX_INSTABILITY,
            warn_efferent: DEFAULT_WARN_EFFERENT,
            warn_afferent: DEFAULT_WARN_AFFERENT,
            warn_instability: DEFAULT_WARN_INSTABILITY,
        }
    }
}

/// Reporting bucket of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CouplingLevel {
    Low,
    Medium,
    High,
}

impl CouplingLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            CouplingLevel::Low => "low",
            CouplingLevel::Medium => "medium",
            CouplingLevel::High => "high",
        }
    }
}

impl Thresholds {
    /// One reason per hard limit `metrics` exceeds.
    pub fn violation_reasons(&self, metrics: &CouplingMetrics) -> Vec<String> {
        exceeded(
            metrics,
            self.max_efferent,
            self.max_afferent,
            self.max_instability,
            "maximum",
        )
    }

    /// One reason per warn limit `metrics` exceeds.
    pub fn warning_reasons(&self, metrics: &CouplingMetrics) -> Vec<String> {
        exceeded(
            metrics,
            self.warn_efferent,
            self.warn_afferent,
            self.warn_instability,
            "warning level",
        )
    }

    pub fn level(&self, metrics: &CouplingMetrics) -> CouplingLevel {
        if !self.violation_reasons(metrics).is_empty() {
            CouplingLevel::High
        } else if !self.warning_reasons(metrics).is_empty() {
            CouplingLevel::Medium
        } else {
            CouplingLevel::Low
        }
    }
}

fn exceeded(
    metrics: &CouplingMetrics,
    efferent: usize,
    afferent: usize,
    instability: f64,
    limit: &str,
) -> Vec<String> {
    let mut reasons = Vec::new();
    if metrics.efferent > efferent {
        reasons.push(format!(
            "efferent coupling {} exceeds {} {}",
            metrics.efferent, limit, efferent
        ));
    }
    if metrics.afferent > afferent {
        reasons.push(format!(
            "afferent coupling {} exceeds {} {}",
            metrics.afferent, limit, afferent
        ));
    }
    if metrics.instability > instability {
        reasons.push(format!(
            "instability {:.2} exceeds {} {:.2}",
            metrics.instability, limit, instability
        ));
    }
    reasons
}

/// A node exceeding at least one hard limit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CouplingViolation {
    pub package: String,
    pub metrics: CouplingMetrics,
    pub reasons: Vec<String>,
}

/// A node above a warn limit but within every hard limit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CouplingWarning {
    pub package: String,
    pub metrics: CouplingMetrics,
    pub reasons: Vec<String>,
}

/// Flags every node exceeding a hard limit, in node order.
pub fn evaluate(analysis: &CouplingAnalysis, thresholds: &Thresholds) -> Vec<CouplingViolation> {
    analysis
        .iter()
        .filter_map(|(package, metrics)| {
            let reasons = thresholds.violation_reasons(metrics);
            (!reasons.is_empty()).then(|| CouplingViolation {
                package: package.to_string(),
                metrics: *metrics,
                reasons,
            })
        })
        .collect()
}

/// Nodes in the [`CouplingLevel::Medium`] bucket, in node order. These never
/// fail a check.
pub fn warnings(analysis: &CouplingAnalysis, thresholds: &Thresholds) -> Vec<CouplingWarning> {
    analysis
        .iter()
        .filter(|(_, metrics)| thresholds.level(metrics) == CouplingLevel::Medium)
        .map(|(package, metrics)| CouplingWarning {
            package: package.to_string(),
            metrics: *metrics,
            reasons: thresholds.warning_reasons(metrics),
        })
        .collect()
}
