//! CI/CD Platform-Friendly Report Generation
//!
//! Provides SARIF and JUnit XML output formats for CI/CD integration.
//!
//! # Overview
//!
//! Analysis results implement [`ToFindings`] to turn rule violations and
//! coupling results into a flat list of [`Finding`]s. Findings can then be
//! serialized to SARIF (GitHub code scanning) or JUnit XML (most CI test
//! report viewers), or printed as a terminal table by
//! [`crate::cli_report`].
//!
//! # Example
//!
//! ```rust
//! use importmaps_core::ci_report::{Finding, Severity, to_sarif, to_junit};
//!
//! let findings = vec![Finding {
//!     rule_id: "forbidden-import".to_string(),
//!     rule_name: "Forbidden Import".to_string(),
//!     severity: Severity::Error,
//!     message: "api imports store".to_string(),
//!     node: Some("api".to_string()),
//!     fingerprint: Some("forbidden-import:api->store".to_string()),
//! }];
//!
//! let sarif = to_sarif(&findings)?;
//! let junit = to_junit(&findings, "importmaps")?;
//! assert!(sarif.contains("forbidden-import"));
//! assert!(junit.contains("<failure"));
//! # Ok::<(), importmaps_core::error::ImportMapsError>(())
//! ```

use crate::error::{ImportMapsError, Result};
use serde::Serialize;
use std::collections::BTreeMap;

pub const RULE_FORBIDDEN_IMPORT: &str = "forbidden-import";
pub const RULE_UNALLOWED_IMPORT: &str = "unallowed-import";
pub const RULE_COUPLING_THRESHOLD: &str = "coupling-threshold";
pub const RULE_COUPLING_WARNING: &str = "coupling-warning";

/// Severity level for CI report findings.
///
/// Maps to CI platform conventions:
/// - **Error**: Fails the build (SARIF `error`, JUnit `<failure>`)
/// - **Warning**: Informational only (SARIF `warning`, JUnit `<system-out>`)
/// - **Note**: Informational (SARIF `note`, JUnit passed test)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl Severity {
    /// Returns the SARIF level string for this severity.
    #[must_use]
    pub const fn to_sarif_level(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Note => "note",
        }
    }

    /// Returns whether this severity should cause a CI failure.
    #[must_use]
    pub const fn is_error(self) -> bool {
        matches!(self, Self::Error)
    }
}

/// A single reportable result of a check.
#[derive(Debug, Clone, Serialize)]
pub struct Finding {
    /// Stable rule identifier, used as `ruleId` in SARIF output.
    pub rule_id: String,

    /// Human-readable name of the rule.
    pub rule_name: String,

    pub severity: Severity,

    pub message: String,

    /// The graph node the finding is about, if any.
    pub node: Option<String>,

    /// Stable fingerprint for deduplication across runs.
    /// Maps to SARIF `partialFingerprints`.
    pub fingerprint: Option<String>,
}

/// Trait for converting analysis results to CI findings.
pub trait ToFindings {
    fn to_findings(&self) -> Vec<Finding>;
}

/// Converts findings to SARIF v2.1.0 format.
///
/// # SARIF Format
///
/// - `tool.driver.name` = "importmaps"
/// - `tool.driver.rules[]` = de-duplicated rule IDs, sorted
/// - `results[]` = one entry per finding, in input order
/// - `results[].locations[].logicalLocations[]` = the node, if present
/// - `results[].partialFingerprints["primaryLocation"]` = finding's fingerprint
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn to_sarif(findings: &[Finding]) -> Result<String> {
    let mut unique_rules: BTreeMap<&str, SarifRule> = BTreeMap::new();
    for finding in findings {
        unique_rules
            .entry(finding.rule_id.as_str())
            .or_insert_with(|| SarifRule {
                id: finding.rule_id.clone(),
                name: finding.rule_name.clone(),
            });
    }

    let sarif_log = SarifLog {
        version: "2.1.0",
        schema: "https://json.schemastore.org/sarif-2.1.0.json",
        runs: vec![SarifRun {
            tool: SarifTool {
                driver: SarifDriver {
                    name: "importmaps".to_string(),
                    version: env!("CARGO_PKG_VERSION").to_string(),
                    rules: unique_rules.into_values().collect(),
                },
            },
            results: findings.iter().map(SarifResult::from_finding).collect(),
        }],
    };

    serde_json::to_string_pretty(&sarif_log)
        .map_err(|e| ImportMapsError::parse_error(format!("Failed to serialize SARIF: {}", e)))
}

/// Converts findings to JUnit XML format.
///
/// - Each finding becomes a `<testcase>`
/// - Error findings add a `<failure>` element
/// - Warning findings add a `<system-out>` element (test passes)
/// - Note findings produce passing tests
/// - Zero findings produce a single passing placeholder test
pub fn to_junit(findings: &[Finding], suite_name: &str) -> Result<String> {
    let testcase_count = findings.len().max(1);
    let failure_count = findings.iter().filter(|f| f.severity.is_error()).count();

    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>");
    xml.push_str(&format!(
        "<testsuites name=\"{}\" tests=\"{}\" failures=\"{}\" errors=\"0\" skipped=\"0\">",
        escape_xml(suite_name),
        testcase_count,
        failure_count
    ));
    xml.push_str(&format!(
        "<testsuite name=\"{}\" tests=\"{}\" failures=\"{}\" errors=\"0\" skipped=\"0\">",
        escape_xml(suite_name),
        testcase_count,
        failure_count
    ));

    if findings.is_empty() {
        xml.push_str(&format!(
            "<testcase name=\"{}\" classname=\"{}\"/>",
            escape_xml(suite_name),
            escape_xml(suite_name)
        ));
    }

    for finding in findings {
        let classname = format!("importmaps.{}", finding.rule_id);
        let testcase_name = truncate_testcase_name(&finding.message);

        xml.push_str(&format!(
            "<testcase name=\"{}\" classname=\"{}\"",
            escape_xml(&testcase_name),
            escape_xml(&classname)
        ));

        match finding.severity {
            Severity::Error => {
                xml.push_str(&format!(
                    "><failure message=\"{}\"></failure></testcase>",
                    escape_xml(&qualified_message(finding))
                ));
            }
            Severity::Warning => {
                xml.push_str(&format!(
                    "><system-out>{}</system-out></testcase>",
                    escape_xml(&qualified_message(finding))
                ));
            }
            Severity::Note => xml.push_str("/>"),
        }
    }

    xml.push_str("</testsuite></testsuites>");
    Ok(xml)
}

/// The message prefixed with its node, unless it already starts with it.
fn qualified_message(finding: &Finding) -> String {
    match &finding.node {
        Some(node) if !finding.message.starts_with(node.as_str()) => {
            format!("{}: {}", node, finding.message)
        }
        _ => finding.message.clone(),
    }
}

/// Escapes special XML characters.
pub(crate) fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// JUnit parsers may choke on very long test names.
fn truncate_testcase_name(name: &str) -> String {
    if name.chars().count() > 200 {
        let head: String = name.chars().take(197).collect();
        format!("{}...", head)
    } else {
        name.to_string()
    }
}

// SARIF types for serialization

#[derive(Debug, Serialize)]
struct SarifLog {
    version: &'static str,
    #[serde(rename = "$schema")]
    schema: &'static str,
    runs: Vec<SarifRun>,
}

#[derive(Debug, Serialize)]
struct SarifRun {
    tool: SarifTool,
    results: Vec<SarifResult>,
}

#[derive(Debug, Serialize)]
struct SarifTool {
    driver: SarifDriver,
}

#[derive(Debug, Serialize)]
struct SarifDriver {
    name: String,
    version: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    rules: Vec<SarifRule>,
}

#[derive(Debug, Serialize)]
struct SarifRule {
    id: String,
    name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifResult {
    rule_id: String,
    level: &'static str,
    message: SarifMessage,
    #[serde(skip_serializing_if = "Option::is_none")]
    locations: Option<Vec<SarifLocation>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    partial_fingerprints: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Serialize)]
struct SarifMessage {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifLocation {
    logical_locations: Vec<SarifLogicalLocation>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifLogicalLocation {
    fully_qualified_name: String,
    kind: &'static str,
}

impl SarifResult {
    fn from_finding(finding: &Finding) -> Self {
        let locations = finding.node.as_ref().map(|node| {
            vec![SarifLocation {
                logical_locations: vec![SarifLogicalLocation {
                    fully_qualified_name: node.clone(),
                    kind: "module",
                }],
            }]
        });

        let partial_fingerprints = finding.fingerprint.as_ref().map(|fp| {
            BTreeMap::from([("primaryLocation".to_string(), fp.clone())])
        });

        Self {
            rule_id: finding.rule_id.clone(),
            level: finding.severity.to_sarif_level(),
            message: SarifMessage {
                text: finding.message.clone(),
            },
            locations,
            partial_fingerprints,
        }
    }
}
