//! CLI-friendly table output for check findings.
//!
//! Provides concise tables that show:
//! - What rule detected the issue
//! - Severity level (with color coding)
//! - The graph node involved
//! - The issue message

use crate::ci_report::{Finding, Severity};
use prettytable::{Attr, Cell, Row, Table, format};

/// Maximum width for the message column before truncation.
const MAX_MESSAGE_WIDTH: usize = 80;

#[must_use]
fn truncate_message(message: &str) -> String {
    if message.chars().count() > MAX_MESSAGE_WIDTH {
        let head: String = message.chars().take(MAX_MESSAGE_WIDTH - 3).collect();
        format!("{}...", head)
    } else {
        message.to_string()
    }
}

#[must_use]
const fn severity_label(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "ERR",
        Severity::Warning => "WARN",
        Severity::Note => "NOTE",
    }
}

const fn severity_rank(severity: Severity) -> u8 {
    match severity {
        Severity::Error => 0,
        Severity::Warning => 1,
        Severity::Note => 2,
    }
}

#[must_use]
const fn severity_color(severity: Severity) -> Attr {
    match severity {
        Severity::Error => Attr::ForegroundColor(prettytable::color::RED),
        Severity::Warning => Attr::ForegroundColor(prettytable::color::YELLOW),
        Severity::Note => Attr::ForegroundColor(prettytable::color::BLUE),
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}

/// Renders a single-line summary of findings.
///
/// # Example
///
/// ```rust
/// use importmaps_core::cli_report::render_summary_line;
/// use importmaps_core::ci_report::{Finding, Severity};
///
/// let findings = vec![Finding {
///     rule_id: "unallowed-import".to_string(),
///     rule_name: "Unallowed Import".to_string(),
///     severity: Severity::Error,
///     message: "a imports b, but no allowed rule matched".to_string(),
///     node: Some("a".to_string()),
///     fingerprint: None,
/// }];
///
/// assert_eq!(
///     render_summary_line(&findings),
///     "1 finding (1 error, 0 warnings, 0 notes)"
/// );
/// ```
#[must_use]
pub fn render_summary_line(findings: &[Finding]) -> String {
    let total = findings.len();
    let count = |s: Severity| findings.iter().filter(|f| f.severity == s).count();
    let errors = count(Severity::Error);
    let warnings = count(Severity::Warning);
    let notes = count(Severity::Note);

    format!(
        "{} finding{} ({} error{}, {} warning{}, {} note{})",
        total,
        plural(total),
        errors,
        plural(errors),
        warnings,
        plural(warnings),
        notes,
        plural(notes),
    )
}

/// Renders findings as a CLI table.
///
/// One row per finding, errors first, then warnings, then notes; within a
/// severity findings are ordered by rule and keep their input order. A bold
/// summary row closes a non-empty table.
#[must_use]
pub fn render_cli_table(findings: &[Finding]) -> String {
    let mut table = Table::new();
    table.set_format(
        format::FormatBuilder::new()
            .separator(
                format::LinePosition::Top,
                format::LineSeparator::new('─', '┬', '┌', '┐'),
            )
            .separator(
                format::LinePosition::Title,
                format::LineSeparator::new('═', '╪', '╞', '╡'),
            )
            .separator(
                format::LinePosition::Intern,
                format::LineSeparator::new('─', '┼', '├', '┤'),
            )
            .separator(
                format::LinePosition::Bottom,
                format::LineSeparator::new('─', '┴', '└', '┘'),
            )
            .padding(1, 1)
            .build(),
    );

    table.set_titles(Row::new(vec![
        Cell::new("Severity").with_style(Attr::Bold),
        Cell::new("Rule").with_style(Attr::Bold),
        Cell::new("Node").with_style(Attr::Bold),
        Cell::new("Issue").with_style(Attr::Bold),
    ]));

    let mut sorted: Vec<&Finding> = findings.iter().collect();
    sorted.sort_by(|a, b| {
        severity_rank(a.severity)
            .cmp(&severity_rank(b.severity))
            .then_with(|| a.rule_id.cmp(&b.rule_id))
    });

    for finding in &sorted {
        table.add_row(Row::new(vec![
            Cell::new(severity_label(finding.severity))
                .with_style(severity_color(finding.severity)),
            Cell::new(&finding.rule_id),
            Cell::new(finding.node.as_deref().unwrap_or("-")),
            Cell::new(&truncate_message(&finding.message)),
        ]));
    }

    if !findings.is_empty() {
        table.add_row(Row::new(vec![
            Cell::new(&format!("Summary: {}", render_summary_line(findings)))
                .with_style(Attr::Bold),
            Cell::new(""),
            Cell::new(""),
            Cell::new(""),
        ]));
    }

    table.to_string()
}
