//! Terminal rendering for command results.
//!
//! Every renderer returns a `String`; the CLI decides where it goes. Messages are
//! collapsed to one line and bounded so a noisy project still reads cleanly.

use crate::core::model::{Recommendations, Severity};
use crate::core::validate::{ValidationIssue, ValidationReport};
use crate::plugins::adapters::SerializationOutput;
use crate::plugins::fixer::ConflictReport;
use crate::plugins::prune::PruneReport;
use colored::Colorize;
use std::fmt::Write as _;

const MESSAGE_WIDTH: usize = 160;

/// Collapse newlines/extra whitespace and bound length for terminal display.
pub fn compact_line(input: &str, max_chars: usize) -> String {
    let collapsed = input.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut chars = collapsed.chars();
    let preview: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}...", preview)
    } else {
        preview
    }
}

fn severity_mark(severity: Severity) -> String {
    match severity {
        Severity::Error => "✗".bright_red().bold().to_string(),
        Severity::Warning => "⚠".bright_yellow().to_string(),
        Severity::Info => "▸".bright_cyan().to_string(),
    }
}

fn issue_line(out: &mut String, severity: Severity, tool: &str, path: &str, message: &str, fix: Option<&str>) {
    let _ = writeln!(
        out,
        "{} [{}] {}: {}",
        severity_mark(severity),
        tool.bright_cyan(),
        path.bright_white().bold(),
        compact_line(message, MESSAGE_WIDTH)
    );
    if let Some(fix) = fix {
        let _ = writeln!(out, "    {} {}", "fix:".dimmed(), compact_line(fix, MESSAGE_WIDTH));
    }
}

pub fn render_recommendations(recs: &Recommendations) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", "Agents".bold(), recs.agents.len());
    for agent in &recs.agents {
        let _ = writeln!(
            out,
            "  {} {} {} ~{} tokens",
            format!("{:>3}", agent.confidence).bright_green(),
            agent.id.bright_white().bold(),
            format!("[{}]", agent.category).dimmed(),
            agent.estimated_token_cost
        );
        let _ = writeln!(out, "      {}", compact_line(&agent.reason, MESSAGE_WIDTH));
    }
    let _ = writeln!(out, "{} ({})", "Rules".bold(), recs.rules.len());
    for rule in &recs.rules {
        let _ = writeln!(
            out,
            "  {} {} {}",
            format!("{:<6}", rule.priority.to_string()).bright_yellow(),
            rule.id.bright_white().bold(),
            rule.applies_to.join(", ").dimmed()
        );
    }
    out
}

pub fn render_serialization(outputs: &[SerializationOutput]) -> String {
    let mut out = String::new();
    for output in outputs {
        let _ = writeln!(
            out,
            "{} {} ({} files, {} {})",
            "▸".bright_cyan(),
            output.destination_tool.bold(),
            output.artifacts.len(),
            output.total_size,
            output.size_unit
        );
        for artifact in &output.artifacts {
            let _ = writeln!(out, "    {}", artifact.relative_path);
        }
        for warning in &output.warnings {
            issue_line(
                &mut out,
                warning.severity,
                &output.destination_tool,
                &warning.file_path,
                &warning.message,
                None,
            );
        }
    }
    out
}

fn validation_issue(out: &mut String, issue: &ValidationIssue) {
    issue_line(
        out,
        issue.severity,
        &issue.destination_tool,
        &issue.file_path,
        &issue.message,
        issue.suggested_fix.as_deref(),
    );
}

pub fn render_validation(report: &ValidationReport) -> String {
    let mut out = String::new();
    for issue in report.errors.iter().chain(&report.warnings) {
        validation_issue(&mut out, issue);
    }
    let summary = format!(
        "validate: {} artifacts, {} valid, {} errors, {} warnings",
        report.found,
        report.valid,
        report.errors.len(),
        report.warnings.len()
    );
    if report.is_clean() {
        let _ = writeln!(out, "{} {}", "✓".bright_green(), summary);
    } else {
        let _ = writeln!(out, "{} {}", "✗".bright_red(), summary);
    }
    out
}

pub fn render_conflicts(report: &ConflictReport) -> String {
    let mut out = String::new();
    for issue in &report.issues {
        issue_line(
            &mut out,
            issue.severity,
            &issue.destination_tool,
            &issue.file_path,
            &issue.message,
            issue.suggested_fix.as_deref(),
        );
    }
    let mark = if report.issues.is_empty() {
        "✓".bright_green()
    } else {
        "⚠".bright_yellow()
    };
    let _ = writeln!(
        out,
        "{} fix: {} agents parsed, {} issues",
        mark,
        report.agents.len(),
        report.issues.len()
    );
    out
}

pub fn render_prune(report: &PruneReport) -> String {
    let mut out = String::new();
    for candidate in &report.candidates {
        let _ = writeln!(
            out,
            "{} [{}] {} {}",
            "▸".bright_cyan(),
            candidate.destination_tool.bright_cyan(),
            candidate.file_path.bright_white().bold(),
            format!("({})", candidate.reason.as_str()).dimmed()
        );
        let _ = writeln!(out, "    {}", compact_line(&candidate.message, MESSAGE_WIDTH));
    }
    let _ = writeln!(
        out,
        "prune: {} scanned, {} candidates",
        report.scanned,
        report.candidates.len()
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compact_line_collapses_and_bounds() {
        assert_eq!(compact_line("a\n  b\tc", 10), "a b c");
        assert_eq!(compact_line("abcdef", 3), "abc...");
    }

    #[test]
    fn validation_summary_counts() {
        colored::control::set_override(false);
        let report = ValidationReport {
            found: 3,
            valid: 3,
            ..Default::default()
        };
        let text = render_validation(&report);
        assert!(text.contains("validate: 3 artifacts, 3 valid, 0 errors, 0 warnings"));
    }
}
