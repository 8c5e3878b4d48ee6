//! Artifact validation.
//!
//! Two independent checks run per artifact:
//!
//! - **Structure**, dispatched through the destination contract: frontmatter
//!   presence and required keys for markdown files, parseability and schema key
//!   for JSON manifests.
//! - **Glob liveness**, destination-agnostic: every declared activation pattern
//!   must stay inside the project root and should match at least one file.
//!
//! Malformed input never fails the call; it becomes an issue. An artifact counts
//! as valid when it has no errors; warnings do not affect validity.

use crate::core::contract::{self, FileCategory, FrontmatterRule, RequiredKey};
use crate::core::frontmatter::{self, Split};
use crate::core::globs::{self, FileIndex, Liveness};
use crate::core::model::Severity;
use crate::core::snapshot::ExistingArtifact;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    pub destination_tool: String,
    pub file_path: String,
    pub severity: Severity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_fix: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub found: usize,
    pub valid: usize,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

struct IssueSink<'a> {
    tool: String,
    path: &'a str,
    issues: Vec<ValidationIssue>,
}

impl<'a> IssueSink<'a> {
    fn new(artifact: &'a ExistingArtifact) -> Self {
        Self {
            tool: contract::destination_for(&artifact.relative_path, &artifact.destination),
            path: &artifact.relative_path,
            issues: Vec::new(),
        }
    }

    fn push(&mut self, severity: Severity, message: String, fix: Option<String>) {
        self.issues.push(ValidationIssue {
            destination_tool: self.tool.clone(),
            file_path: self.path.to_string(),
            severity,
            message,
            suggested_fix: fix,
        });
    }
}

fn missing_key_message(key: &RequiredKey) -> String {
    match key.keys {
        [single] => format!("Missing required frontmatter field `{}`", single),
        many => format!(
            "Missing frontmatter field: expected one of {}",
            many.iter()
                .map(|k| format!("`{}`", k))
                .collect::<Vec<_>>()
                .join(", ")
        ),
    }
}

fn check_manifest(sink: &mut IssueSink<'_>, content: &str, schema_key: Option<&str>) {
    match serde_json::from_str::<serde_json::Value>(content) {
        Err(e) => sink.push(
            Severity::Error,
            format!("`{}` is not valid JSON: {}", sink.path, e),
            Some("Fix the JSON syntax; the tool will ignore this file until it parses".to_string()),
        ),
        Ok(value) => {
            if let Some(key) = schema_key {
                if value.get(key).is_none() {
                    sink.push(
                        Severity::Warning,
                        format!("Manifest has no `{}` key", key),
                        Some(format!("Add a \"{}\" entry pointing at the config schema", key)),
                    );
                }
            }
        }
    }
}

fn check_frontmatter(sink: &mut IssueSink<'_>, content: &str, required: &[RequiredKey]) {
    match frontmatter::split(content) {
        Split::Absent(_) => sink.push(
            Severity::Error,
            "Missing frontmatter block (expected a `---` delimited header)".to_string(),
            Some("Start the file with `---`, the required fields, and a closing `---`".to_string()),
        ),
        Split::Unterminated => sink.push(
            Severity::Error,
            "Frontmatter block is not closed with a `---` line".to_string(),
            Some("Add a `---` line after the last frontmatter field".to_string()),
        ),
        Split::Present(fm, _) => {
            for key in required {
                if key.keys.iter().any(|k| fm.has_value(k)) {
                    continue;
                }
                let fix = format!("Add `{}: ...` to the frontmatter", key.keys[0]);
                sink.push(key.severity, missing_key_message(key), Some(fix));
            }
        }
    }
}

fn check_structure(sink: &mut IssueSink<'_>, content: &str) {
    let Some((_, rule)) = contract::classify(sink.path) else {
        return;
    };
    if rule.category == FileCategory::Manifest {
        check_manifest(sink, content, rule.schema_key);
        return;
    }
    if rule.frontmatter == FrontmatterRule::Required {
        check_frontmatter(sink, content, rule.required);
    }
}

fn check_liveness(sink: &mut IssueSink<'_>, content: &str, files: &dyn FileIndex) {
    for check in globs::check_artifact(content, files) {
        match check.liveness {
            Liveness::Universal | Liveness::Live { .. } => {}
            Liveness::Unsafe { reason } => sink.push(
                Severity::Error,
                format!(
                    "Pattern `{}` in `{}` {}; patterns must resolve inside the project root",
                    check.pattern, check.field, reason
                ),
                Some("Use a project-relative pattern without `..`".to_string()),
            ),
            Liveness::InvalidSyntax { reason } => sink.push(
                Severity::Warning,
                format!(
                    "Pattern `{}` in `{}` is not a valid glob: {}",
                    check.pattern, check.field, reason
                ),
                None,
            ),
            Liveness::Dead => sink.push(
                Severity::Warning,
                format!(
                    "Pattern `{}` in `{}` currently matches no files",
                    check.pattern, check.field
                ),
                Some("Update the pattern to match existing files or remove it".to_string()),
            ),
        }
    }
}

/// Every issue for one artifact, structure first.
pub fn validate_artifact(artifact: &ExistingArtifact, files: &dyn FileIndex) -> Vec<ValidationIssue> {
    let mut sink = IssueSink::new(artifact);
    match artifact.raw_content.as_deref() {
        None => sink.push(
            Severity::Warning,
            format!(
                "Content not available ({} bytes); structure and patterns not checked",
                artifact.size_bytes
            ),
            None,
        ),
        Some(content) => {
            check_structure(&mut sink, content);
            check_liveness(&mut sink, content, files);
        }
    }
    sink.issues
}

pub fn validate(artifacts: &[ExistingArtifact], files: &dyn FileIndex) -> ValidationReport {
    let per_artifact: Vec<Vec<ValidationIssue>> = artifacts
        .par_iter()
        .map(|a| validate_artifact(a, files))
        .collect();

    let mut report = ValidationReport {
        found: artifacts.len(),
        ..Default::default()
    };
    let mut failing: BTreeSet<String> = BTreeSet::new();
    for issue in per_artifact.into_iter().flatten() {
        match issue.severity {
            Severity::Error => {
                failing.insert(issue.file_path.clone());
                report.errors.push(issue);
            }
            Severity::Warning | Severity::Info => report.warnings.push(issue),
        }
    }
    report.valid = report.found.saturating_sub(failing.len());
    report
}
