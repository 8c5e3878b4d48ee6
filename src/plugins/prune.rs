//! Prune candidates: artifacts that no longer do anything.
//!
//! An artifact is a candidate when its body is effectively empty, or when every
//! activation pattern it declares resolves to zero project files. Empty content
//! wins when both hold. Nothing is deleted here.

use crate::core::config::Policy;
use crate::core::contract;
use crate::core::frontmatter;
use crate::core::globs::{self, FileIndex, Liveness};
use crate::core::snapshot::ExistingArtifact;
use rayon::prelude::*;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PruneReason {
    EmptyContent,
    DeadGlobs,
}

impl PruneReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EmptyContent => "empty-content",
            Self::DeadGlobs => "dead-globs",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PruneCandidate {
    pub destination_tool: String,
    pub file_path: String,
    pub reason: PruneReason,
    pub message: String,
    pub suggested_fix: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PruneReport {
    pub scanned: usize,
    pub candidates: Vec<PruneCandidate>,
}

fn body_weight(content: &str) -> usize {
    frontmatter::strip(content)
        .chars()
        .filter(|c| !c.is_whitespace())
        .count()
}

/// Non-universal patterns, when every one of them is dead.
fn dead_patterns(content: &str, files: &dyn FileIndex) -> Option<Vec<String>> {
    let checks: Vec<_> = globs::check_artifact(content, files)
        .into_iter()
        .filter(|c| c.liveness != Liveness::Universal)
        .collect();
    if checks.is_empty() || checks.iter().any(|c| c.liveness != Liveness::Dead) {
        return None;
    }
    Some(checks.into_iter().map(|c| c.pattern).collect())
}

pub fn check_artifact(
    artifact: &ExistingArtifact,
    files: &dyn FileIndex,
    policy: &Policy,
) -> Option<PruneCandidate> {
    let content = artifact.raw_content.as_deref()?;
    let tool = contract::destination_for(&artifact.relative_path, &artifact.destination);
    let path = artifact.relative_path.clone();

    let weight = body_weight(content);
    if weight < policy.empty_min_chars {
        return Some(PruneCandidate {
            destination_tool: tool,
            message: format!(
                "`{}` has {} non-whitespace characters of content (minimum {})",
                path, weight, policy.empty_min_chars
            ),
            file_path: path,
            reason: PruneReason::EmptyContent,
            suggested_fix: Some("Delete the file or add the instructions it was meant to hold".to_string()),
        });
    }

    let dead = dead_patterns(content, files)?;
    let quoted: Vec<String> = dead.iter().map(|p| format!("\"{}\"", p)).collect();
    Some(PruneCandidate {
        destination_tool: tool,
        message: format!(
            "`{}` only activates for patterns that match no project files: {}",
            path,
            quoted.join(", ")
        ),
        file_path: path,
        reason: PruneReason::DeadGlobs,
        suggested_fix: Some("Delete the file, or point its patterns at files that exist".to_string()),
    })
}

pub fn find_candidates(artifacts: &[ExistingArtifact], files: &dyn FileIndex, policy: &Policy) -> PruneReport {
    let candidates = artifacts
        .par_iter()
        .filter_map(|a| check_artifact(a, files, policy))
        .collect();
    PruneReport {
        scanned: artifacts.len(),
        candidates,
    }
}
