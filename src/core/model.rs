//! Recommendation and artifact records shared across the pipeline.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentCategory {
    Review,
    Testing,
    Database,
    Security,
    Ui,
    Api,
    Devops,
    Docs,
    Perf,
    General,
}

impl fmt::Display for AgentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Review => "review",
            Self::Testing => "testing",
            Self::Database => "database",
            Self::Security => "security",
            Self::Ui => "ui",
            Self::Api => "api",
            Self::Devops => "devops",
            Self::Docs => "docs",
            Self::Perf => "perf",
            Self::General => "general",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::High => write!(f, "high"),
            Self::Medium => write!(f, "medium"),
            Self::Low => write!(f, "low"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentRecommendation {
    pub id: String,
    pub name: String,
    pub category: AgentCategory,
    pub confidence: u8,
    pub description: String,
    pub reason: String,
    pub triggers: BTreeSet<String>,
    pub capabilities: Vec<String>,
    pub relevant_files: Vec<String>,
    pub estimated_token_cost: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleRecommendation {
    pub id: String,
    pub title: String,
    pub content: String,
    pub priority: Priority,
    pub applies_to: Vec<String>,
    pub category: AgentCategory,
}

impl RuleRecommendation {
    /// True when the rule targets every file.
    pub fn is_global(&self) -> bool {
        self.applies_to
            .iter()
            .all(|p| crate::core::globs::is_universal(p))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendations {
    pub agents: Vec<AgentRecommendation>,
    pub rules: Vec<RuleRecommendation>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
            Self::Info => write!(f, "info"),
        }
    }
}

/// A generated file for one destination tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DestinationArtifact {
    pub destination_tool: String,
    pub relative_path: String,
    pub content: String,
    pub size_bytes: usize,
    pub description: String,
}

impl DestinationArtifact {
    pub fn new(tool: &str, relative_path: impl Into<String>, content: String, description: &str) -> Self {
        let size_bytes = content.len();
        Self {
            destination_tool: tool.to_string(),
            relative_path: relative_path.into(),
            content,
            size_bytes,
            description: description.to_string(),
        }
    }

    pub fn char_count(&self) -> usize {
        self.content.chars().count()
    }

    /// Cut content to `keep_chars` characters and append `marker`.
    ///
    /// Only the size-enforcement step calls this.
    pub(crate) fn truncate_to(&mut self, keep_chars: usize, marker: &str) {
        let cut = self
            .content
            .char_indices()
            .nth(keep_chars)
            .map(|(i, _)| i)
            .unwrap_or(self.content.len());
        self.content.truncate(cut);
        self.content.push_str(marker);
        self.size_bytes = self.content.len();
    }
}
