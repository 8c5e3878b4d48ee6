//! Tech-stack snapshot consumed by the recommendation engine.
//!
//! The snapshot is produced by an external detector and handed to this crate as
//! JSON. Nothing here re-validates it; every downstream stage borrows it
//! immutably.

use crate::core::error::StackError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TechStackSnapshot {
    pub languages: Vec<Language>,
    pub frameworks: Vec<Tool>,
    pub build_tools: Vec<Tool>,
    pub testing: Vec<Tool>,
    pub databases: Vec<Tool>,
    pub styling: Vec<Tool>,
    pub linting: Vec<Tool>,
    pub deployment: Vec<Tool>,
    pub package_manager: PackageManager,
    pub file_tree: FileTreeFacts,
    pub existing_artifacts: Vec<ExistingArtifact>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Language {
    pub name: String,
    pub file_count: usize,
    pub extensions: Vec<String>,
}

/// A detected framework or tool (build, test, database, styling, lint, deploy).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Tool {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<u8>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageManager {
    Npm,
    Yarn,
    Pnpm,
    Bun,
    Cargo,
    Pip,
    Poetry,
    Uv,
    Go,
    Maven,
    Gradle,
    Bundler,
    Composer,
    #[default]
    #[serde(other)]
    Unknown,
}

impl PackageManager {
    pub fn install_command(self) -> Option<&'static str> {
        match self {
            Self::Npm => Some("npm install"),
            Self::Yarn => Some("yarn install"),
            Self::Pnpm => Some("pnpm install"),
            Self::Bun => Some("bun install"),
            Self::Cargo => Some("cargo build"),
            Self::Pip => Some("pip install -r requirements.txt"),
            Self::Poetry => Some("poetry install"),
            Self::Uv => Some("uv sync"),
            Self::Go => Some("go mod download"),
            Self::Maven => Some("mvn install"),
            Self::Gradle => Some("gradle build"),
            Self::Bundler => Some("bundle install"),
            Self::Composer => Some("composer install"),
            Self::Unknown => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FileTreeFacts {
    pub total_files: usize,
    pub top_level_dirs: Vec<String>,
    pub has_monorepo: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monorepo_packages: Option<Vec<String>>,
    pub significant_paths: Vec<String>,
}

/// A destination artifact that already exists in the project.
///
/// `raw_content` is `None` when the reader withheld it (oversized file).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExistingArtifact {
    pub destination: String,
    pub relative_path: String,
    pub size_bytes: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_content: Option<String>,
}

fn contains_tool(tools: &[Tool], name: &str) -> bool {
    tools.iter().any(|t| t.name.eq_ignore_ascii_case(name))
}

impl TechStackSnapshot {
    pub fn has_language(&self, name: &str) -> bool {
        self.languages.iter().any(|l| l.name.eq_ignore_ascii_case(name))
    }

    pub fn language(&self, name: &str) -> Option<&Language> {
        self.languages.iter().find(|l| l.name.eq_ignore_ascii_case(name))
    }

    /// The language with the most files, ties resolved by declaration order.
    pub fn primary_language(&self) -> Option<&Language> {
        self.languages
            .iter()
            .enumerate()
            .max_by(|(ia, a), (ib, b)| a.file_count.cmp(&b.file_count).then(ib.cmp(ia)))
            .map(|(_, l)| l)
    }

    pub fn has_framework(&self, name: &str) -> bool {
        contains_tool(&self.frameworks, name)
    }

    pub fn has_any_framework(&self, names: &[&str]) -> bool {
        names.iter().any(|n| self.has_framework(n))
    }

    pub fn has_styling(&self, name: &str) -> bool {
        contains_tool(&self.styling, name)
    }

    pub fn has_top_level_dir(&self, name: &str) -> bool {
        self.file_tree
            .top_level_dirs
            .iter()
            .any(|d| d.trim_end_matches('/').eq_ignore_ascii_case(name))
    }

    /// Display name for the project, derived from the primary language when nothing
    /// better is known.
    pub fn stack_summary(&self) -> String {
        let mut parts: Vec<&str> = Vec::new();
        if let Some(lang) = self.primary_language() {
            parts.push(&lang.name);
        }
        for fw in self.frameworks.iter().take(3) {
            parts.push(&fw.name);
        }
        if parts.is_empty() {
            "an unidentified stack".to_string()
        } else {
            parts.join(", ")
        }
    }

    /// Extensions across all detected languages, lower-cased, without the dot.
    pub fn extensions(&self) -> Vec<String> {
        let mut out: Vec<String> = self
            .languages
            .iter()
            .flat_map(|l| l.extensions.iter())
            .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        out.sort();
        out.dedup();
        out
    }
}

/// Load a snapshot produced by the detector from a JSON file.
pub fn load_snapshot(path: &Path) -> Result<TechStackSnapshot, StackError> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            StackError::NotFound(format!("snapshot file {}", path.display()))
        } else {
            StackError::IoError(e)
        }
    })?;
    Ok(serde_json::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_parses_camel_case_with_defaults() {
        let raw = r#"{
            "languages": [{"name": "TypeScript", "fileCount": 12, "extensions": [".ts", ".tsx"]}],
            "frameworks": [{"name": "React", "version": "18.2.0"}],
            "packageManager": "pnpm",
            "fileTree": {"totalFiles": 40, "topLevelDirs": ["src"], "hasMonorepo": false}
        }"#;
        let snap: TechStackSnapshot = serde_json::from_str(raw).unwrap();
        assert!(snap.has_language("typescript"));
        assert!(snap.has_framework("react"));
        assert_eq!(snap.package_manager, PackageManager::Pnpm);
        assert_eq!(snap.extensions(), vec!["ts".to_string(), "tsx".to_string()]);
        assert!(snap.existing_artifacts.is_empty());
    }

    #[test]
    fn unknown_package_manager_falls_back() {
        let snap: TechStackSnapshot =
            serde_json::from_str(r#"{"packageManager": "pixi"}"#).unwrap();
        assert_eq!(snap.package_manager, PackageManager::Unknown);
        assert!(snap.package_manager.install_command().is_none());
    }

    #[test]
    fn primary_language_prefers_file_count_then_order() {
        let snap = TechStackSnapshot {
            languages: vec![
                Language { name: "Go".into(), file_count: 5, extensions: vec![] },
                Language { name: "Rust".into(), file_count: 5, extensions: vec![] },
            ],
            ..Default::default()
        };
        assert_eq!(snap.primary_language().unwrap().name, "Go");
    }
}
