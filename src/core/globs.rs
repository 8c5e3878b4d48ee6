//! Activation-pattern handling: extraction, safety, universality, and liveness.
//!
//! Destinations name their glob field differently (`globs`, `applyTo`, `paths`,
//! `include`) but the meaning is the same everywhere: the artifact activates for
//! files matching the pattern. Liveness is resolved against a `FileIndex` so the
//! analyzers never touch the filesystem directly.

use crate::core::error::StackError;
use crate::core::frontmatter;
use globset::{GlobBuilder, GlobMatcher};
use serde::Serialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Frontmatter keys that carry activation patterns.
pub const GLOB_FIELDS: [&str; 4] = ["globs", "applyTo", "paths", "include"];

/// Patterns meaning "every file".
pub const UNIVERSAL_PATTERNS: [&str; 3] = ["*", "**", "**/*"];

/// Directories never descended into when indexing a project.
const SKIP_DIRS: [&str; 8] = [
    ".git",
    "target",
    "node_modules",
    "dist",
    "build",
    ".next",
    "vendor",
    "__pycache__",
];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid glob pattern `{pattern}`: {reason}")]
pub struct GlobError {
    pub pattern: String,
    pub reason: String,
}

pub fn is_universal(pattern: &str) -> bool {
    UNIVERSAL_PATTERNS.contains(&pattern.trim())
}

/// Why a pattern may not be resolved, if it escapes the project root.
pub fn unsafe_reason(pattern: &str) -> Option<&'static str> {
    let p = pattern.trim();
    if p.split(['/', '\\']).any(|seg| seg == "..") {
        return Some("contains parent-directory traversal");
    }
    let bytes = p.as_bytes();
    let drive_letter = bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':';
    if p.starts_with('/') || p.starts_with('\\') || p.starts_with('~') || drive_letter {
        return Some("is an absolute path");
    }
    None
}

/// Read-only view of the project's files, resolved by glob.
pub trait FileIndex: Sync {
    fn resolve_glob(&self, pattern: &str) -> Result<Vec<String>, GlobError>;
}

/// Compile with `*` stopping at `/` and `{a,b}` alternation enabled.
fn compile(pattern: &str) -> Result<GlobMatcher, GlobError> {
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map(|g| g.compile_matcher())
        .map_err(|e| GlobError {
            pattern: pattern.to_string(),
            reason: e.kind().to_string(),
        })
}

/// In-memory list of project-relative paths using `/` separators.
#[derive(Debug, Clone, Default)]
pub struct ProjectFiles {
    files: Vec<String>,
}

impl ProjectFiles {
    pub fn new<I, S>(files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut files: Vec<String> = files
            .into_iter()
            .map(|f| f.into().replace('\\', "/"))
            .collect();
        files.sort();
        files.dedup();
        Self { files }
    }

    /// Index every regular file under `root`, skipping VCS and build output.
    pub fn from_root(root: &Path) -> Result<Self, StackError> {
        fn recurse(root: &Path, dir: &Path, out: &mut Vec<String>) -> Result<(), StackError> {
            for entry in fs::read_dir(dir).map_err(StackError::IoError)? {
                let entry = entry.map_err(StackError::IoError)?;
                let path = entry.path();
                let name = entry.file_name();
                let name = name.to_string_lossy();
                if path.is_dir() {
                    if SKIP_DIRS.contains(&name.as_ref()) {
                        continue;
                    }
                    recurse(root, &path, out)?;
                } else if path.is_file() {
                    if let Ok(rel) = path.strip_prefix(root) {
                        out.push(rel.to_string_lossy().replace('\\', "/"));
                    }
                }
            }
            Ok(())
        }

        let mut files = Vec::new();
        recurse(root, root, &mut files)?;
        Ok(Self::new(files))
    }

    pub fn files(&self) -> &[String] {
        &self.files
    }
}

impl FileIndex for ProjectFiles {
    fn resolve_glob(&self, pattern: &str) -> Result<Vec<String>, GlobError> {
        let trimmed = pattern.trim().trim_start_matches("./");
        let compiled = compile(trimmed).map_err(|e| GlobError {
            pattern: pattern.to_string(),
            ..e
        })?;
        // Slash-less patterns match a basename anywhere, gitignore style.
        let basename_only = !trimmed.contains('/');
        Ok(self
            .files
            .iter()
            .filter(|f| {
                compiled.is_match(f.as_str())
                    || (basename_only
                        && f.rsplit('/')
                            .next()
                            .is_some_and(|base| compiled.is_match(base)))
            })
            .cloned()
            .collect())
    }
}

/// A pattern found in an artifact's frontmatter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeclaredPattern {
    pub field: String,
    pub pattern: String,
}

/// All glob-valued fields declared in `content`'s frontmatter, in field order.
pub fn declared_patterns(content: &str) -> Vec<DeclaredPattern> {
    let Some(fm) = frontmatter::parse(content) else {
        return Vec::new();
    };
    let mut out = Vec::new();
    for field in GLOB_FIELDS {
        if let Some(value) = fm.get(field) {
            for pattern in frontmatter::split_list(value) {
                out.push(DeclaredPattern {
                    field: field.to_string(),
                    pattern,
                });
            }
        }
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum Liveness {
    Universal,
    Unsafe { reason: String },
    InvalidSyntax { reason: String },
    Dead,
    Live { matches: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatternCheck {
    pub field: String,
    pub pattern: String,
    pub liveness: Liveness,
}

pub fn check_pattern(pattern: &str, files: &dyn FileIndex) -> Liveness {
    if is_universal(pattern) {
        return Liveness::Universal;
    }
    if let Some(reason) = unsafe_reason(pattern) {
        return Liveness::Unsafe {
            reason: reason.to_string(),
        };
    }
    match files.resolve_glob(pattern) {
        Ok(matches) if matches.is_empty() => Liveness::Dead,
        Ok(matches) => Liveness::Live {
            matches: matches.len(),
        },
        Err(e) => Liveness::InvalidSyntax { reason: e.reason },
    }
}

/// Liveness of every pattern declared in `content`.
pub fn check_artifact(content: &str, files: &dyn FileIndex) -> Vec<PatternCheck> {
    declared_patterns(content)
        .into_iter()
        .map(|d| {
            let liveness = check_pattern(&d.pattern, files);
            PatternCheck {
                field: d.field,
                pattern: d.pattern,
                liveness,
            }
        })
        .collect()
}
