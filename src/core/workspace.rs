//! Filesystem access for artifacts: reading existing ones, discovering them
//! under a project root, and writing generated ones.
//!
//! The engine and analyzers never touch the disk; this is the only module
//! that does, and only the CLI calls into it.

use crate::core::contract;
use crate::core::error::StackError;
use crate::core::globs::{self, ProjectFiles};
use crate::core::model::DestinationArtifact;
use crate::core::snapshot::ExistingArtifact;
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Files larger than this are reported with their size but no content.
pub const MAX_ARTIFACT_BYTES: u64 = 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactRead {
    pub exists: bool,
    pub size_bytes: u64,
    /// `None` when missing, oversized, or not UTF-8.
    pub content: Option<String>,
}

pub fn read_artifact(root: &Path, relative_path: &str) -> Result<ArtifactRead, StackError> {
    let path = root.join(relative_path);
    let meta = match fs::metadata(&path) {
        Ok(meta) if meta.is_file() => meta,
        Ok(_) => {
            return Ok(ArtifactRead {
                exists: false,
                size_bytes: 0,
                content: None,
            });
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Ok(ArtifactRead {
                exists: false,
                size_bytes: 0,
                content: None,
            });
        }
        Err(e) => return Err(StackError::IoError(e)),
    };

    let size_bytes = meta.len();
    let content = if size_bytes > MAX_ARTIFACT_BYTES {
        None
    } else {
        match fs::read_to_string(&path) {
            Ok(text) => Some(text),
            Err(e) if e.kind() == ErrorKind::InvalidData => None,
            Err(e) => return Err(StackError::IoError(e)),
        }
    };
    Ok(ArtifactRead {
        exists: true,
        size_bytes,
        content,
    })
}

/// Every file under the index that some destination contract claims.
pub fn discover_artifacts(root: &Path, files: &ProjectFiles) -> Result<Vec<ExistingArtifact>, StackError> {
    let mut out = Vec::new();
    for rel in files.files() {
        let Some((tool, _)) = contract::classify(rel) else {
            continue;
        };
        let read = read_artifact(root, rel)?;
        if !read.exists {
            continue;
        }
        out.push(ExistingArtifact {
            destination: tool.key().to_string(),
            relative_path: rel.clone(),
            size_bytes: read.size_bytes,
            raw_content: read.content,
        });
    }
    Ok(out)
}

pub struct WriteOptions {
    pub target_dir: PathBuf,
    /// Overwrite files that already exist.
    pub force: bool,
    /// Report what would happen without writing.
    pub dry_run: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum WriteAction {
    Wrote,
    WouldWrite,
    Skipped,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteOutcome {
    pub relative_path: String,
    pub action: WriteAction,
}

fn ensure_parent(path: &Path) -> Result<(), StackError> {
    if let Some(p) = path.parent() {
        fs::create_dir_all(p).map_err(StackError::IoError)?;
    }
    Ok(())
}

fn write_one(opts: &WriteOptions, artifact: &DestinationArtifact) -> Result<WriteAction, StackError> {
    if let Some(reason) = globs::unsafe_reason(&artifact.relative_path) {
        return Err(StackError::ValidationError(format!(
            "Refusing to write `{}`: path {}",
            artifact.relative_path, reason
        )));
    }
    let dest = opts.target_dir.join(&artifact.relative_path);
    if dest.exists() && !opts.force {
        return Ok(WriteAction::Skipped);
    }
    if opts.dry_run {
        return Ok(WriteAction::WouldWrite);
    }
    ensure_parent(&dest)?;
    fs::write(&dest, &artifact.content).map_err(StackError::IoError)?;
    Ok(WriteAction::Wrote)
}

/// Write artifacts under `opts.target_dir`; existing files are skipped unless forced.
pub fn write_artifacts(
    opts: &WriteOptions,
    artifacts: &[DestinationArtifact],
) -> Result<Vec<WriteOutcome>, StackError> {
    artifacts
        .iter()
        .map(|a| {
            Ok(WriteOutcome {
                relative_path: a.relative_path.clone(),
                action: write_one(opts, a)?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_reads_as_absent() {
        let dir = tempdir().unwrap();
        let read = read_artifact(dir.path(), "CLAUDE.md").unwrap();
        assert!(!read.exists);
        assert!(read.content.is_none());
    }

    #[test]
    fn oversized_file_withholds_content() {
        let dir = tempdir().unwrap();
        let big = "a".repeat(MAX_ARTIFACT_BYTES as usize + 1);
        fs::write(dir.path().join("AGENTS.md"), &big).unwrap();
        let read = read_artifact(dir.path(), "AGENTS.md").unwrap();
        assert!(read.exists);
        assert_eq!(read.size_bytes, big.len() as u64);
        assert!(read.content.is_none());
    }

    #[test]
    fn discovery_only_returns_contract_paths() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join(".claude/agents")).unwrap();
        fs::write(dir.path().join(".claude/agents/a.md"), "---\nname: a\n---\n").unwrap();
        fs::write(dir.path().join("README.md"), "# readme\n").unwrap();
        let files = ProjectFiles::from_root(dir.path()).unwrap();
        let found = discover_artifacts(dir.path(), &files).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].destination, "claude");
        assert_eq!(found[0].relative_path, ".claude/agents/a.md");
    }

    #[test]
    fn writes_skip_existing_unless_forced() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("GEMINI.md"), "old").unwrap();
        let artifacts = vec![
            DestinationArtifact::new("gemini", "GEMINI.md", "new".to_string(), "t"),
            DestinationArtifact::new("gemini", "pkg/GEMINI.md", "nested".to_string(), "t"),
        ];
        let mut opts = WriteOptions {
            target_dir: dir.path().to_path_buf(),
            force: false,
            dry_run: false,
        };
        let outcomes = write_artifacts(&opts, &artifacts).unwrap();
        assert_eq!(outcomes[0].action, WriteAction::Skipped);
        assert_eq!(outcomes[1].action, WriteAction::Wrote);
        assert_eq!(fs::read_to_string(dir.path().join("GEMINI.md")).unwrap(), "old");

        opts.force = true;
        write_artifacts(&opts, &artifacts).unwrap();
        assert_eq!(fs::read_to_string(dir.path().join("GEMINI.md")).unwrap(), "new");
    }

    #[test]
    fn escaping_paths_are_refused() {
        let dir = tempdir().unwrap();
        let opts = WriteOptions {
            target_dir: dir.path().to_path_buf(),
            force: true,
            dry_run: false,
        };
        let bad = [DestinationArtifact::new("claude", "../CLAUDE.md", "x".to_string(), "t")];
        assert!(matches!(
            write_artifacts(&opts, &bad),
            Err(StackError::ValidationError(_))
        ));
    }
}
