//! Per-destination structural and size contracts.
//!
//! Each destination is described entirely by data: which file shapes it owns,
//! whether each shape needs frontmatter and which keys, whether agents share a
//! file, and how size is measured and enforced. The serializers and the validator
//! read the same records, so a hand-written file is held to exactly the contract a
//! generated one is built against.

use crate::core::error::StackError;
use crate::core::model::Severity;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DestinationTool {
    Claude,
    Cursor,
    Codex,
    Copilot,
    Windsurf,
    Gemini,
    OpenCode,
}

impl DestinationTool {
    pub const ALL: [DestinationTool; 7] = [
        Self::Claude,
        Self::Cursor,
        Self::Codex,
        Self::Copilot,
        Self::Windsurf,
        Self::Gemini,
        Self::OpenCode,
    ];

    pub const fn key(self) -> &'static str {
        match self {
            Self::Claude => "claude",
            Self::Cursor => "cursor",
            Self::Codex => "codex",
            Self::Copilot => "copilot",
            Self::Windsurf => "windsurf",
            Self::Gemini => "gemini",
            Self::OpenCode => "opencode",
        }
    }

    pub fn from_key(key: &str) -> Result<Self, StackError> {
        let wanted = key.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|t| t.key() == wanted)
            .ok_or_else(|| StackError::UnknownDestination(key.to_string()))
    }

    pub fn contract(self) -> &'static DestinationContract {
        CONTRACTS
            .iter()
            .find(|c| c.tool == self)
            .unwrap_or(&CONTRACTS[0])
    }
}

impl fmt::Display for DestinationTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeUnit {
    Chars,
    Bytes,
    Tokens,
}

impl fmt::Display for SizeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Chars => write!(f, "chars"),
            Self::Bytes => write!(f, "bytes"),
            Self::Tokens => write!(f, "tokens"),
        }
    }
}

/// What happens when content exceeds `max_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizePolicy {
    /// No limit.
    Unbounded,
    /// Warn; content may be split across files by hand.
    Warn,
    /// Cut the designated artifact and append the truncation marker.
    Truncate,
    /// Structured file: never cut, error-level warning to split into a nested file.
    SplitRequired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FileCategory {
    Agent,
    Rule,
    Instruction,
    Consolidated,
    Manifest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrontmatterRule {
    Required,
    Forbidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentLayout {
    /// One agent per file, identity in frontmatter.
    Single,
    /// Several agents under `##`/`###` headings.
    Multi,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathShape {
    /// Exact project-relative path.
    Exact(&'static str),
    /// File name at any depth (nested instruction files).
    AnyDepth(&'static str),
    /// Direct child of `dir` ending in `suffix`.
    InDir {
        dir: &'static str,
        suffix: &'static str,
    },
}

impl PathShape {
    pub fn matches(&self, path: &str) -> bool {
        let path = path.trim_start_matches("./");
        match *self {
            Self::Exact(p) => path == p,
            Self::AnyDepth(name) => path == name || path.ends_with(&format!("/{}", name)),
            Self::InDir { dir, suffix } => path
                .strip_prefix(dir)
                .and_then(|rest| rest.strip_prefix('/'))
                .is_some_and(|file| {
                    !file.contains('/') && file.len() > suffix.len() && file.ends_with(suffix)
                }),
        }
    }
}

/// At least one of `keys` must be present with a value.
#[derive(Debug, Clone, Copy)]
pub struct RequiredKey {
    pub keys: &'static [&'static str],
    pub severity: Severity,
}

#[derive(Debug, Clone, Copy)]
pub struct FileRule {
    pub category: FileCategory,
    pub shape: PathShape,
    pub frontmatter: FrontmatterRule,
    pub required: &'static [RequiredKey],
    /// JSON manifests: key that should name the schema.
    pub schema_key: Option<&'static str>,
    pub agents: Option<AgentLayout>,
}

#[derive(Debug)]
pub struct DestinationContract {
    pub tool: DestinationTool,
    pub size_unit: SizeUnit,
    pub max_size: Option<usize>,
    pub size_policy: SizePolicy,
    /// Path of the artifact the size rule applies to; `None` means the total.
    pub size_target: Option<&'static str>,
    pub files: &'static [FileRule],
}

impl DestinationContract {
    pub fn rule_for(&self, path: &str) -> Option<&'static FileRule> {
        self.files.iter().find(|f| f.shape.matches(path))
    }
}

pub const TRUNCATION_MARKER: &str = "\n\n<!-- truncated: content exceeded the size limit -->\n";

pub const CLAUDE_MAIN: &str = "CLAUDE.md";
pub const CLAUDE_AGENTS_DIR: &str = ".claude/agents";
pub const CURSOR_RULES_DIR: &str = ".cursor/rules";
pub const CURSOR_AGENTS_FILE: &str = ".cursor/rules/agents.mdc";
pub const CODEX_MAIN: &str = "AGENTS.md";
pub const COPILOT_MAIN: &str = ".github/copilot-instructions.md";
pub const COPILOT_INSTRUCTIONS_DIR: &str = ".github/instructions";
pub const COPILOT_AGENTS_DIR: &str = ".github/agents";
pub const WINDSURF_MAIN: &str = ".windsurfrules";
pub const GEMINI_MAIN: &str = "GEMINI.md";
pub const OPENCODE_MANIFEST: &str = "opencode.json";
pub const OPENCODE_INSTRUCTIONS: &str = ".opencode/instructions.md";
pub const OPENCODE_AGENTS_DIR: &str = ".opencode/agent";
pub const OPENCODE_SCHEMA_URL: &str = "https://opencode.ai/config.json";

const NAME_ERROR: RequiredKey = RequiredKey {
    keys: &["name"],
    severity: Severity::Error,
};
const DESCRIPTION_WARN: RequiredKey = RequiredKey {
    keys: &["description"],
    severity: Severity::Warning,
};

pub static CONTRACTS: [DestinationContract; 7] = [
    DestinationContract {
        tool: DestinationTool::Claude,
        size_unit: SizeUnit::Tokens,
        max_size: None,
        size_policy: SizePolicy::Unbounded,
        size_target: None,
        files: &[
            FileRule {
                category: FileCategory::Consolidated,
                shape: PathShape::Exact(CLAUDE_MAIN),
                frontmatter: FrontmatterRule::Forbidden,
                required: &[],
                schema_key: None,
                agents: Some(AgentLayout::Multi),
            },
            FileRule {
                category: FileCategory::Agent,
                shape: PathShape::InDir {
                    dir: CLAUDE_AGENTS_DIR,
                    suffix: ".md",
                },
                frontmatter: FrontmatterRule::Required,
                required: &[NAME_ERROR, DESCRIPTION_WARN],
                schema_key: None,
                agents: Some(AgentLayout::Single),
            },
        ],
    },
    DestinationContract {
        tool: DestinationTool::Cursor,
        size_unit: SizeUnit::Chars,
        max_size: None,
        size_policy: SizePolicy::Unbounded,
        size_target: None,
        files: &[
            FileRule {
                category: FileCategory::Rule,
                shape: PathShape::Exact(CURSOR_AGENTS_FILE),
                frontmatter: FrontmatterRule::Required,
                required: &[
                    DESCRIPTION_WARN,
                    RequiredKey {
                        keys: &["globs", "alwaysApply"],
                        severity: Severity::Warning,
                    },
                ],
                schema_key: None,
                agents: Some(AgentLayout::Multi),
            },
            FileRule {
                category: FileCategory::Rule,
                shape: PathShape::InDir {
                    dir: CURSOR_RULES_DIR,
                    suffix: ".mdc",
                },
                frontmatter: FrontmatterRule::Required,
                required: &[
                    DESCRIPTION_WARN,
                    RequiredKey {
                        keys: &["globs", "alwaysApply"],
                        severity: Severity::Warning,
                    },
                ],
                schema_key: None,
                agents: None,
            },
        ],
    },
    DestinationContract {
        tool: DestinationTool::Codex,
        size_unit: SizeUnit::Bytes,
        max_size: Some(32_768),
        size_policy: SizePolicy::SplitRequired,
        size_target: None,
        files: &[FileRule {
            category: FileCategory::Consolidated,
            shape: PathShape::AnyDepth(CODEX_MAIN),
            frontmatter: FrontmatterRule::Forbidden,
            required: &[],
            schema_key: None,
            agents: Some(AgentLayout::Multi),
        }],
    },
    DestinationContract {
        tool: DestinationTool::Copilot,
        size_unit: SizeUnit::Chars,
        max_size: Some(30_000),
        size_policy: SizePolicy::Warn,
        size_target: None,
        files: &[
            FileRule {
                category: FileCategory::Consolidated,
                shape: PathShape::Exact(COPILOT_MAIN),
                frontmatter: FrontmatterRule::Forbidden,
                required: &[],
                schema_key: None,
                agents: Some(AgentLayout::Multi),
            },
            FileRule {
                category: FileCategory::Instruction,
                shape: PathShape::InDir {
                    dir: COPILOT_INSTRUCTIONS_DIR,
                    suffix: ".instructions.md",
                },
                frontmatter: FrontmatterRule::Required,
                required: &[RequiredKey {
                    keys: &["applyTo"],
                    severity: Severity::Error,
                }],
                schema_key: None,
                agents: None,
            },
            FileRule {
                category: FileCategory::Agent,
                shape: PathShape::InDir {
                    dir: COPILOT_AGENTS_DIR,
                    suffix: ".agent.md",
                },
                frontmatter: FrontmatterRule::Required,
                required: &[NAME_ERROR, DESCRIPTION_WARN],
                schema_key: None,
                agents: Some(AgentLayout::Single),
            },
        ],
    },
    DestinationContract {
        tool: DestinationTool::Windsurf,
        size_unit: SizeUnit::Chars,
        max_size: Some(6_000),
        size_policy: SizePolicy::Truncate,
        size_target: Some(WINDSURF_MAIN),
        files: &[FileRule {
            category: FileCategory::Consolidated,
            shape: PathShape::Exact(WINDSURF_MAIN),
            frontmatter: FrontmatterRule::Forbidden,
            required: &[],
            schema_key: None,
            agents: Some(AgentLayout::Multi),
        }],
    },
    DestinationContract {
        tool: DestinationTool::Gemini,
        size_unit: SizeUnit::Tokens,
        max_size: None,
        size_policy: SizePolicy::Unbounded,
        size_target: None,
        files: &[FileRule {
            category: FileCategory::Consolidated,
            shape: PathShape::AnyDepth(GEMINI_MAIN),
            frontmatter: FrontmatterRule::Forbidden,
            required: &[],
            schema_key: None,
            agents: Some(AgentLayout::Multi),
        }],
    },
    DestinationContract {
        tool: DestinationTool::OpenCode,
        size_unit: SizeUnit::Tokens,
        max_size: None,
        size_policy: SizePolicy::Unbounded,
        size_target: None,
        files: &[
            FileRule {
                category: FileCategory::Manifest,
                shape: PathShape::Exact(OPENCODE_MANIFEST),
                frontmatter: FrontmatterRule::Forbidden,
                required: &[],
                schema_key: Some("$schema"),
                agents: None,
            },
            FileRule {
                category: FileCategory::Consolidated,
                shape: PathShape::Exact(OPENCODE_INSTRUCTIONS),
                frontmatter: FrontmatterRule::Forbidden,
                required: &[],
                schema_key: None,
                agents: None,
            },
            FileRule {
                category: FileCategory::Agent,
                shape: PathShape::InDir {
                    dir: OPENCODE_AGENTS_DIR,
                    suffix: ".md",
                },
                frontmatter: FrontmatterRule::Required,
                required: &[DESCRIPTION_WARN],
                schema_key: None,
                agents: Some(AgentLayout::Single),
            },
        ],
    },
];

/// Destination and file rule owning `path`, if any.
pub fn classify(path: &str) -> Option<(DestinationTool, &'static FileRule)> {
    CONTRACTS
        .iter()
        .find_map(|c| c.rule_for(path).map(|rule| (c.tool, rule)))
}

/// Destination for `path`, falling back to a declared destination key.
pub fn destination_for(path: &str, declared: &str) -> String {
    match classify(path) {
        Some((tool, _)) => tool.key().to_string(),
        None if !declared.is_empty() => declared.to_string(),
        None => "unknown".to_string(),
    }
}
