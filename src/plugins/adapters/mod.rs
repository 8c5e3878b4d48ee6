//! Constrained serialization: recommendations to per-destination artifacts.
//!
//! Every destination is an `Adapter` record in `ADAPTERS`: a render function that
//! lays out files, plus the destination's `DestinationContract`. After rendering,
//! `enforce_size_limit` applies the contract's size rule. Truncation is the only
//! place generated content is ever rewritten.

pub mod claude;
pub mod codex;
pub mod copilot;
pub mod cursor;
pub mod gemini;
pub mod opencode;
pub mod windsurf;

use crate::core::contract::{DestinationContract, DestinationTool, SizePolicy, SizeUnit, TRUNCATION_MARKER};
use crate::core::error::StackError;
use crate::core::model::{AgentRecommendation, DestinationArtifact, Recommendations, RuleRecommendation, Severity};
use crate::core::snapshot::TechStackSnapshot;
use crate::core::tokens;
use serde::Serialize;

pub type RenderFn = fn(&TechStackSnapshot, &Recommendations) -> Vec<DestinationArtifact>;

pub struct Adapter {
    pub tool: DestinationTool,
    pub label: &'static str,
    pub render: RenderFn,
}

pub static ADAPTERS: [Adapter; 7] = [
    Adapter {
        tool: DestinationTool::Claude,
        label: "Claude",
        render: claude::render,
    },
    Adapter {
        tool: DestinationTool::Cursor,
        label: "Cursor",
        render: cursor::render,
    },
    Adapter {
        tool: DestinationTool::Codex,
        label: "Codex",
        render: codex::render,
    },
    Adapter {
        tool: DestinationTool::Copilot,
        label: "GitHub Copilot",
        render: copilot::render,
    },
    Adapter {
        tool: DestinationTool::Windsurf,
        label: "Windsurf",
        render: windsurf::render,
    },
    Adapter {
        tool: DestinationTool::Gemini,
        label: "Gemini CLI",
        render: gemini::render,
    },
    Adapter {
        tool: DestinationTool::OpenCode,
        label: "OpenCode",
        render: opencode::render,
    },
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializationWarning {
    pub severity: Severity,
    pub file_path: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializationOutput {
    pub destination_tool: String,
    pub artifacts: Vec<DestinationArtifact>,
    pub total_size: usize,
    pub size_unit: SizeUnit,
    pub warnings: Vec<SerializationWarning>,
}

pub fn adapter(tool: DestinationTool) -> &'static Adapter {
    ADAPTERS
        .iter()
        .find(|a| a.tool == tool)
        .unwrap_or(&ADAPTERS[0])
}

/// Size of `text` in `unit`.
pub fn measure(unit: SizeUnit, text: &str) -> usize {
    match unit {
        SizeUnit::Chars => text.chars().count(),
        SizeUnit::Bytes => text.len(),
        SizeUnit::Tokens => tokens::count_tokens(text),
    }
}

/// Apply the contract's size rule in place; returns the total size and warnings.
pub fn enforce_size_limit(
    contract: &DestinationContract,
    artifacts: &mut [DestinationArtifact],
) -> (usize, Vec<SerializationWarning>) {
    let mut warnings = Vec::new();
    let unit = contract.size_unit;

    if let Some(max) = contract.max_size {
        for artifact in artifacts.iter_mut() {
            if let Some(target) = contract.size_target {
                if artifact.relative_path != target {
                    continue;
                }
            }
            let size = measure(unit, &artifact.content);
            if size <= max {
                continue;
            }
            match contract.size_policy {
                SizePolicy::Unbounded => {}
                SizePolicy::Truncate => {
                    let marker_len = measure(unit, TRUNCATION_MARKER);
                    artifact.truncate_to(max.saturating_sub(marker_len), TRUNCATION_MARKER);
                    warnings.push(SerializationWarning {
                        severity: Severity::Warning,
                        file_path: artifact.relative_path.clone(),
                        message: format!(
                            "{} was {} {}, over the {} {} limit; truncated to {} {}",
                            artifact.relative_path,
                            size,
                            unit,
                            max,
                            unit,
                            measure(unit, &artifact.content),
                            unit
                        ),
                    });
                }
                SizePolicy::Warn => warnings.push(SerializationWarning {
                    severity: Severity::Warning,
                    file_path: artifact.relative_path.clone(),
                    message: format!(
                        "{} is {} {}, over the {} {} limit; move scoped content into separate instruction files",
                        artifact.relative_path, size, unit, max, unit
                    ),
                }),
                SizePolicy::SplitRequired => warnings.push(SerializationWarning {
                    severity: Severity::Error,
                    file_path: artifact.relative_path.clone(),
                    message: format!(
                        "{} is {} {}, over the {} {} limit; split content into a nested file (e.g. packages/<name>/{}) instead of truncating",
                        artifact.relative_path,
                        size,
                        unit,
                        max,
                        unit,
                        artifact
                            .relative_path
                            .rsplit('/')
                            .next()
                            .unwrap_or(&artifact.relative_path)
                    ),
                }),
            }
        }
    }

    let total = artifacts.iter().map(|a| measure(unit, &a.content)).sum();
    (total, warnings)
}

/// Render and size-check one destination.
pub fn serialize_for(
    tool: DestinationTool,
    snapshot: &TechStackSnapshot,
    recommendations: &Recommendations,
) -> SerializationOutput {
    let adapter = adapter(tool);
    let contract = tool.contract();
    let mut artifacts = (adapter.render)(snapshot, recommendations);
    let (total_size, warnings) = enforce_size_limit(contract, &mut artifacts);
    SerializationOutput {
        destination_tool: tool.key().to_string(),
        artifacts,
        total_size,
        size_unit: contract.size_unit,
        warnings,
    }
}

/// Render a destination by key. An unknown key is a caller bug and fails.
pub fn serialize(
    tool_key: &str,
    snapshot: &TechStackSnapshot,
    recommendations: &Recommendations,
) -> Result<SerializationOutput, StackError> {
    let tool = DestinationTool::from_key(tool_key)?;
    Ok(serialize_for(tool, snapshot, recommendations))
}

// ---- shared markdown pieces ----

pub(crate) fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub(crate) fn trigger_line(agent: &AgentRecommendation) -> String {
    let words: Vec<&str> = agent.triggers.iter().map(String::as_str).collect();
    format!("Triggers: {}", words.join(", "))
}

pub(crate) fn code_list(patterns: &[String]) -> String {
    patterns
        .iter()
        .map(|p| format!("`{}`", p))
        .collect::<Vec<_>>()
        .join(", ")
}

/// `## Project Overview` section.
pub(crate) fn project_overview(snapshot: &TechStackSnapshot) -> String {
    let mut out = String::from("## Project Overview\n\n");
    out.push_str(&format!("- Stack: {}\n", snapshot.stack_summary()));
    let groups = [
        ("Build", &snapshot.build_tools),
        ("Testing", &snapshot.testing),
        ("Databases", &snapshot.databases),
        ("Styling", &snapshot.styling),
        ("Linting", &snapshot.linting),
        ("Deployment", &snapshot.deployment),
    ];
    for (label, tools) in groups {
        if tools.is_empty() {
            continue;
        }
        let names: Vec<String> = tools
            .iter()
            .map(|t| match &t.version {
                Some(v) => format!("{} {}", t.name, v),
                None => t.name.clone(),
            })
            .collect();
        out.push_str(&format!("- {}: {}\n", label, names.join(", ")));
    }
    if let Some(cmd) = snapshot.package_manager.install_command() {
        out.push_str(&format!("- Install: `{}`\n", cmd));
    }
    if snapshot.file_tree.has_monorepo {
        let packages = snapshot
            .file_tree
            .monorepo_packages
            .as_ref()
            .map(|p| p.join(", "))
            .unwrap_or_else(|| "undeclared".to_string());
        out.push_str(&format!("- Monorepo packages: {}\n", packages));
    }
    if !snapshot.file_tree.significant_paths.is_empty() {
        out.push_str(&format!(
            "- Key paths: {}\n",
            code_list(&snapshot.file_tree.significant_paths)
        ));
    }
    out
}

/// `## Rules` section; each rule under a level-4 heading so it is never read back
/// as an agent.
pub(crate) fn rules_section(rules: &[RuleRecommendation]) -> String {
    if rules.is_empty() {
        return String::new();
    }
    let mut out = String::from("## Rules\n");
    for rule in rules {
        out.push_str(&format!("\n#### {}\n\n", rule.title));
        if !rule.is_global() {
            out.push_str(&format!("Applies to {}.\n\n", code_list(&rule.applies_to)));
        }
        out.push_str(rule.content.trim_end());
        out.push('\n');
    }
    out
}

/// `## Agents` section with one `###` block per agent.
pub(crate) fn agent_sections(agents: &[AgentRecommendation]) -> String {
    if agents.is_empty() {
        return String::new();
    }
    let mut out = String::from("## Agents\n");
    for agent in agents {
        out.push_str(&format!("\n### {}\n\n", agent.name));
        out.push_str(&single_line(&agent.description));
        out.push_str("\n\n");
        out.push_str(&trigger_line(agent));
        out.push_str("\n\n");
        for cap in &agent.capabilities {
            out.push_str(&format!("- {}\n", cap));
        }
    }
    out
}

/// Compact bullet list of agents for destinations that also emit per-agent files.
pub(crate) fn agent_summary(agents: &[AgentRecommendation], location: &str) -> String {
    if agents.is_empty() {
        return String::new();
    }
    let mut out = format!("## Agents\n\nSpecialist agents live in `{}`:\n\n", location);
    for agent in agents {
        out.push_str(&format!(
            "- `{}`: {}\n",
            agent.id,
            single_line(&agent.description)
        ));
    }
    out
}

/// Join non-empty sections with blank lines.
pub(crate) fn join_sections(sections: &[String]) -> String {
    let mut out = String::new();
    for section in sections.iter().filter(|s| !s.trim().is_empty()) {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(section.trim_end());
        out.push('\n');
    }
    out
}
