//! Conflict analysis over existing agent definitions.
//!
//! Agents are read back from artifacts whose contract declares an agent layout.
//! Single-agent files carry identity in frontmatter; consolidated files hold one
//! agent per `##`/`###` heading. Three detectors then run over the parsed set:
//! trigger overlap, vague descriptions, and cross-destination duplicates.
//!
//! Analysis is read-only; every finding carries a suggested fix instead of an edit.

use crate::core::config::Policy;
use crate::core::contract::{self, AgentLayout};
use crate::core::frontmatter::{self, Split};
use crate::core::model::Severity;
use crate::core::snapshot::ExistingArtifact;
use regex::Regex;
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::LazyLock;

/// Section headings that organize a consolidated file and never name an agent.
const STRUCTURAL_HEADINGS: &[&str] = &[
    "project overview",
    "overview",
    "rules",
    "guidelines",
    "conventions",
    "tech stack",
    "commands",
    "agents",
    "available agents",
    "project structure",
    "table of contents",
    "notes",
    "testing",
    "setup",
];

/// Base forms; `-s`, `-es`, `-ed` and `-ing` forms also match.
const ACTION_VERBS: &[&str] = &[
    "analyze", "audit", "automate", "build", "check", "clean", "configure", "convert", "coordinate",
    "create", "debug", "deploy", "design", "detect", "diagnose", "document", "enforce", "explain",
    "fix", "format", "generate", "guide", "handle", "identify", "implement", "improve", "inspect",
    "lint", "maintain", "manage", "migrate", "monitor", "navigate", "optimize", "orchestrate",
    "organize", "plan", "profile", "refactor", "review", "run", "scan", "secure", "test", "trace",
    "translate", "update", "validate", "verify", "write",
];

static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6})\s+(.+?)\s*#*\s*$").expect("static regex"));
static TRIGGER_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:[-*]\s+)?(?:\*\*)?triggers?(?:\*\*)?\s*:\s*(?:\*\*)?\s*(.*)$")
        .expect("static regex")
});
static BOLD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*([^*]+)\*\*").expect("static regex"));

/// One agent definition recovered from an artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedAgentRecord {
    pub destination_tool: String,
    pub source_file: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub triggers: BTreeSet<String>,
}

impl ParsedAgentRecord {
    fn label(&self) -> &str {
        self.name.as_deref().unwrap_or("<unnamed>")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictKind {
    Overlap,
    Vague,
    Duplicate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictIssue {
    #[serde(rename = "type")]
    pub kind: ConflictKind,
    pub severity: Severity,
    pub destination_tool: String,
    pub file_path: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub related_files: Vec<String>,
    pub message: String,
    pub suggested_fix: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ConflictReport {
    pub agents: Vec<ParsedAgentRecord>,
    pub issues: Vec<ConflictIssue>,
}

impl ConflictReport {
    pub fn of_kind(&self, kind: ConflictKind) -> impl Iterator<Item = &ConflictIssue> {
        self.issues.iter().filter(move |i| i.kind == kind)
    }
}

// ---- parsing ----

fn clean_inline(text: &str) -> String {
    text.trim()
        .trim_matches(|c| c == '*' || c == '_' || c == '`' || c == '"' || c == '\'')
        .trim()
        .to_string()
}

fn parse_trigger_list(raw: &str) -> BTreeSet<String> {
    raw.split(',')
        .map(|t| clean_inline(t).to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Explicit `Triggers:` line first, then `**bold**` spans.
fn extract_triggers(body: &str) -> BTreeSet<String> {
    for line in body.lines() {
        if let Some(caps) = TRIGGER_LINE.captures(line) {
            let list = parse_trigger_list(&caps[1]);
            if !list.is_empty() {
                return list;
            }
        }
    }
    BOLD.captures_iter(body)
        .map(|c| clean_inline(c[1].trim_end_matches(':')).to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

fn is_paragraph_line(line: &str) -> bool {
    let t = line.trim_start();
    !(t.is_empty()
        || t.starts_with('#')
        || t.starts_with("- ")
        || t.starts_with("* ")
        || t.starts_with("```")
        || t.starts_with('>')
        || t.starts_with('|')
        || t.starts_with("<!--")
        || t.split_once(". ").is_some_and(|(n, _)| n.chars().all(|c| c.is_ascii_digit()))
        || TRIGGER_LINE.is_match(t))
}

/// First prose paragraph, joined onto one line.
fn first_paragraph(body: &str) -> Option<String> {
    let mut lines = body.lines().skip_while(|l| !is_paragraph_line(l));
    let mut out: Vec<&str> = Vec::new();
    for line in lines.by_ref() {
        if !is_paragraph_line(line) {
            break;
        }
        out.push(line.trim());
    }
    if out.is_empty() { None } else { Some(out.join(" ")) }
}

fn first_heading(body: &str) -> Option<String> {
    body.lines()
        .find_map(|l| HEADING.captures(l).map(|c| clean_inline(&c[2])))
        .filter(|h| !h.is_empty())
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

fn parse_single(tool: &str, path: &str, content: &str) -> ParsedAgentRecord {
    let (fm, body) = match frontmatter::split(content) {
        Split::Present(fm, body) => (Some(fm), body),
        Split::Absent(body) => (None, body),
        Split::Unterminated => (None, content),
    };
    let fm_value = |key: &str| non_empty(fm.as_ref().and_then(|f| f.get(key)));

    let triggers = match fm_value("triggers") {
        Some(list) => frontmatter::split_list(&list)
            .into_iter()
            .map(|t| t.to_lowercase())
            .collect(),
        None => extract_triggers(body),
    };
    ParsedAgentRecord {
        destination_tool: tool.to_string(),
        source_file: path.to_string(),
        name: fm_value("name").or_else(|| first_heading(body)),
        description: fm_value("description").or_else(|| first_paragraph(body)),
        triggers,
    }
}

fn is_structural(heading: &str) -> bool {
    let h = heading.trim_end_matches(':').trim().to_lowercase();
    STRUCTURAL_HEADINGS.contains(&h.as_str())
}

fn parse_multi(tool: &str, path: &str, content: &str) -> Vec<ParsedAgentRecord> {
    let body = frontmatter::strip(content);
    let mut sections: Vec<(String, Vec<&str>)> = Vec::new();
    let mut current: Option<(String, Vec<&str>)> = None;
    let mut in_fence = false;

    for line in body.lines() {
        if line.trim_start().starts_with("```") {
            in_fence = !in_fence;
        }
        let heading = if in_fence { None } else { HEADING.captures(line) };
        match heading {
            Some(caps) if caps[1].len() <= 3 => {
                if let Some(done) = current.take() {
                    sections.push(done);
                }
                if caps[1].len() >= 2 {
                    current = Some((clean_inline(&caps[2]), Vec::new()));
                }
            }
            _ => {
                if let Some((_, lines)) = current.as_mut() {
                    lines.push(line);
                }
            }
        }
    }
    sections.extend(current);

    sections
        .into_iter()
        .filter(|(heading, _)| !heading.is_empty() && !is_structural(heading))
        .map(|(heading, lines)| {
            let text = lines.join("\n");
            ParsedAgentRecord {
                destination_tool: tool.to_string(),
                source_file: path.to_string(),
                name: Some(heading),
                description: first_paragraph(&text),
                triggers: extract_triggers(&text),
            }
        })
        .collect()
}

/// Agents defined in one artifact; empty for files with no agent layout.
pub fn parse_agents(artifact: &ExistingArtifact) -> Vec<ParsedAgentRecord> {
    let Some(content) = artifact.raw_content.as_deref() else {
        return Vec::new();
    };
    let Some((tool, rule)) = contract::classify(&artifact.relative_path) else {
        return Vec::new();
    };
    let path = artifact.relative_path.as_str();
    match rule.agents {
        Some(AgentLayout::Single) => vec![parse_single(tool.key(), path, content)],
        Some(AgentLayout::Multi) => parse_multi(tool.key(), path, content),
        None => Vec::new(),
    }
}

// ---- detectors ----

fn trimmed_description(agent: &ParsedAgentRecord) -> &str {
    agent.description.as_deref().unwrap_or("").trim()
}

/// One agent rendered into two destinations: same name, same description.
fn same_agent_elsewhere(a: &ParsedAgentRecord, b: &ParsedAgentRecord) -> bool {
    let (Some(x), Some(y)) = (&a.name, &b.name) else {
        return false;
    };
    a.destination_tool != b.destination_tool
        && name_key(x) == name_key(y)
        && trimmed_description(a) == trimmed_description(b)
}

fn overlap_issues(agents: &[ParsedAgentRecord], threshold: f64) -> Vec<ConflictIssue> {
    let mut issues = Vec::new();
    for (i, a) in agents.iter().enumerate() {
        for b in &agents[i + 1..] {
            if a.triggers.is_empty() || b.triggers.is_empty() {
                continue;
            }
            if same_agent_elsewhere(a, b) {
                continue;
            }
            let shared: Vec<&str> = a.triggers.intersection(&b.triggers).map(String::as_str).collect();
            let smaller = a.triggers.len().min(b.triggers.len());
            let ratio = shared.len() as f64 / smaller as f64;
            if ratio <= threshold {
                continue;
            }
            issues.push(ConflictIssue {
                kind: ConflictKind::Overlap,
                severity: Severity::Warning,
                destination_tool: a.destination_tool.clone(),
                file_path: a.source_file.clone(),
                related_files: vec![b.source_file.clone()],
                message: format!(
                    "Agents `{}` ({}) and `{}` ({}) share {} of {} triggers ({:.0}%): {}",
                    a.label(),
                    a.source_file,
                    b.label(),
                    b.source_file,
                    shared.len(),
                    smaller,
                    ratio * 100.0,
                    shared.join(", ")
                ),
                suggested_fix: Some(
                    "Narrow the triggers so each request routes to one agent, or merge the two agents"
                        .to_string(),
                ),
            });
        }
    }
    issues
}

fn is_action_word(word: &str) -> bool {
    ACTION_VERBS.iter().any(|verb| {
        let stem = verb.strip_suffix('e').unwrap_or(verb);
        let Some(rest) = word.strip_prefix(stem) else {
            return false;
        };
        if matches!(rest, "" | "e" | "s" | "es" | "ed" | "ing") {
            return true;
        }
        // run -> running, plan -> planned
        stem.len() == verb.len()
            && verb.chars().last().is_some_and(|last| {
                rest.strip_prefix(last)
                    .is_some_and(|tail| matches!(tail, "ed" | "ing"))
            })
    })
}

fn has_action_verb(text: &str) -> bool {
    text.split(|c: char| !c.is_ascii_alphabetic())
        .map(str::to_ascii_lowercase)
        .any(|w| is_action_word(&w))
}

fn vague_issues(agents: &[ParsedAgentRecord], min_chars: usize) -> Vec<ConflictIssue> {
    let mut issues = Vec::new();
    for agent in agents {
        let problem = match agent.description.as_deref().map(str::trim) {
            None | Some("") => format!("Agent `{}` has no description", agent.label()),
            Some(d) if d.chars().count() < min_chars => format!(
                "Agent `{}` has a vague description ({} chars, under {}): \"{}\"",
                agent.label(),
                d.chars().count(),
                min_chars,
                d
            ),
            Some(d) if !has_action_verb(d) => format!(
                "Agent `{}` description does not say what the agent does: \"{}\"",
                agent.label(),
                d
            ),
            Some(_) => continue,
        };
        issues.push(ConflictIssue {
            kind: ConflictKind::Vague,
            severity: Severity::Warning,
            destination_tool: agent.destination_tool.clone(),
            file_path: agent.source_file.clone(),
            related_files: Vec::new(),
            message: problem,
            suggested_fix: Some(
                "Start the description with an action verb and name the files or tasks it covers"
                    .to_string(),
            ),
        });
    }
    issues
}

fn name_key(name: &str) -> String {
    name.to_lowercase()
        .split(|c: char| c.is_whitespace() || c == '-' || c == '_')
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn duplicate_issues(agents: &[ParsedAgentRecord]) -> Vec<ConflictIssue> {
    let mut groups: FxHashMap<String, Vec<&ParsedAgentRecord>> = FxHashMap::default();
    let mut order: Vec<String> = Vec::new();
    for agent in agents {
        let Some(name) = agent.name.as_deref() else {
            continue;
        };
        let key = name_key(name);
        if key.is_empty() {
            continue;
        }
        let group = groups.entry(key.clone()).or_default();
        if group.is_empty() {
            order.push(key);
        }
        group.push(agent);
    }

    let mut issues = Vec::new();
    for key in order {
        let group = &groups[&key];
        let tools: BTreeSet<&str> = group.iter().map(|a| a.destination_tool.as_str()).collect();
        let descriptions: BTreeSet<String> = group
            .iter()
            .map(|a| trimmed_description(a).to_string())
            .collect();
        if tools.len() < 2 || descriptions.len() < 2 {
            continue;
        }
        let first = group[0];
        let locations: Vec<String> = group
            .iter()
            .map(|a| format!("{} ({})", a.source_file, a.destination_tool))
            .collect();
        issues.push(ConflictIssue {
            kind: ConflictKind::Duplicate,
            severity: Severity::Warning,
            destination_tool: first.destination_tool.clone(),
            file_path: first.source_file.clone(),
            related_files: group[1..].iter().map(|a| a.source_file.clone()).collect(),
            message: format!(
                "Agent `{}` is defined in {} destinations with {} different descriptions: {}",
                first.label(),
                tools.len(),
                descriptions.len(),
                locations.join(", ")
            ),
            suggested_fix: Some("Use one description for the agent in every destination".to_string()),
        });
    }
    issues
}

pub fn analyze(artifacts: &[ExistingArtifact], policy: &Policy) -> ConflictReport {
    let agents: Vec<ParsedAgentRecord> = artifacts.iter().flat_map(parse_agents).collect();
    let mut issues = overlap_issues(&agents, policy.overlap_threshold);
    issues.extend(vague_issues(&agents, policy.vague_min_chars));
    issues.extend(duplicate_issues(&agents));
    ConflictReport { agents, issues }
}
