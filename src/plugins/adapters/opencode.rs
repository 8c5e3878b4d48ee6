//! OpenCode: `opencode.json` manifest, a shared instructions file, and one agent
//! file per agent.

use super::{code_list, join_sections, project_overview, rules_section, single_line, trigger_line};
use crate::core::contract::{
    DestinationTool, OPENCODE_AGENTS_DIR, OPENCODE_INSTRUCTIONS, OPENCODE_MANIFEST, OPENCODE_SCHEMA_URL,
};
use crate::core::frontmatter;
use crate::core::model::{AgentRecommendation, DestinationArtifact, Recommendations};
use crate::core::snapshot::TechStackSnapshot;
use serde_json::json;

const KEY: &str = DestinationTool::OpenCode.key();

fn agent_file(agent: &AgentRecommendation) -> String {
    let mut out = frontmatter::render(&[
        ("description", single_line(&agent.description)),
        ("mode", "subagent".to_string()),
    ]);
    out.push_str(&format!("\n# {}\n\n{}\n\n{}\n\n", agent.name, agent.reason, trigger_line(agent)));
    for cap in &agent.capabilities {
        out.push_str(&format!("- {}\n", cap));
    }
    if !agent.relevant_files.is_empty() {
        out.push_str(&format!("\nFocus on {}.\n", code_list(&agent.relevant_files)));
    }
    out
}

pub fn render(snapshot: &TechStackSnapshot, recs: &Recommendations) -> Vec<DestinationArtifact> {
    let manifest = json!({
        "$schema": OPENCODE_SCHEMA_URL,
        "instructions": [OPENCODE_INSTRUCTIONS],
    });
    let manifest_text = serde_json::to_string_pretty(&manifest).unwrap_or_default() + "\n";

    let instructions = join_sections(&[
        "# Project Instructions\n".to_string(),
        project_overview(snapshot),
        rules_section(&recs.rules),
    ]);

    let mut artifacts = vec![
        DestinationArtifact::new(KEY, OPENCODE_MANIFEST, manifest_text, "Project configuration manifest"),
        DestinationArtifact::new(KEY, OPENCODE_INSTRUCTIONS, instructions, "Shared instructions"),
    ];
    for agent in &recs.agents {
        artifacts.push(DestinationArtifact::new(
            KEY,
            format!("{}/{}.md", OPENCODE_AGENTS_DIR, agent.id),
            agent_file(agent),
            &format!("Subagent: {}", agent.name),
        ));
    }
    artifacts
}
