//! GitHub Copilot: repository instructions, path-scoped instruction files, and
//! custom agent files.

use super::{agent_summary, code_list, join_sections, project_overview, rules_section, single_line, trigger_line};
use crate::core::contract::{COPILOT_AGENTS_DIR, COPILOT_INSTRUCTIONS_DIR, COPILOT_MAIN, DestinationTool};
use crate::core::frontmatter;
use crate::core::model::{DestinationArtifact, Recommendations, RuleRecommendation};
use crate::core::snapshot::TechStackSnapshot;

const KEY: &str = DestinationTool::Copilot.key();

fn instruction_file(rule: &RuleRecommendation) -> String {
    let mut out = frontmatter::render(&[("applyTo", format!("\"{}\"", rule.applies_to.join(",")))]);
    out.push_str(&format!("\n# {}\n\n{}\n", rule.title, rule.content.trim_end()));
    out
}

pub fn render(snapshot: &TechStackSnapshot, recs: &Recommendations) -> Vec<DestinationArtifact> {
    let (global, scoped): (Vec<RuleRecommendation>, Vec<RuleRecommendation>) =
        recs.rules.iter().cloned().partition(|r| r.is_global());

    let main = join_sections(&[
        "# Copilot Instructions\n".to_string(),
        project_overview(snapshot),
        rules_section(&global),
        agent_summary(&recs.agents, COPILOT_AGENTS_DIR),
    ]);
    let mut artifacts = vec![DestinationArtifact::new(
        KEY,
        COPILOT_MAIN,
        main,
        "Repository-wide instructions",
    )];

    for rule in &scoped {
        artifacts.push(DestinationArtifact::new(
            KEY,
            format!("{}/{}.instructions.md", COPILOT_INSTRUCTIONS_DIR, rule.id),
            instruction_file(rule),
            &format!("Scoped instructions: {}", rule.title),
        ));
    }

    for agent in &recs.agents {
        let mut body = frontmatter::render(&[
            ("name", agent.id.clone()),
            ("description", single_line(&agent.description)),
        ]);
        body.push_str(&format!("\n# {}\n\n{}\n\n{}\n\n", agent.name, agent.reason, trigger_line(agent)));
        for cap in &agent.capabilities {
            body.push_str(&format!("- {}\n", cap));
        }
        if !agent.relevant_files.is_empty() {
            body.push_str(&format!("\nFocus on {}.\n", code_list(&agent.relevant_files)));
        }
        artifacts.push(DestinationArtifact::new(
            KEY,
            format!("{}/{}.agent.md", COPILOT_AGENTS_DIR, agent.id),
            body,
            &format!("Custom agent: {}", agent.name),
        ));
    }
    artifacts
}
