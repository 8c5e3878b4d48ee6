//! Cursor: one `.mdc` rule per recommendation plus an always-on agents rule.

use super::{single_line, trigger_line};
use crate::core::contract::{CURSOR_AGENTS_FILE, CURSOR_RULES_DIR, DestinationTool};
use crate::core::frontmatter;
use crate::core::model::{DestinationArtifact, Recommendations, RuleRecommendation};
use crate::core::snapshot::TechStackSnapshot;

const KEY: &str = DestinationTool::Cursor.key();

fn rule_file(rule: &RuleRecommendation) -> String {
    let first_line = rule
        .content
        .lines()
        .map(|l| l.trim_start_matches("- ").trim())
        .find(|l| !l.is_empty())
        .unwrap_or("");
    let description = single_line(&format!("{}: {}", rule.title, first_line));
    let mut fields = vec![("description", description)];
    if rule.is_global() {
        fields.push(("alwaysApply", "true".to_string()));
    } else {
        fields.push(("globs", rule.applies_to.join(", ")));
        fields.push(("alwaysApply", "false".to_string()));
    }
    let mut out = frontmatter::render(&fields);
    out.push_str(&format!("\n# {}\n\n{}\n", rule.title, rule.content.trim_end()));
    out
}

pub fn render(_snapshot: &TechStackSnapshot, recs: &Recommendations) -> Vec<DestinationArtifact> {
    let mut artifacts: Vec<DestinationArtifact> = recs
        .rules
        .iter()
        .map(|rule| {
            DestinationArtifact::new(
                KEY,
                format!("{}/{}.mdc", CURSOR_RULES_DIR, rule.id),
                rule_file(rule),
                &format!("Rule ({}): {}", rule.priority, rule.title),
            )
        })
        .collect();

    if !recs.agents.is_empty() {
        let mut body = frontmatter::render(&[
            (
                "description",
                "Specialist agent personas to adopt when a request matches their triggers".to_string(),
            ),
            ("alwaysApply", "true".to_string()),
        ]);
        body.push_str("\n# Agents\n");
        for agent in &recs.agents {
            body.push_str(&format!(
                "\n## {}\n\n{}\n\n{}\n",
                agent.name,
                single_line(&agent.description),
                trigger_line(agent)
            ));
        }
        artifacts.push(DestinationArtifact::new(
            KEY,
            CURSOR_AGENTS_FILE,
            body,
            "Agent personas as an always-applied rule",
        ));
    }
    artifacts
}
