//! Gemini CLI: a single `GEMINI.md` context file.

use super::{agent_sections, join_sections, project_overview, rules_section};
use crate::core::contract::{DestinationTool, GEMINI_MAIN};
use crate::core::model::{DestinationArtifact, Recommendations};
use crate::core::snapshot::TechStackSnapshot;

pub fn render(snapshot: &TechStackSnapshot, recs: &Recommendations) -> Vec<DestinationArtifact> {
    let mut commands = String::new();
    if let Some(cmd) = snapshot.package_manager.install_command() {
        commands = format!("## Commands\n\n- Install dependencies: `{}`\n", cmd);
    }
    let content = join_sections(&[
        "# GEMINI.md\n".to_string(),
        project_overview(snapshot),
        commands,
        rules_section(&recs.rules),
        agent_sections(&recs.agents),
    ]);
    vec![DestinationArtifact::new(
        DestinationTool::Gemini.key(),
        GEMINI_MAIN,
        content,
        "Context file with overview, rules, and agents",
    )]
}
