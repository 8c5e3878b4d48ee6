//! Codex: a single consolidated `AGENTS.md`, measured in bytes.

use super::{agent_sections, join_sections, project_overview, rules_section};
use crate::core::contract::{CODEX_MAIN, DestinationTool};
use crate::core::model::{DestinationArtifact, Recommendations};
use crate::core::snapshot::TechStackSnapshot;

pub fn render(snapshot: &TechStackSnapshot, recs: &Recommendations) -> Vec<DestinationArtifact> {
    let content = join_sections(&[
        "# AGENTS.md\n".to_string(),
        project_overview(snapshot),
        rules_section(&recs.rules),
        agent_sections(&recs.agents),
    ]);
    vec![DestinationArtifact::new(
        DestinationTool::Codex.key(),
        CODEX_MAIN,
        content,
        "Consolidated instructions with rules and agents",
    )]
}
