//! Windsurf: a single `.windsurfrules` file with a hard character ceiling.
//!
//! Rules are ordered by priority so truncation drops the least important text.

use super::{agent_sections, join_sections, rules_section};
use crate::core::contract::{DestinationTool, WINDSURF_MAIN};
use crate::core::model::{DestinationArtifact, Recommendations, RuleRecommendation};
use crate::core::snapshot::TechStackSnapshot;

pub fn render(snapshot: &TechStackSnapshot, recs: &Recommendations) -> Vec<DestinationArtifact> {
    let mut rules: Vec<RuleRecommendation> = recs.rules.clone();
    rules.sort_by_key(|r| r.priority);

    let header = format!("# Project Rules\n\nStack: {}\n", snapshot.stack_summary());
    let content = join_sections(&[header, rules_section(&rules), agent_sections(&recs.agents)]);
    vec![DestinationArtifact::new(
        DestinationTool::Windsurf.key(),
        WINDSURF_MAIN,
        content,
        "Workspace rules (truncated past the character limit)",
    )]
}
