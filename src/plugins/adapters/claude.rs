//! Claude: `CLAUDE.md` plus one subagent file per agent under `.claude/agents/`.

use super::{agent_summary, code_list, join_sections, project_overview, rules_section, single_line, trigger_line};
use crate::core::contract::{CLAUDE_AGENTS_DIR, CLAUDE_MAIN, DestinationTool};
use crate::core::frontmatter;
use crate::core::model::{AgentCategory, AgentRecommendation, DestinationArtifact, Recommendations};
use crate::core::snapshot::TechStackSnapshot;

const KEY: &str = DestinationTool::Claude.key();

fn tools_for(category: AgentCategory) -> &'static str {
    match category {
        AgentCategory::Review | AgentCategory::Security => "Read, Grep, Glob",
        AgentCategory::Docs => "Read, Write, Edit, Grep, Glob",
        _ => "Read, Write, Edit, Bash, Grep, Glob",
    }
}

pub(crate) fn agent_file(agent: &AgentRecommendation) -> String {
    let mut out = frontmatter::render(&[
        ("name", agent.id.clone()),
        ("description", single_line(&agent.description)),
        ("tools", tools_for(agent.category).to_string()),
    ]);
    out.push_str(&format!("\n# {}\n\n", agent.name));
    out.push_str(&format!("You are the {} for this project. {}.\n\n", agent.name, agent.reason));
    out.push_str(&trigger_line(agent));
    out.push_str("\n\n## Capabilities\n\n");
    for cap in &agent.capabilities {
        out.push_str(&format!("- {}\n", cap));
    }
    if !agent.relevant_files.is_empty() {
        out.push_str(&format!("\n## Relevant files\n\n{}\n", code_list(&agent.relevant_files)));
    }
    out
}

pub fn render(snapshot: &TechStackSnapshot, recs: &Recommendations) -> Vec<DestinationArtifact> {
    let main = join_sections(&[
        "# CLAUDE.md\n".to_string(),
        project_overview(snapshot),
        rules_section(&recs.rules),
        agent_summary(&recs.agents, CLAUDE_AGENTS_DIR),
    ]);
    let mut artifacts = vec![DestinationArtifact::new(
        KEY,
        CLAUDE_MAIN,
        main,
        "Project memory with rules and an agent index",
    )];
    for agent in &recs.agents {
        artifacts.push(DestinationArtifact::new(
            KEY,
            format!("{}/{}.md", CLAUDE_AGENTS_DIR, agent.id),
            agent_file(agent),
            &format!("Subagent: {}", agent.name),
        ));
    }
    artifacts
}
