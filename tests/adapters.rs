use stackcraft::core::config::Policy;
use stackcraft::core::contract::{self, DestinationTool, SizeUnit, TRUNCATION_MARKER};
use stackcraft::core::globs::ProjectFiles;
use stackcraft::core::model::{AgentCategory, Priority, Recommendations, RuleRecommendation, Severity};
use stackcraft::core::reporter::NullReporter;
use stackcraft::core::snapshot::{ExistingArtifact, FileTreeFacts, Language, PackageManager, TechStackSnapshot, Tool};
use stackcraft::core::validate;
use stackcraft::plugins::adapters::{self, SerializationOutput};
use stackcraft::plugins::fixer::{self, ConflictKind};
use stackcraft::plugins::recommend;

fn tool(name: &str) -> Tool {
    Tool {
        name: name.to_string(),
        ..Default::default()
    }
}

fn snapshot() -> TechStackSnapshot {
    TechStackSnapshot {
        languages: vec![Language {
            name: "TypeScript".into(),
            file_count: 120,
            extensions: vec![".ts".into(), ".tsx".into()],
        }],
        frameworks: vec![tool("React"), tool("Next.js")],
        testing: vec![tool("Vitest")],
        databases: vec![tool("PostgreSQL")],
        styling: vec![tool("Tailwind")],
        linting: vec![tool("ESLint")],
        package_manager: PackageManager::Npm,
        file_tree: FileTreeFacts {
            total_files: 150,
            top_level_dirs: vec!["src".into(), "app".into()],
            ..Default::default()
        },
        ..Default::default()
    }
}

fn project_files() -> ProjectFiles {
    ProjectFiles::new([
        "package.json",
        "src/index.ts",
        "src/components/Button.tsx",
        "src/components/Button.test.tsx",
        "src/lib/db.test.ts",
        "app/page.tsx",
        "app/api/users/route.ts",
        "prisma/schema.prisma",
        "migrations/001_init.sql",
        "tailwind.config.ts",
    ])
}

fn render_all() -> Vec<SerializationOutput> {
    let snap = snapshot();
    let recs = recommend::recommend(&snap, &Policy::default(), &NullReporter);
    DestinationTool::ALL
        .into_iter()
        .map(|t| adapters::serialize_for(t, &snap, &recs))
        .collect()
}

fn as_existing(outputs: &[SerializationOutput]) -> Vec<ExistingArtifact> {
    outputs
        .iter()
        .flat_map(|o| o.artifacts.iter())
        .map(|a| ExistingArtifact {
            destination: a.destination_tool.clone(),
            relative_path: a.relative_path.clone(),
            size_bytes: a.size_bytes as u64,
            raw_content: Some(a.content.clone()),
        })
        .collect()
}

fn rule(id: usize, body_len: usize) -> RuleRecommendation {
    RuleRecommendation {
        id: format!("rule-{}", id),
        title: format!("Rule {}", id),
        content: format!("- {}\n", "keep modules small and focused ".repeat(body_len / 31 + 1)),
        priority: if id % 2 == 0 { Priority::High } else { Priority::Low },
        applies_to: vec!["src/**/*.ts".to_string()],
        category: AgentCategory::General,
    }
}

fn many_rules(count: usize, body_len: usize) -> Recommendations {
    Recommendations {
        agents: Vec::new(),
        rules: (0..count).map(|i| rule(i, body_len)).collect(),
    }
}

#[test]
fn every_artifact_lands_on_a_path_its_destination_owns() {
    for output in render_all() {
        assert!(!output.artifacts.is_empty(), "{} rendered nothing", output.destination_tool);
        for artifact in &output.artifacts {
            let (tool, _) = contract::classify(&artifact.relative_path)
                .unwrap_or_else(|| panic!("{} is not a known artifact path", artifact.relative_path));
            assert_eq!(tool.key(), output.destination_tool, "{}", artifact.relative_path);
            assert_eq!(artifact.size_bytes, artifact.content.len());
        }
    }
}

#[test]
fn generated_artifacts_pass_structural_validation() {
    let outputs = render_all();
    let existing = as_existing(&outputs);
    let report = validate::validate(&existing, &project_files());
    assert_eq!(report.found, existing.len());
    assert!(report.errors.is_empty(), "{:#?}", report.errors);
    assert_eq!(report.valid, report.found);
}

#[test]
fn generated_agents_read_back_without_conflicts() {
    let outputs: Vec<SerializationOutput> = render_all()
        .into_iter()
        .filter(|o| o.destination_tool != "windsurf")
        .collect();
    let report = fixer::analyze(&as_existing(&outputs), &Policy::default());
    assert!(!report.agents.is_empty());
    assert!(report.agents.iter().all(|a| a.name.is_some() && !a.triggers.is_empty()));
    assert_eq!(report.of_kind(ConflictKind::Vague).count(), 0, "{:#?}", report.issues);
    assert_eq!(report.of_kind(ConflictKind::Duplicate).count(), 0, "{:#?}", report.issues);
}

#[test]
fn windsurf_truncates_to_exactly_the_limit() {
    let out = adapters::serialize("windsurf", &snapshot(), &many_rules(40, 300)).unwrap();
    let main = &out.artifacts[0];
    assert_eq!(out.size_unit, SizeUnit::Chars);
    assert_eq!(main.content.chars().count(), 6_000);
    assert!(main.content.ends_with(TRUNCATION_MARKER));
    assert_eq!(out.warnings.len(), 1);
    assert_eq!(out.warnings[0].severity, Severity::Warning);
    assert_eq!(out.total_size, 6_000);
}

#[test]
fn windsurf_under_the_limit_is_untouched() {
    let out = adapters::serialize("windsurf", &snapshot(), &many_rules(2, 100)).unwrap();
    assert!(out.warnings.is_empty());
    assert!(!out.artifacts[0].content.contains(TRUNCATION_MARKER.trim()));
}

#[test]
fn codex_over_the_byte_limit_asks_for_a_split_and_keeps_content() {
    let out = adapters::serialize("codex", &snapshot(), &many_rules(40, 1_000)).unwrap();
    let main = &out.artifacts[0];
    assert!(main.content.len() > 32_768);
    assert!(!main.content.contains(TRUNCATION_MARKER.trim()));
    assert_eq!(out.warnings.len(), 1);
    assert_eq!(out.warnings[0].severity, Severity::Error);
    assert_eq!(out.total_size, main.content.len());
}

#[test]
fn copilot_over_the_limit_only_warns() {
    let mut recs = many_rules(40, 1_000);
    for r in &mut recs.rules {
        r.applies_to = vec!["**/*".to_string()];
    }
    let out = adapters::serialize("copilot", &snapshot(), &recs).unwrap();
    assert_eq!(out.artifacts.len(), 1);
    assert!(out.artifacts[0].content.chars().count() > 30_000);
    assert_eq!(out.warnings.len(), 1);
    assert_eq!(out.warnings[0].severity, Severity::Warning);
    assert!(!out.artifacts[0].content.contains(TRUNCATION_MARKER.trim()));
}

#[test]
fn copilot_splits_global_and_scoped_rules() {
    let snap = snapshot();
    let recs = recommend::recommend(&snap, &Policy::default(), &NullReporter);
    let out = adapters::serialize("copilot", &snap, &recs).unwrap();
    let main = out
        .artifacts
        .iter()
        .find(|a| a.relative_path == contract::COPILOT_MAIN)
        .expect("main instructions");
    assert!(main.content.contains("Security Baseline"));

    let scoped: Vec<_> = out
        .artifacts
        .iter()
        .filter(|a| a.relative_path.ends_with(".instructions.md"))
        .collect();
    assert!(!scoped.is_empty());
    for artifact in scoped {
        assert!(artifact.content.starts_with("---\napplyTo: \""));
    }
}

#[test]
fn cursor_skips_the_agents_rule_when_there_are_no_agents() {
    let out = adapters::serialize("cursor", &snapshot(), &many_rules(3, 50)).unwrap();
    assert_eq!(out.artifacts.len(), 3);
    assert!(out.artifacts.iter().all(|a| a.relative_path != contract::CURSOR_AGENTS_FILE));
    for artifact in &out.artifacts {
        assert!(artifact.content.contains("globs: src/**/*.ts"));
        assert!(artifact.content.contains("alwaysApply: false"));
    }
}

#[test]
fn opencode_manifest_is_json_with_schema() {
    let out = adapters::serialize("opencode", &snapshot(), &Recommendations::default()).unwrap();
    let manifest = out
        .artifacts
        .iter()
        .find(|a| a.relative_path == contract::OPENCODE_MANIFEST)
        .expect("manifest");
    let value: serde_json::Value = serde_json::from_str(&manifest.content).unwrap();
    assert_eq!(value["$schema"], contract::OPENCODE_SCHEMA_URL);
    assert_eq!(value["instructions"][0], contract::OPENCODE_INSTRUCTIONS);
}

#[test]
fn serialization_is_deterministic() {
    let first = serde_json::to_string(&render_all()).unwrap();
    let second = serde_json::to_string(&render_all()).unwrap();
    assert_eq!(first, second);
}
