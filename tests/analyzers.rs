use stackcraft::core::config::Policy;
use stackcraft::core::globs::{self, Liveness, ProjectFiles};
use stackcraft::core::model::Severity;
use stackcraft::core::snapshot::ExistingArtifact;
use stackcraft::core::validate;
use stackcraft::plugins::fixer::{self, ConflictKind, ParsedAgentRecord};
use stackcraft::plugins::prune::{self, PruneReason};

fn artifact(path: &str, content: &str) -> ExistingArtifact {
    ExistingArtifact {
        destination: String::new(),
        relative_path: path.to_string(),
        size_bytes: content.len() as u64,
        raw_content: Some(content.to_string()),
    }
}

fn ts_project() -> ProjectFiles {
    ProjectFiles::new(["src/index.ts", "src/app.ts", "src/util/format.ts", "package.json"])
}

fn agent_file(dir: &str, name: &str, description: &str, triggers: &str) -> ExistingArtifact {
    artifact(
        &format!("{}/{}.md", dir, name),
        &format!(
            "---\nname: {}\ndescription: {}\n---\n\n# {}\n\nTriggers: {}\n",
            name, description, name, triggers
        ),
    )
}

// ---- validator ----

#[test]
fn missing_name_is_an_error_naming_the_field() {
    let a = artifact(
        ".claude/agents/reviewer.md",
        "---\ndescription: Review pull requests for correctness\n---\n\nBody text here.\n",
    );
    let report = validate::validate(&[a], &ts_project());
    assert_eq!(report.found, 1);
    assert_eq!(report.valid, 0);
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].message.contains("`name`"));
    assert_eq!(report.errors[0].destination_tool, "claude");
}

#[test]
fn missing_description_is_only_a_warning() {
    let a = artifact(".claude/agents/reviewer.md", "---\nname: reviewer\n---\n\nBody text here.\n");
    let report = validate::validate(&[a], &ts_project());
    assert!(report.errors.is_empty());
    assert_eq!(report.valid, 1);
    assert!(report.warnings.iter().any(|w| w.message.contains("`description`")));
}

#[test]
fn absent_and_unterminated_frontmatter_are_errors() {
    let artifacts = [
        artifact(".github/agents/a.agent.md", "# No frontmatter\n"),
        artifact(".github/agents/b.agent.md", "---\nname: b\ndescription: Build things\n"),
    ];
    let report = validate::validate(&artifacts, &ts_project());
    assert_eq!(report.valid, 0);
    assert_eq!(report.errors.len(), 2);
}

#[test]
fn unparsable_manifest_is_an_error() {
    let report = validate::validate(&[artifact("opencode.json", "{ \"instructions\": [")], &ts_project());
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].message.contains("not valid JSON"));
}

#[test]
fn manifest_without_schema_is_a_warning_only() {
    let report = validate::validate(
        &[artifact("opencode.json", "{ \"instructions\": [\"AGENTS.md\"] }")],
        &ts_project(),
    );
    assert!(report.errors.is_empty());
    assert_eq!(report.valid, 1);
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].message.contains("$schema"));
}

#[test]
fn dead_pattern_warns_and_universal_never_does() {
    let rules = [
        artifact(
            ".cursor/rules/rust.mdc",
            "---\ndescription: Rust\nglobs: \"**/*.rs\"\n---\n\nUse clippy.\n",
        ),
        artifact(
            ".cursor/rules/all.mdc",
            "---\ndescription: All\nglobs: \"**/*\"\n---\n\nBe kind.\n",
        ),
    ];
    let report = validate::validate(&rules, &ts_project());
    assert!(report.errors.is_empty());
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].file_path, ".cursor/rules/rust.mdc");
    assert!(report.warnings[0].message.contains("currently matches no files"));

    let empty = ProjectFiles::default();
    for pattern in globs::UNIVERSAL_PATTERNS {
        assert_eq!(globs::check_pattern(pattern, &empty), Liveness::Universal);
    }
}

#[test]
fn escaping_pattern_is_an_error() {
    let a = artifact(
        ".github/instructions/up.instructions.md",
        "---\napplyTo: \"../shared/**\"\n---\n\nShared rules.\n",
    );
    let report = validate::validate(&[a], &ts_project());
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].severity, Severity::Error);
    assert!(report.errors[0].message.contains("../shared/**"));
}

#[test]
fn withheld_content_is_reported_not_failed() {
    let mut a = artifact("AGENTS.md", "");
    a.raw_content = None;
    a.size_bytes = 5_000_000;
    let report = validate::validate(&[a], &ts_project());
    assert_eq!(report.valid, 1);
    assert_eq!(report.warnings.len(), 1);
}

// ---- fixer ----

#[test]
fn overlap_four_of_five_is_flagged_once() {
    let artifacts = [
        agent_file(".claude/agents", "reviewer", "Review code before merge for bugs", "review, code, quality, check, pr"),
        agent_file(".claude/agents", "linter", "Check code style against the configured linters", "review, code, quality, check, lint"),
    ];
    let report = fixer::analyze(&artifacts, &Policy::default());
    let overlaps: Vec<_> = report.of_kind(ConflictKind::Overlap).collect();
    assert_eq!(overlaps.len(), 1);
    let msg = &overlaps[0].message;
    assert!(msg.contains(".claude/agents/reviewer.md"));
    assert!(msg.contains(".claude/agents/linter.md"));
    for shared in ["review", "code", "quality", "check"] {
        assert!(msg.contains(shared));
    }
}

#[test]
fn overlap_one_of_five_is_not_flagged() {
    let artifacts = [
        agent_file(".claude/agents", "reviewer", "Review code before merge for bugs", "review, code, quality, check, pr"),
        agent_file(".claude/agents", "dba", "Design schemas and write migrations", "review, schema, sql, query, migration"),
    ];
    let report = fixer::analyze(&artifacts, &Policy::default());
    assert_eq!(report.of_kind(ConflictKind::Overlap).count(), 0);
}

#[test]
fn overlap_is_reported_once_per_unordered_pair() {
    let artifacts: Vec<ExistingArtifact> = ["a", "b", "c"]
        .iter()
        .map(|n| agent_file(".claude/agents", n, "Review code before merge for bugs", "review, code"))
        .collect();
    let report = fixer::analyze(&artifacts, &Policy::default());
    assert_eq!(report.of_kind(ConflictKind::Overlap).count(), 3);
}

#[test]
fn same_named_agents_in_one_destination_still_overlap() {
    let artifacts = [
        agent_file(".claude/agents", "reviewer", "Review code before merge for bugs", "review, code, quality, check, pr"),
        artifact(
            ".claude/agents/reviewer-two.md",
            "---\nname: Reviewer\ndescription: Review documentation changes for accuracy\n---\n\n# Reviewer\n\nTriggers: review, code, quality, check, docs\n",
        ),
    ];
    let report = fixer::analyze(&artifacts, &Policy::default());
    let overlaps: Vec<_> = report.of_kind(ConflictKind::Overlap).collect();
    assert_eq!(overlaps.len(), 1);
    assert_eq!(overlaps[0].file_path, ".claude/agents/reviewer.md");
    assert_eq!(overlaps[0].related_files, vec![".claude/agents/reviewer-two.md".to_string()]);
    assert!(overlaps[0].message.contains("4 of 5"));
}

#[test]
fn short_description_skips_the_verb_check() {
    let artifacts = [
        agent_file(".claude/agents", "helper", "Helps", "help"),
        agent_file(
            ".claude/agents",
            "assistant",
            "A friendly general assistant for the whole team",
            "assist",
        ),
        agent_file(".claude/agents", "writer", "Write release notes from merged changes", "notes"),
    ];
    let report = fixer::analyze(&artifacts, &Policy::default());
    let vague: Vec<_> = report.of_kind(ConflictKind::Vague).collect();
    assert_eq!(vague.len(), 2);
    assert!(vague[0].message.contains("vague description"));
    assert!(vague[1].message.contains("does not say what the agent does"));
}

#[test]
fn duplicates_need_two_destinations_and_two_descriptions() {
    let shared = [
        agent_file(".claude/agents", "reviewer", "Review code before merge for bugs", "review"),
        artifact(
            ".opencode/agent/reviewer.md",
            "---\ndescription: Review code before merge for bugs\n---\n\n# Reviewer\n\nTriggers: review\n",
        ),
    ];
    let report = fixer::analyze(&shared, &Policy::default());
    assert_eq!(report.of_kind(ConflictKind::Duplicate).count(), 0);

    let diverged = [
        agent_file(".claude/agents", "reviewer", "Review code before merge for bugs", "review"),
        artifact(
            ".opencode/agent/reviewer.md",
            "---\ndescription: Review documentation for tone and accuracy\n---\n\n# Reviewer\n\nTriggers: docs\n",
        ),
    ];
    let report = fixer::analyze(&diverged, &Policy::default());
    let dupes: Vec<_> = report.of_kind(ConflictKind::Duplicate).collect();
    assert_eq!(dupes.len(), 1);
    assert_eq!(dupes[0].related_files, vec![".opencode/agent/reviewer.md".to_string()]);
}

#[test]
fn same_destination_same_name_is_not_a_duplicate() {
    let artifacts = [
        artifact("AGENTS.md", "## Reviewer\n\nReview code before merge.\n\n## Reviewer\n\nReview docs for tone.\n"),
    ];
    let report = fixer::analyze(&artifacts, &Policy::default());
    assert_eq!(report.agents.len(), 2);
    assert_eq!(report.of_kind(ConflictKind::Duplicate).count(), 0);
}

#[test]
fn records_tolerate_missing_fields() {
    let artifacts = [artifact(".claude/agents/x.md", "just some text without structure\n")];
    let report = fixer::analyze(&artifacts, &Policy::default());
    let record: &ParsedAgentRecord = &report.agents[0];
    assert!(record.name.is_none());
    assert!(record.triggers.is_empty());
    assert_eq!(
        record.description.as_deref(),
        Some("just some text without structure")
    );
}

// ---- prune ----

#[test]
fn rust_globs_in_a_typescript_project_are_dead() {
    let a = artifact(
        ".cursor/rules/rust.mdc",
        "---\ndescription: Rust idioms\nglobs: \"**/*.rs\"\n---\n\nPrefer iterators and typed errors.\n",
    );
    let report = prune::find_candidates(&[a], &ts_project(), &Policy::default());
    assert_eq!(report.scanned, 1);
    assert_eq!(report.candidates.len(), 1);
    assert_eq!(report.candidates[0].reason, PruneReason::DeadGlobs);
    assert!(report.candidates[0].message.contains("\"**/*.rs\""));
}

#[test]
fn brace_globs_matching_the_project_are_live() {
    let files = ProjectFiles::new(["src/index.ts", "src/app.tsx", "package.json"]);
    let rule = artifact(
        ".cursor/rules/typescript.mdc",
        "---\ndescription: TypeScript\nglobs: **/*.{ts,tsx}\n---\n\nPrefer explicit return types.\n",
    );

    let pruned = prune::find_candidates(std::slice::from_ref(&rule), &files, &Policy::default());
    assert!(pruned.candidates.is_empty(), "{:#?}", pruned.candidates);

    let report = validate::validate(&[rule], &files);
    assert!(report.errors.is_empty());
    assert!(report.warnings.is_empty(), "{:#?}", report.warnings);
}

#[test]
fn empty_and_dead_are_never_both_reported() {
    let a = artifact(".cursor/rules/rust.mdc", "---\nglobs: \"**/*.rs\"\n---\nok\n");
    let report = prune::find_candidates(&[a], &ts_project(), &Policy::default());
    assert_eq!(report.candidates.len(), 1);
    assert_eq!(report.candidates[0].reason, PruneReason::EmptyContent);
}

#[test]
fn live_and_unscoped_artifacts_are_kept() {
    let artifacts = [
        artifact(
            ".cursor/rules/ts.mdc",
            "---\ndescription: TS\nglobs: \"src/**/*.ts\"\n---\n\nPrefer explicit return types.\n",
        ),
        artifact("CLAUDE.md", "# CLAUDE.md\n\nRun the tests before committing.\n"),
    ];
    let report = prune::find_candidates(&artifacts, &ts_project(), &Policy::default());
    assert_eq!(report.scanned, 2);
    assert!(report.candidates.is_empty());
}
