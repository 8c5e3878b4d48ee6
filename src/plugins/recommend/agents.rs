//! Agent template catalog.
//!
//! Declaration order is the tie-break order for equal confidence.

use super::{AgentBody, AgentTemplate};
use crate::core::model::AgentCategory;
use crate::core::snapshot::TechStackSnapshot;

pub(crate) const FRONTEND_FRAMEWORKS: [&str; 9] = [
    "react", "next.js", "vue", "nuxt", "svelte", "sveltekit", "angular", "solid", "astro",
];

pub(crate) const BACKEND_FRAMEWORKS: [&str; 14] = [
    "express", "fastify", "nestjs", "hono", "django", "flask", "fastapi", "rails", "axum",
    "actix-web", "gin", "spring", "laravel", "next.js",
];

pub(crate) const ORMS: [&str; 9] = [
    "prisma", "drizzle", "typeorm", "sequelize", "sqlalchemy", "diesel", "sqlx", "gorm",
    "activerecord",
];

const AUTH_LIBRARIES: [&str; 5] = ["next-auth", "passport", "devise", "lucia", "clerk"];

fn clamp(score: u32) -> u8 {
    score.min(100) as u8
}

/// `**/*.<ext>` for every detected extension, or the universal pattern.
pub(crate) fn source_globs(snapshot: &TechStackSnapshot) -> Vec<String> {
    let globs: Vec<String> = snapshot
        .extensions()
        .into_iter()
        .map(|ext| format!("**/*.{}", ext))
        .collect();
    if globs.is_empty() {
        vec!["**/*".to_string()]
    } else {
        globs
    }
}

/// Test file patterns implied by the detected test frameworks.
pub(crate) fn test_globs(snapshot: &TechStackSnapshot) -> Vec<String> {
    let mut globs = Vec::new();
    for tool in &snapshot.testing {
        let patterns: &[&str] = match tool.name.to_ascii_lowercase().as_str() {
            "jest" | "vitest" | "mocha" | "jasmine" => {
                &["**/*.test.ts", "**/*.test.tsx", "**/*.test.js", "**/*.spec.ts"]
            }
            "playwright" | "cypress" => &["e2e/**", "**/*.e2e.ts", "cypress/**"],
            "pytest" | "unittest" => &["tests/**/*.py", "**/test_*.py"],
            "cargo-test" | "cargo test" | "nextest" => &["tests/**/*.rs"],
            "go-test" | "go test" => &["**/*_test.go"],
            "rspec" => &["spec/**/*_spec.rb"],
            "junit" => &["src/test/**"],
            _ => &[],
        };
        globs.extend(patterns.iter().map(|p| p.to_string()));
    }
    if globs.is_empty() {
        globs.push("**/*test*".to_string());
    }
    globs
}

fn lowercase_names(tools: &[crate::core::snapshot::Tool]) -> Vec<String> {
    tools.iter().map(|t| t.name.to_lowercase()).collect()
}

fn joined_names(tools: &[crate::core::snapshot::Tool]) -> String {
    tools
        .iter()
        .map(|t| t.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn has_frontend(s: &TechStackSnapshot) -> bool {
    s.has_any_framework(&FRONTEND_FRAMEWORKS)
}

fn has_backend(s: &TechStackSnapshot) -> bool {
    s.has_any_framework(&BACKEND_FRAMEWORKS)
}

fn triggers(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

// ---- code-reviewer ----

fn score_reviewer(s: &TechStackSnapshot) -> u8 {
    if s.languages.is_empty() {
        return 0;
    }
    let mut score = 50;
    if !s.linting.is_empty() {
        score += 10;
    }
    if !s.testing.is_empty() {
        score += 10;
    }
    if s.file_tree.total_files > 100 {
        score += 10;
    }
    clamp(score)
}

fn materialize_reviewer(s: &TechStackSnapshot) -> AgentBody {
    let stack = s.stack_summary();
    let mut capabilities = vec![
        "Spot logic errors and unhandled edge cases".to_string(),
        "Flag naming and structure that hurt readability".to_string(),
        "Suggest smaller, focused follow-up changes".to_string(),
    ];
    if !s.linting.is_empty() {
        capabilities.push(format!(
            "Align feedback with the configured linters ({})",
            joined_names(&s.linting)
        ));
    }
    AgentBody {
        description: format!(
            "Review code changes for correctness, readability, and {} conventions before merge",
            stack
        ),
        reason: format!("The project is written in {} and changes benefit from a consistent review pass", stack),
        triggers: triggers(&["review", "code", "quality", "check", "pr"]),
        capabilities,
        relevant_files: source_globs(s),
    }
}

// ---- test-writer ----

fn score_tests(s: &TechStackSnapshot) -> u8 {
    match s.testing.len() {
        0 if s.languages.is_empty() => 0,
        0 => 30,
        n => clamp(60 + 10 * (n as u32 - 1).min(3)),
    }
}

fn materialize_tests(s: &TechStackSnapshot) -> AgentBody {
    let frameworks = if s.testing.is_empty() {
        "the project's test runner".to_string()
    } else {
        joined_names(&s.testing)
    };
    let mut words = triggers(&["test", "tests", "coverage", "spec", "mock"]);
    words.extend(lowercase_names(&s.testing));
    AgentBody {
        description: format!("Write and maintain tests using {} with meaningful assertions", frameworks),
        reason: format!("Detected test tooling: {}", frameworks),
        triggers: words,
        capabilities: vec![
            "Write unit tests for new and changed behavior".to_string(),
            "Identify untested branches and edge cases".to_string(),
            "Replace brittle mocks with focused fixtures".to_string(),
        ],
        relevant_files: test_globs(s),
    }
}

// ---- database-expert ----

fn score_database(s: &TechStackSnapshot) -> u8 {
    if s.databases.is_empty() {
        return 0;
    }
    let mut score = 65;
    if s.has_any_framework(&ORMS) || s.build_tools.iter().any(|t| ORMS.contains(&t.name.to_ascii_lowercase().as_str())) {
        score += 10;
    }
    if s.databases.len() > 1 {
        score += 5;
    }
    clamp(score)
}

fn materialize_database(s: &TechStackSnapshot) -> AgentBody {
    let dbs = joined_names(&s.databases);
    let mut words = triggers(&["database", "schema", "migration", "query", "sql"]);
    words.extend(lowercase_names(&s.databases));
    AgentBody {
        description: format!("Design schemas, write migrations, and optimize queries for {}", dbs),
        reason: format!("The project talks to {}", dbs),
        triggers: words,
        capabilities: vec![
            "Design normalized schemas and indexes".to_string(),
            "Write reversible migrations".to_string(),
            "Diagnose slow queries".to_string(),
        ],
        relevant_files: vec![
            "**/*.sql".to_string(),
            "migrations/**".to_string(),
            "prisma/**".to_string(),
            "db/**".to_string(),
        ],
    }
}

// ---- security-auditor ----

fn score_security(s: &TechStackSnapshot) -> u8 {
    if !has_backend(s) && !has_frontend(s) {
        return if s.languages.is_empty() { 0 } else { 35 };
    }
    let mut score = 45;
    if s.has_any_framework(&AUTH_LIBRARIES) {
        score += 15;
    }
    if !s.databases.is_empty() {
        score += 10;
    }
    clamp(score)
}

fn materialize_security(s: &TechStackSnapshot) -> AgentBody {
    AgentBody {
        description: "Audit code for injection, authentication flaws, and leaked secrets".to_string(),
        reason: format!("{} exposes user-facing entry points", s.stack_summary()),
        triggers: triggers(&["security", "vulnerability", "auth", "secrets", "injection"]),
        capabilities: vec![
            "Trace untrusted input to sinks".to_string(),
            "Check authentication and authorization paths".to_string(),
            "Detect hard-coded credentials".to_string(),
        ],
        relevant_files: source_globs(s),
    }
}

// ---- ui-component-builder ----

fn score_ui(s: &TechStackSnapshot) -> u8 {
    if !has_frontend(s) {
        return 0;
    }
    let mut score = 70;
    if !s.styling.is_empty() {
        score += 10;
    }
    clamp(score)
}

fn materialize_ui(s: &TechStackSnapshot) -> AgentBody {
    let frameworks: Vec<&str> = s
        .frameworks
        .iter()
        .filter(|f| FRONTEND_FRAMEWORKS.contains(&f.name.to_ascii_lowercase().as_str()))
        .map(|f| f.name.as_str())
        .collect();
    let mut words = triggers(&["component", "ui", "layout", "accessibility", "styling"]);
    words.extend(frameworks.iter().map(|f| f.to_lowercase()));
    let mut capabilities = vec![
        "Build accessible, composable components".to_string(),
        "Keep state local and props explicit".to_string(),
    ];
    if !s.styling.is_empty() {
        capabilities.push(format!("Style with {}", joined_names(&s.styling)));
    }
    AgentBody {
        description: format!("Build and refactor {} components with accessible markup", frameworks.join("/")),
        reason: format!("Frontend framework detected: {}", frameworks.join(", ")),
        triggers: words,
        capabilities,
        relevant_files: vec![
            "**/*.tsx".to_string(),
            "**/*.jsx".to_string(),
            "**/*.vue".to_string(),
            "**/*.svelte".to_string(),
        ],
    }
}

// ---- api-designer ----

fn score_api(s: &TechStackSnapshot) -> u8 {
    if !has_backend(s) {
        return 0;
    }
    let mut score = 65;
    if !s.databases.is_empty() {
        score += 10;
    }
    clamp(score)
}

fn materialize_api(s: &TechStackSnapshot) -> AgentBody {
    let frameworks: Vec<&str> = s
        .frameworks
        .iter()
        .filter(|f| BACKEND_FRAMEWORKS.contains(&f.name.to_ascii_lowercase().as_str()))
        .map(|f| f.name.as_str())
        .collect();
    AgentBody {
        description: format!("Design and implement consistent HTTP endpoints with {}", frameworks.join(", ")),
        reason: format!("Backend framework detected: {}", frameworks.join(", ")),
        triggers: triggers(&["api", "endpoint", "route", "rest", "handler"]),
        capabilities: vec![
            "Define request and response contracts".to_string(),
            "Validate input at the boundary".to_string(),
            "Return consistent error shapes".to_string(),
        ],
        relevant_files: vec![
            "**/api/**".to_string(),
            "**/routes/**".to_string(),
            "**/handlers/**".to_string(),
        ],
    }
}

// ---- devops-engineer ----

fn score_devops(s: &TechStackSnapshot) -> u8 {
    match s.deployment.len() {
        0 if s.has_top_level_dir(".github") => 45,
        0 => 0,
        n => clamp(55 + 5 * (n as u32 - 1).min(6)),
    }
}

fn materialize_devops(s: &TechStackSnapshot) -> AgentBody {
    let targets = if s.deployment.is_empty() {
        "GitHub workflows".to_string()
    } else {
        joined_names(&s.deployment)
    };
    let mut words = triggers(&["deploy", "ci", "pipeline", "docker", "infrastructure"]);
    words.extend(lowercase_names(&s.deployment));
    AgentBody {
        description: format!("Maintain build pipelines and deployment configuration for {}", targets),
        reason: format!("Deployment signals: {}", targets),
        triggers: words,
        capabilities: vec![
            "Keep CI fast and reproducible".to_string(),
            "Write minimal container images".to_string(),
            "Manage environment configuration safely".to_string(),
        ],
        relevant_files: vec![
            ".github/workflows/**".to_string(),
            "Dockerfile".to_string(),
            "docker-compose.yml".to_string(),
        ],
    }
}

// ---- docs-writer ----

fn score_docs(s: &TechStackSnapshot) -> u8 {
    let mut score = 0;
    if s.file_tree.total_files > 50 {
        score += 45;
    }
    if s.has_top_level_dir("docs") {
        score += 20;
    }
    clamp(score)
}

fn materialize_docs(s: &TechStackSnapshot) -> AgentBody {
    AgentBody {
        description: "Write and update READMEs, guides, and API documentation alongside code changes".to_string(),
        reason: format!("{} files make written documentation worth maintaining", s.file_tree.total_files),
        triggers: triggers(&["docs", "documentation", "readme", "guide", "comments"]),
        capabilities: vec![
            "Document public interfaces".to_string(),
            "Keep setup instructions current".to_string(),
        ],
        relevant_files: vec!["**/*.md".to_string(), "docs/**".to_string()],
    }
}

// ---- performance-optimizer ----

fn score_perf(s: &TechStackSnapshot) -> u8 {
    if !(has_frontend(s) || has_backend(s)) || s.file_tree.total_files <= 200 {
        return 0;
    }
    let mut score = 50;
    if !s.databases.is_empty() {
        score += 10;
    }
    clamp(score)
}

fn materialize_perf(s: &TechStackSnapshot) -> AgentBody {
    let mut words = triggers(&["performance", "optimize", "slow", "profiling", "latency"]);
    if has_frontend(s) {
        words.push("bundle".to_string());
    }
    AgentBody {
        description: "Profile hot paths and optimize rendering, bundle size, and query latency".to_string(),
        reason: format!("A codebase of {} files has room for measurable performance work", s.file_tree.total_files),
        triggers: words,
        capabilities: vec![
            "Measure before changing".to_string(),
            "Remove redundant work on hot paths".to_string(),
        ],
        relevant_files: source_globs(s),
    }
}

// ---- monorepo-navigator ----

fn score_monorepo(s: &TechStackSnapshot) -> u8 {
    if !s.file_tree.has_monorepo {
        return 0;
    }
    let packages = s.file_tree.monorepo_packages.as_ref().map_or(0, Vec::len) as u32;
    clamp(75 + 2 * packages.min(10))
}

fn materialize_monorepo(s: &TechStackSnapshot) -> AgentBody {
    let packages = s.file_tree.monorepo_packages.clone().unwrap_or_default();
    let relevant_files = if packages.is_empty() {
        vec!["packages/**".to_string(), "apps/**".to_string()]
    } else {
        packages.iter().map(|p| format!("{}/**", p.trim_end_matches('/'))).collect()
    };
    AgentBody {
        description: "Navigate workspace packages and keep cross-package dependencies explicit".to_string(),
        reason: format!("Monorepo with {} declared packages", packages.len()),
        triggers: triggers(&["monorepo", "package", "workspace", "dependency", "boundaries"]),
        capabilities: vec![
            "Locate the owning package for a change".to_string(),
            "Prevent imports that bypass package entry points".to_string(),
        ],
        relevant_files,
    }
}

// ---- language specialists ----

fn language_score(s: &TechStackSnapshot, name: &str) -> u8 {
    match s.language(name) {
        Some(lang) => clamp(55 + (lang.file_count as u32 / 10).min(30)),
        None => 0,
    }
}

fn score_rust(s: &TechStackSnapshot) -> u8 {
    language_score(s, "rust")
}

fn materialize_rust(_s: &TechStackSnapshot) -> AgentBody {
    AgentBody {
        description: "Refactor Rust code toward idiomatic ownership, error handling, and trait design".to_string(),
        reason: "Rust sources detected".to_string(),
        triggers: triggers(&["rust", "borrow", "lifetime", "cargo", "trait"]),
        capabilities: vec![
            "Resolve borrow checker errors without needless clones".to_string(),
            "Propagate errors with typed results".to_string(),
        ],
        relevant_files: vec!["**/*.rs".to_string(), "Cargo.toml".to_string()],
    }
}

fn score_python(s: &TechStackSnapshot) -> u8 {
    language_score(s, "python")
}

fn materialize_python(_s: &TechStackSnapshot) -> AgentBody {
    AgentBody {
        description: "Refactor Python code toward typed, well-structured modules".to_string(),
        reason: "Python sources detected".to_string(),
        triggers: triggers(&["python", "typing", "pip", "venv", "asyncio"]),
        capabilities: vec![
            "Add type hints to public functions".to_string(),
            "Replace ad-hoc dicts with dataclasses".to_string(),
        ],
        relevant_files: vec!["**/*.py".to_string(), "pyproject.toml".to_string()],
    }
}

pub static AGENT_CATALOG: &[AgentTemplate] = &[
    AgentTemplate {
        id: "code-reviewer",
        name: "Code Reviewer",
        category: AgentCategory::Review,
        score: score_reviewer,
        materialize: materialize_reviewer,
    },
    AgentTemplate {
        id: "test-writer",
        name: "Test Writer",
        category: AgentCategory::Testing,
        score: score_tests,
        materialize: materialize_tests,
    },
    AgentTemplate {
        id: "database-expert",
        name: "Database Expert",
        category: AgentCategory::Database,
        score: score_database,
        materialize: materialize_database,
    },
    AgentTemplate {
        id: "security-auditor",
        name: "Security Auditor",
        category: AgentCategory::Security,
        score: score_security,
        materialize: materialize_security,
    },
    AgentTemplate {
        id: "ui-component-builder",
        name: "UI Component Builder",
        category: AgentCategory::Ui,
        score: score_ui,
        materialize: materialize_ui,
    },
    AgentTemplate {
        id: "api-designer",
        name: "API Designer",
        category: AgentCategory::Api,
        score: score_api,
        materialize: materialize_api,
    },
    AgentTemplate {
        id: "devops-engineer",
        name: "DevOps Engineer",
        category: AgentCategory::Devops,
        score: score_devops,
        materialize: materialize_devops,
    },
    AgentTemplate {
        id: "docs-writer",
        name: "Docs Writer",
        category: AgentCategory::Docs,
        score: score_docs,
        materialize: materialize_docs,
    },
    AgentTemplate {
        id: "performance-optimizer",
        name: "Performance Optimizer",
        category: AgentCategory::Perf,
        score: score_perf,
        materialize: materialize_perf,
    },
    AgentTemplate {
        id: "monorepo-navigator",
        name: "Monorepo Navigator",
        category: AgentCategory::General,
        score: score_monorepo,
        materialize: materialize_monorepo,
    },
    AgentTemplate {
        id: "rust-specialist",
        name: "Rust Specialist",
        category: AgentCategory::General,
        score: score_rust,
        materialize: materialize_rust,
    },
    AgentTemplate {
        id: "python-specialist",
        name: "Python Specialist",
        category: AgentCategory::General,
        score: score_python,
        materialize: materialize_python,
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::snapshot::{Language, Tool};

    fn tool(name: &str) -> Tool {
        Tool {
            name: name.to_string(),
            version: None,
            confidence: None,
        }
    }

    #[test]
    fn catalog_ids_are_unique() {
        let mut ids: Vec<&str> = AGENT_CATALOG.iter().map(|t| t.id).collect();
        ids.sort();
        let before = ids.len();
        ids.dedup();
        assert_eq!(before, ids.len());
    }

    #[test]
    fn empty_snapshot_scores_nothing() {
        let snap = TechStackSnapshot::default();
        for template in AGENT_CATALOG {
            assert_eq!((template.score)(&snap), 0, "{}", template.id);
        }
    }

    #[test]
    fn test_writer_tracks_framework_count() {
        let mut snap = TechStackSnapshot {
            languages: vec![Language {
                name: "TypeScript".into(),
                file_count: 10,
                extensions: vec![".ts".into()],
            }],
            ..Default::default()
        };
        assert_eq!(score_tests(&snap), 30);
        snap.testing = vec![tool("Vitest"), tool("Playwright")];
        assert_eq!(score_tests(&snap), 70);
        let body = materialize_tests(&snap);
        assert!(body.triggers.contains(&"vitest".to_string()));
        assert!(body.relevant_files.contains(&"e2e/**".to_string()));
    }

    #[test]
    fn source_globs_fall_back_to_universal() {
        assert_eq!(source_globs(&TechStackSnapshot::default()), vec!["**/*".to_string()]);
    }
}
