//! Rule template catalog.
//!
//! Rules are binary: `applies` decides inclusion and the priority is fixed here.
//! Materializers may add paragraphs based on sibling facts in the snapshot.

use super::agents::{BACKEND_FRAMEWORKS, ORMS, test_globs};
use super::{RuleBody, RuleTemplate};
use crate::core::model::{AgentCategory, Priority};
use crate::core::snapshot::TechStackSnapshot;

fn globs(patterns: &[&str]) -> Vec<String> {
    patterns.iter().map(|p| p.to_string()).collect()
}

fn paragraphs(parts: &[&str]) -> String {
    parts.join("\n\n")
}

// ---- typescript-conventions ----

fn applies_typescript(s: &TechStackSnapshot) -> bool {
    s.has_language("typescript")
}

fn materialize_typescript(s: &TechStackSnapshot) -> RuleBody {
    let mut parts = vec![
        "- Prefer `unknown` over `any`; narrow with type guards.\n\
         - Export explicit return types from public functions.\n\
         - Model variants with discriminated unions instead of optional flags."
            .to_string(),
    ];
    if !s.linting.is_empty() {
        let linters: Vec<&str> = s.linting.iter().map(|t| t.name.as_str()).collect();
        parts.push(format!(
            "Lint findings from {} are errors, not suggestions. Fix them before committing.",
            linters.join(", ")
        ));
    }
    RuleBody {
        content: parts.join("\n\n"),
        applies_to: globs(&["**/*.ts", "**/*.tsx"]),
    }
}

// ---- react-patterns ----

fn applies_react(s: &TechStackSnapshot) -> bool {
    s.has_any_framework(&["react", "next.js"])
}

fn materialize_react(s: &TechStackSnapshot) -> RuleBody {
    let mut parts = vec![
        "- Use function components and hooks.\n\
         - Derive values during render instead of syncing them through effects.\n\
         - Keys must be stable identifiers, never array indexes for dynamic lists.",
    ];
    if s.has_framework("next.js") {
        parts.push(
            "Next.js: components are server components by default. Add `\"use client\"` only \
             to leaves that need state or browser APIs, and fetch data in server components.",
        );
    }
    RuleBody {
        content: paragraphs(&parts),
        applies_to: globs(&["**/*.tsx", "**/*.jsx"]),
    }
}

// ---- python-style ----

fn applies_python(s: &TechStackSnapshot) -> bool {
    s.has_language("python")
}

fn materialize_python(s: &TechStackSnapshot) -> RuleBody {
    let mut parts = vec![
        "- Type-annotate public functions and run the type checker in CI.\n\
         - Prefer dataclasses or pydantic models to loose dicts.\n\
         - Keep imports absolute and grouped: stdlib, third-party, local.",
    ];
    if s.has_framework("fastapi") {
        parts.push("FastAPI: declare request and response models; never return ORM objects directly.");
    }
    if s.has_framework("django") {
        parts.push("Django: keep business logic out of views; use select_related to avoid N+1 queries.");
    }
    RuleBody {
        content: paragraphs(&parts),
        applies_to: globs(&["**/*.py"]),
    }
}

// ---- rust-idioms ----

fn applies_rust(s: &TechStackSnapshot) -> bool {
    s.has_language("rust")
}

fn materialize_rust(_s: &TechStackSnapshot) -> RuleBody {
    RuleBody {
        content: "- Return `Result` and propagate with `?`; no `unwrap()` outside tests.\n\
                  - Borrow before cloning; clone only at ownership boundaries.\n\
                  - Keep `unsafe` blocks minimal and document their invariants."
            .to_string(),
        applies_to: globs(&["**/*.rs"]),
    }
}

// ---- go-conventions ----

fn applies_go(s: &TechStackSnapshot) -> bool {
    s.has_language("go")
}

fn materialize_go(_s: &TechStackSnapshot) -> RuleBody {
    RuleBody {
        content: "- Wrap errors with context using `fmt.Errorf(\"...: %w\", err)`.\n\
                  - Accept interfaces, return structs.\n\
                  - Pass `context.Context` as the first parameter of blocking calls."
            .to_string(),
        applies_to: globs(&["**/*.go"]),
    }
}

// ---- testing-standards ----

fn applies_testing(s: &TechStackSnapshot) -> bool {
    !s.testing.is_empty()
}

fn materialize_testing(s: &TechStackSnapshot) -> RuleBody {
    let names: Vec<&str> = s.testing.iter().map(|t| t.name.as_str()).collect();
    RuleBody {
        content: format!(
            "Tests run with {}.\n\n\
             - One behavior per test; name tests after the behavior.\n\
             - Avoid sleeping in tests; wait on explicit conditions.\n\
             - New features ship with tests; bug fixes ship with a regression test.",
            names.join(", ")
        ),
        applies_to: test_globs(s),
    }
}

// ---- database-access ----

fn applies_database(s: &TechStackSnapshot) -> bool {
    !s.databases.is_empty()
}

fn materialize_database(s: &TechStackSnapshot) -> RuleBody {
    let mut parts = vec![
        "- Parameterize every query; never build SQL with string concatenation.\n\
         - Every schema change is a migration checked into version control.\n\
         - Wrap multi-statement writes in a transaction.",
    ];
    if s.has_any_framework(&ORMS) {
        parts.push("Use the ORM's query builder; drop to raw SQL only for measured hot paths.");
    }
    RuleBody {
        content: paragraphs(&parts),
        applies_to: globs(&["**/*.sql", "migrations/**", "prisma/**", "db/**"]),
    }
}

// ---- styling-system ----

fn applies_styling(s: &TechStackSnapshot) -> bool {
    !s.styling.is_empty()
}

fn materialize_styling(s: &TechStackSnapshot) -> RuleBody {
    let mut parts = vec![
        "- Reuse design tokens for color, spacing, and typography.\n\
         - Keep component styles colocated with the component.",
    ];
    if s.has_styling("tailwind") || s.has_styling("tailwindcss") {
        parts.push("Tailwind: compose utilities in markup; extract a component, not an @apply class, when a pattern repeats.");
    }
    RuleBody {
        content: paragraphs(&parts),
        applies_to: globs(&["**/*.css", "**/*.scss", "**/*.tsx", "**/*.vue"]),
    }
}

// ---- api-design ----

fn applies_api(s: &TechStackSnapshot) -> bool {
    s.has_any_framework(&BACKEND_FRAMEWORKS)
}

fn materialize_api(_s: &TechStackSnapshot) -> RuleBody {
    RuleBody {
        content: "- Validate request bodies at the handler boundary.\n\
                  - Use consistent error envelopes with a machine-readable code.\n\
                  - Version breaking changes instead of mutating existing routes."
            .to_string(),
        applies_to: globs(&["**/api/**", "**/routes/**", "**/handlers/**"]),
    }
}

// ---- monorepo-boundaries ----

fn applies_monorepo(s: &TechStackSnapshot) -> bool {
    s.file_tree.has_monorepo
}

fn materialize_monorepo(s: &TechStackSnapshot) -> RuleBody {
    let packages = s.file_tree.monorepo_packages.clone().unwrap_or_default();
    let applies_to = if packages.is_empty() {
        globs(&["packages/**", "apps/**"])
    } else {
        packages
            .iter()
            .map(|p| format!("{}/**", p.trim_end_matches('/')))
            .collect()
    };
    RuleBody {
        content: "- Import other packages through their public entry point only.\n\
                  - Declare every cross-package dependency in the package manifest.\n\
                  - Run the affected packages' tests, not just the one you edited."
            .to_string(),
        applies_to,
    }
}

// ---- always-on rules ----

fn always(_s: &TechStackSnapshot) -> bool {
    true
}

fn materialize_security(_s: &TechStackSnapshot) -> RuleBody {
    RuleBody {
        content: "- Never commit secrets, tokens, or credentials; read them from the environment.\n\
                  - Treat all external input as untrusted.\n\
                  - Do not disable TLS verification or security headers."
            .to_string(),
        applies_to: globs(&["**/*"]),
    }
}

fn materialize_git(s: &TechStackSnapshot) -> RuleBody {
    let mut content = "- Write commit subjects in the imperative mood, under 72 characters.\n\
                       - Keep commits focused on one logical change."
        .to_string();
    if let Some(cmd) = s.package_manager.install_command() {
        content.push_str(&format!(
            "\n- After pulling dependency changes, run `{}`.",
            cmd
        ));
    }
    RuleBody {
        content,
        applies_to: globs(&["**/*"]),
    }
}

pub static RULE_CATALOG: &[RuleTemplate] = &[
    RuleTemplate {
        id: "typescript-conventions",
        title: "TypeScript Conventions",
        priority: Priority::High,
        category: AgentCategory::General,
        applies: applies_typescript,
        materialize: materialize_typescript,
    },
    RuleTemplate {
        id: "react-patterns",
        title: "React Patterns",
        priority: Priority::High,
        category: AgentCategory::Ui,
        applies: applies_react,
        materialize: materialize_react,
    },
    RuleTemplate {
        id: "python-style",
        title: "Python Style",
        priority: Priority::Medium,
        category: AgentCategory::General,
        applies: applies_python,
        materialize: materialize_python,
    },
    RuleTemplate {
        id: "rust-idioms",
        title: "Rust Idioms",
        priority: Priority::High,
        category: AgentCategory::General,
        applies: applies_rust,
        materialize: materialize_rust,
    },
    RuleTemplate {
        id: "go-conventions",
        title: "Go Conventions",
        priority: Priority::Medium,
        category: AgentCategory::General,
        applies: applies_go,
        materialize: materialize_go,
    },
    RuleTemplate {
        id: "testing-standards",
        title: "Testing Standards",
        priority: Priority::Medium,
        category: AgentCategory::Testing,
        applies: applies_testing,
        materialize: materialize_testing,
    },
    RuleTemplate {
        id: "database-access",
        title: "Database Access",
        priority: Priority::Medium,
        category: AgentCategory::Database,
        applies: applies_database,
        materialize: materialize_database,
    },
    RuleTemplate {
        id: "styling-system",
        title: "Styling System",
        priority: Priority::Low,
        category: AgentCategory::Ui,
        applies: applies_styling,
        materialize: materialize_styling,
    },
    RuleTemplate {
        id: "api-design",
        title: "API Design",
        priority: Priority::Medium,
        category: AgentCategory::Api,
        applies: applies_api,
        materialize: materialize_api,
    },
    RuleTemplate {
        id: "monorepo-boundaries",
        title: "Monorepo Boundaries",
        priority: Priority::Medium,
        category: AgentCategory::General,
        applies: applies_monorepo,
        materialize: materialize_monorepo,
    },
    RuleTemplate {
        id: "security-baseline",
        title: "Security Baseline",
        priority: Priority::High,
        category: AgentCategory::Security,
        applies: always,
        materialize: materialize_security,
    },
    RuleTemplate {
        id: "git-workflow",
        title: "Git Workflow",
        priority: Priority::Low,
        category: AgentCategory::General,
        applies: always,
        materialize: materialize_git,
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::snapshot::Tool;

    fn framework(name: &str) -> Tool {
        Tool {
            name: name.to_string(),
            version: None,
            confidence: None,
        }
    }

    #[test]
    fn react_rule_adds_next_paragraph_only_with_next() {
        let mut snap = TechStackSnapshot {
            frameworks: vec![framework("React")],
            ..Default::default()
        };
        assert!(!materialize_react(&snap).content.contains("Next.js"));
        snap.frameworks.push(framework("Next.js"));
        assert!(materialize_react(&snap).content.contains("use client"));
    }

    #[test]
    fn monorepo_rule_targets_declared_packages() {
        let mut snap = TechStackSnapshot::default();
        snap.file_tree.has_monorepo = true;
        snap.file_tree.monorepo_packages = Some(vec!["apps/web/".into(), "packages/ui".into()]);
        assert_eq!(
            materialize_monorepo(&snap).applies_to,
            vec!["apps/web/**".to_string(), "packages/ui/**".to_string()]
        );
    }

    #[test]
    fn always_on_rules_target_everything() {
        let snap = TechStackSnapshot::default();
        assert_eq!(materialize_security(&snap).applies_to, vec!["**/*".to_string()]);
        assert!(!materialize_git(&snap).content.contains("After pulling"));
    }
}
