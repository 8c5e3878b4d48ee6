use serde_json::{Value, json};
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::tempdir;

fn stackcraft(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_stackcraft"))
        .current_dir(dir)
        .env("NO_COLOR", "1")
        .env_remove("STACKCRAFT_TRACE")
        .args(args)
        .output()
        .expect("failed to execute stackcraft")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn assert_success(output: &Output, args: &[&str]) {
    assert!(
        output.status.success(),
        "stackcraft {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
}

fn write_snapshot(dir: &Path) -> String {
    let snapshot = json!({
        "languages": [{ "name": "Rust", "fileCount": 80, "extensions": [".rs"] }],
        "frameworks": [{ "name": "axum", "version": "0.7" }],
        "testing": [{ "name": "cargo-test" }],
        "databases": [{ "name": "PostgreSQL" }],
        "packageManager": "cargo",
        "fileTree": { "totalFiles": 120, "topLevelDirs": ["src", "tests"] }
    });
    let path = dir.join("snapshot.json");
    fs::write(&path, serde_json::to_string_pretty(&snapshot).unwrap()).unwrap();
    path.to_string_lossy().to_string()
}

#[test]
fn version_prints_the_package_version() {
    let dir = tempdir().unwrap();
    let out = stackcraft(dir.path(), &["version"]);
    assert_success(&out, &["version"]);
    assert_eq!(stdout(&out).trim(), format!("v{}", env!("CARGO_PKG_VERSION")));
}

#[test]
fn recommend_emits_json() {
    let dir = tempdir().unwrap();
    let snapshot = write_snapshot(dir.path());
    let args = ["recommend", "--snapshot", snapshot.as_str(), "--format", "json"];
    let out = stackcraft(dir.path(), &args);
    assert_success(&out, &args);

    let value: Value = serde_json::from_str(&stdout(&out)).unwrap();
    let agents = value["agents"].as_array().unwrap();
    assert!(agents.iter().any(|a| a["id"] == "rust-specialist"));
    assert!(agents.iter().all(|a| a["confidence"].as_u64().unwrap() >= 40));
}

#[test]
fn generated_files_validate_cleanly() {
    let dir = tempdir().unwrap();
    let snapshot = write_snapshot(dir.path());
    fs::create_dir_all(dir.path().join("src")).unwrap();
    fs::write(dir.path().join("src/main.rs"), "fn main() {}\n").unwrap();

    let gen_args = [
        "generate",
        "--snapshot",
        snapshot.as_str(),
        "--tool",
        "claude",
        "--tool",
        "cursor",
        "--write",
    ];
    let out = stackcraft(dir.path(), &gen_args);
    assert_success(&out, &gen_args);
    assert!(dir.path().join("CLAUDE.md").is_file());
    assert!(dir.path().join(".claude/agents/rust-specialist.md").is_file());
    assert!(dir.path().join(".cursor/rules/rust-idioms.mdc").is_file());

    let out = stackcraft(dir.path(), &["validate", "--format", "json"]);
    assert_success(&out, &["validate"]);
    let report: Value = serde_json::from_str(&stdout(&out)).unwrap();
    assert_eq!(report["found"], report["valid"]);
    assert!(report["errors"].as_array().unwrap().is_empty());
}

#[test]
fn generate_does_not_overwrite_without_force() {
    let dir = tempdir().unwrap();
    let snapshot = write_snapshot(dir.path());
    fs::write(dir.path().join("GEMINI.md"), "hand written\n").unwrap();

    let args = ["generate", "--snapshot", snapshot.as_str(), "--tool", "gemini", "--write"];
    let out = stackcraft(dir.path(), &args);
    assert_success(&out, &args);
    assert_eq!(fs::read_to_string(dir.path().join("GEMINI.md")).unwrap(), "hand written\n");

    let forced = ["generate", "--snapshot", snapshot.as_str(), "--tool", "gemini", "--write", "--force"];
    let out = stackcraft(dir.path(), &forced);
    assert_success(&out, &forced);
    assert!(fs::read_to_string(dir.path().join("GEMINI.md")).unwrap().starts_with("# GEMINI.md"));
}

#[test]
fn validate_fails_on_contract_errors() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join(".claude/agents")).unwrap();
    fs::write(
        dir.path().join(".claude/agents/reviewer.md"),
        "---\ndescription: Review code\n---\n\nBody.\n",
    )
    .unwrap();

    let out = stackcraft(dir.path(), &["validate"]);
    assert!(!out.status.success());
    assert!(stdout(&out).contains("`name`"));
}

#[test]
fn prune_reports_dead_globs() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join(".cursor/rules")).unwrap();
    fs::create_dir_all(dir.path().join("src")).unwrap();
    fs::write(dir.path().join("src/index.ts"), "export {};\n").unwrap();
    fs::write(
        dir.path().join(".cursor/rules/python.mdc"),
        "---\ndescription: Python\nglobs: \"**/*.py\"\n---\n\nUse type hints everywhere.\n",
    )
    .unwrap();

    let out = stackcraft(dir.path(), &["prune", "--format", "json"]);
    assert_success(&out, &["prune"]);
    let report: Value = serde_json::from_str(&stdout(&out)).unwrap();
    assert_eq!(report["candidates"][0]["reason"], "dead-globs");
    assert_eq!(report["candidates"][0]["filePath"], ".cursor/rules/python.mdc");
}

#[test]
fn unknown_destination_is_rejected() {
    let dir = tempdir().unwrap();
    let snapshot = write_snapshot(dir.path());
    let out = stackcraft(dir.path(), &["generate", "--snapshot", snapshot.as_str(), "--tool", "notepad"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("notepad"));
}

#[test]
fn invalid_policy_config_is_rejected() {
    let dir = tempdir().unwrap();
    let snapshot = write_snapshot(dir.path());
    fs::create_dir_all(dir.path().join(".stackcraft")).unwrap();
    fs::write(
        dir.path().join(".stackcraft/config.toml"),
        "[policy]\noverlap_threshold = 1.5\n",
    )
    .unwrap();

    let out = stackcraft(dir.path(), &["recommend", "--snapshot", snapshot.as_str()]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("overlap_threshold"));
}

#[test]
fn stricter_policy_config_trims_agents() {
    let dir = tempdir().unwrap();
    let snapshot = write_snapshot(dir.path());
    let args = ["recommend", "--snapshot", snapshot.as_str(), "--format", "json"];

    let loose: Value = serde_json::from_str(&stdout(&stackcraft(dir.path(), &args))).unwrap();
    fs::create_dir_all(dir.path().join(".stackcraft")).unwrap();
    fs::write(
        dir.path().join(".stackcraft/config.toml"),
        "[policy]\ninclusion_threshold = 90\n",
    )
    .unwrap();
    let strict: Value = serde_json::from_str(&stdout(&stackcraft(dir.path(), &args))).unwrap();

    assert!(strict["agents"].as_array().unwrap().len() < loose["agents"].as_array().unwrap().len());
}
