// crates/docspec-cli/tests/commands.rs
// ============================================================================
// Module: CLI Command Tests
// Description: Integration tests for the run, lint, and capabilities commands.
// Purpose: Ensure exit statuses, report output, and diagnostics are stable.
// Dependencies: docspec-cli binary, serde_json, tempfile
// ============================================================================

//! ## Overview
//! Runs the `docspec` binary against temporary fixture documents. The child
//! environment is cleared of `DOCSPEC_*` variables so ambient settings do not
//! leak into assertions.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use std::process::Output;

use tempfile::TempDir;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Environment variables that would change CLI behavior.
const DOCSPEC_VARS: &[&str] =
    &["DOCSPEC_CONFIG", "DOCSPEC_ASSERT_HEALTH", "DOCSPEC_ENTRYPOINT", "DOCSPEC_ENV_ALLOWLIST"];

fn docspec_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_docspec"))
}

/// Runs the binary inside `dir` with a scrubbed environment.
fn docspec(dir: &Path, args: &[&str]) -> Output {
    let mut command = Command::new(docspec_bin());
    command.current_dir(dir).args(args);
    for name in DOCSPEC_VARS {
        command.env_remove(name);
    }
    command.output().expect("run docspec")
}

fn fenced(yaml: &str) -> String {
    format!("# Fixture\n\n```spec-test yaml\n{yaml}\n```\n")
}

fn fixture_dir(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().expect("temp dir");
    for (name, contents) in files {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent");
        }
        fs::write(path, contents).expect("write fixture");
    }
    dir
}

fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

// ============================================================================
// SECTION: Tests
// ============================================================================

/// Verifies a passing run writes the report and exits zero.
#[test]
fn run_writes_report_and_succeeds() {
    let dir = fixture_dir(&[
        ("cases/subject.txt", "hello world"),
        (
            "cases/a.spec.md",
            &fenced(
                "id: t1\ntype: text.file\npath: subject.txt\nassert: {target: text, must: [{contain: [hello]}]}",
            ),
        ),
        ("cases/notes.md", &fenced("id: ignored\ntype: http.get")),
    ]);
    let output = docspec(dir.path(), &["run", "--cases", "cases", "--out", "out/report.json"]);
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr_of(&output));
    assert!(stdout_of(&output).contains("wrote out/report.json"));

    let text = fs::read_to_string(dir.path().join("out/report.json")).expect("report");
    let report: serde_json::Value = serde_json::from_str(&text).expect("report json");
    assert_eq!(report["results"].as_array().map(Vec::len), Some(1));
    assert_eq!(report["results"][0]["id"], "t1");
    assert_eq!(report["results"][0]["status"], "pass");
}

/// Verifies any failing case makes the run exit one.
#[test]
fn run_exits_one_when_a_case_fails() {
    let dir = fixture_dir(&[
        ("cases/subject.txt", "goodbye"),
        (
            "cases/a.spec.md",
            &fenced(
                "id: t1\ntype: text.file\npath: subject.txt\nassert: {target: text, must: [{contain: [hello]}]}",
            ),
        ),
    ]);
    let output = docspec(dir.path(), &["run", "--cases", "cases", "--out", "report.json"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout_of(&output).contains("1 case(s): 0 passed, 1 failed, 0 skipped"));
    let text = fs::read_to_string(dir.path().join("report.json")).expect("report");
    assert!(text.contains("\"category\": \"assertion\""), "report: {text}");
}

/// Verifies a skipped case does not fail the run.
#[test]
fn run_skips_missing_capabilities() {
    let dir = fixture_dir(&[(
        "a.spec.md",
        &fenced("id: xp\ntype: text.file\nrequires: {capabilities: [assert.op.xpath], when_missing: skip}"),
    )]);
    let output = docspec(dir.path(), &["run", "--cases", "a.spec.md", "--out", "report.json"]);
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr_of(&output));
    assert!(stdout_of(&output).contains("0 passed, 0 failed, 1 skipped"));
}

/// Verifies undecodable fixtures abort the run.
#[test]
fn run_aborts_on_undecodable_fixture() {
    let dir = fixture_dir(&[("a.spec.md", "```spec-test yaml\n: : :\n  - [\n```\n")]);
    let output = docspec(dir.path(), &["run", "--cases", ".", "--out", "report.json"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr_of(&output).starts_with("ERROR: "), "stderr: {}", stderr_of(&output));
    assert!(!dir.path().join("report.json").exists());
}

/// Verifies invocation errors exit two.
#[test]
fn usage_errors_exit_two() {
    let dir = fixture_dir(&[("a.spec.md", &fenced("id: a\ntype: text.file"))]);
    let missing = docspec(dir.path(), &["run", "--cases", "nowhere", "--out", "r.json"]);
    assert_eq!(missing.status.code(), Some(2));
    assert!(stderr_of(&missing).contains("ERROR: cases path does not exist: nowhere"));

    let blank = docspec(
        dir.path(),
        &["run", "--cases", ".", "--out", "r.json", "--case-file-pattern", " "],
    );
    assert_eq!(blank.status.code(), Some(2));
    assert!(stderr_of(&blank).contains("--case-file-pattern requires a non-empty value"));

    let unknown = docspec(dir.path(), &["run", "--cases", "."]);
    assert_eq!(unknown.status.code(), Some(2));
}

/// Verifies warn-mode diagnostics are printed while the run proceeds.
#[test]
fn run_prints_assert_health_warnings() {
    let dir = fixture_dir(&[
        ("docspec.toml", "[runner]\nassert_health = \"warn\"\n"),
        (
            "a.spec.md",
            &fenced(
                "id: dup\ntype: text.file\nassert:\n  target: text\n  must:\n    - contain: [Fixture]\n    - contain: [Fixture]",
            ),
        ),
    ]);
    let output = docspec(dir.path(), &["run", "--cases", "a.spec.md", "--out", "report.json"]);
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr_of(&output));
    let stderr = stderr_of(&output);
    let line = stderr
        .lines()
        .find(|line| line.starts_with("WARN: ASSERT_HEALTH "))
        .unwrap_or_else(|| panic!("no warning in stderr: {stderr}"));
    assert!(line.starts_with("WARN: ASSERT_HEALTH AH004 at assert.must: "), "line: {line}");
    assert!(!line.contains("(dup)"), "line: {line}");
}

/// Verifies the environment overrides the config file.
#[test]
fn environment_overrides_config_file() {
    let dir = fixture_dir(&[
        ("docspec.toml", "[runner]\nassert_health = \"warn\"\n"),
        (
            "a.spec.md",
            &fenced(
                "id: dup\ntype: text.file\nassert:\n  target: text\n  must:\n    - contain: [Fixture]\n    - contain: [Fixture]",
            ),
        ),
    ]);
    let output = Command::new(docspec_bin())
        .current_dir(dir.path())
        .args(["run", "--cases", "a.spec.md", "--out", "report.json"])
        .env("DOCSPEC_ASSERT_HEALTH", "error")
        .env_remove("DOCSPEC_CONFIG")
        .output()
        .expect("run docspec");
    assert_eq!(output.status.code(), Some(1));
    let text = fs::read_to_string(dir.path().join("report.json")).expect("report");
    assert!(text.contains("assertion health check failed"), "report: {text}");
}

/// Verifies an invalid config file is fatal.
#[test]
fn invalid_config_is_fatal() {
    let dir = fixture_dir(&[
        ("docspec.toml", "[runner]\nprocess_timeout_ms = 0\n"),
        ("a.spec.md", &fenced("id: a\ntype: text.file")),
    ]);
    let output = docspec(dir.path(), &["run", "--cases", ".", "--out", "report.json"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr_of(&output).contains("ERROR: invalid config: runner.process_timeout_ms"));
}

/// Verifies the file log sink records run events.
#[test]
fn file_log_sink_records_events() {
    let dir = fixture_dir(&[("a.spec.md", &fenced("id: a\ntype: text.file"))]);
    let output = docspec(
        dir.path(),
        &[
            "run",
            "--cases",
            ".",
            "--out",
            "report.json",
            "--log-sink",
            "file",
            "--log-path",
            "logs/events.jsonl",
        ],
    );
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr_of(&output));
    let log = fs::read_to_string(dir.path().join("logs/events.jsonl")).expect("event log");
    let events: Vec<String> = log
        .lines()
        .map(|line| {
            let value: serde_json::Value = serde_json::from_str(line).expect("event json");
            value["event"].as_str().unwrap_or_default().to_string()
        })
        .collect();
    assert_eq!(events, ["run_started", "document_loaded", "case_finished", "run_finished"]);
}

/// Verifies lint prints diagnostics and fails when any are found.
#[test]
fn lint_reports_diagnostics() {
    let dir = fixture_dir(&[(
        "a.spec.md",
        &fenced(
            "- id: clean\n  type: text.file\n  assert: {target: text, must: [{contain: [a]}]}\n\
             - id: noisy\n  type: text.file\n  assert: {target: text, must: [{contain: ['']}]}",
        ),
    )]);
    let output = docspec(dir.path(), &["lint", "--cases", "."]);
    assert_eq!(output.status.code(), Some(1));
    let stdout = stdout_of(&output);
    assert!(stdout.contains("noisy: AH001 at "), "stdout: {stdout}");
    assert!(!stdout.contains("clean:"), "stdout: {stdout}");
    assert!(stdout.contains("2 case(s) checked"), "stdout: {stdout}");
}

/// Verifies lint succeeds on healthy fixtures.
#[test]
fn lint_succeeds_on_clean_fixtures() {
    let dir = fixture_dir(&[(
        "a.spec.md",
        &fenced("id: clean\ntype: text.file\nassert: {target: text, must: [{contain: [a]}]}"),
    )]);
    let output = docspec(dir.path(), &["lint", "--cases", "."]);
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout_of(&output).contains("1 case(s) checked, no assertion health issues"));
}

/// Verifies capabilities are listed sorted, one per line.
#[test]
fn capabilities_lists_sorted_names() {
    let dir = tempfile::tempdir().expect("temp dir");
    let output = docspec(dir.path(), &["capabilities"]);
    assert_eq!(output.status.code(), Some(0));
    let stdout = stdout_of(&output);
    let names: Vec<&str> = stdout.lines().collect();
    let mut sorted = names.clone();
    sorted.sort_unstable();
    assert_eq!(names, sorted);
    assert!(names.contains(&"cli.run"));
    assert!(names.contains(&"text.file"));
}

/// Verifies the version flag prints the package version.
#[test]
fn version_flag_prints_version() {
    let dir = tempfile::tempdir().expect("temp dir");
    let output = docspec(dir.path(), &["--version"]);
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout_of(&output).trim(), format!("docspec {}", env!("CARGO_PKG_VERSION")));
}
