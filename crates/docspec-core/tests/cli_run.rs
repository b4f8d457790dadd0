// crates/docspec-core/tests/cli_run.rs
// ============================================================================
// Module: cli.run Handler Tests
// Description: Harness validation, environment shaping, and output targets.
// Purpose: Ensure cli.run cases spawn, capture, and assert as documented.
// Dependencies: docspec-core, tempfile
// ============================================================================
//! ## Overview
//! Spawns real `/bin/sh` children, so the suite is Unix-only.

#![cfg(unix)]

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

mod support;

use std::time::Duration;
use std::time::Instant;

use docspec_core::CaseFormat;
use docspec_core::CaseStatus;
use docspec_core::DocumentSource;
use docspec_core::EnvAllowlist;
use docspec_core::FailureCategory;
use docspec_core::ProcessEnvironment;
use docspec_core::Report;
use docspec_core::RunSettings;
use docspec_core::Runner;
use support::TestResult;
use support::ensure;
use support::fenced;
use support::result_of;
use support::run_markdown;

/// Runs a single-document fixture with the given settings.
fn run_cases(yaml: &str, settings: RunSettings) -> TestResult<Report> {
    let (_dir, outcome) = run_markdown(&fenced(yaml), settings)?;
    Ok(outcome.report)
}

/// Asserts that case `id` failed with `category` and `message`.
fn expect_failure(report: &Report, id: &str, category: FailureCategory, message: &str) -> TestResult {
    let result = result_of(report, id)?;
    ensure(
        result.status == CaseStatus::Fail
            && result.category == Some(category)
            && result.message.as_deref() == Some(message),
        format!("{id}: unexpected {result:?}"),
    )
}

#[test]
fn echo_output_passes() -> TestResult {
    let report = run_cases(
        "id: t2\ntype: cli.run\nharness: {entrypoint: \"echo hi\"}\nexit_code: 0\nassert: {target: stdout, must: [{contain: [hi]}]}",
        RunSettings::default(),
    )?;
    ensure(result_of(&report, "t2")?.status == CaseStatus::Pass, "echo hi should pass")
}

#[test]
fn argv_is_appended_verbatim() -> TestResult {
    let report = run_cases(
        "id: argv\ntype: cli.run\nharness: {entrypoint: \"sh -c 'printf \\\"%s|\\\" \\\"$@\\\"' sh\"}\nargv: [\"a b\", 42, '$HOME']\nassert: {target: stdout, must: [{contain: ['a b|42|$HOME|']}]}",
        RunSettings::default(),
    )?;
    let result = result_of(&report, "argv")?;
    ensure(result.status == CaseStatus::Pass, format!("unexpected {result:?}"))
}

#[test]
fn exit_code_mismatch_is_an_assertion_failure() -> TestResult {
    let report = run_cases(
        "id: exit\ntype: cli.run\nharness: {entrypoint: \"sh -c 'exit 3'\"}\nexit_code: 0",
        RunSettings::default(),
    )?;
    expect_failure(&report, "exit", FailureCategory::Assertion, "[case_id=exit] exit_code expected=0 actual=3")
}

#[test]
fn expected_nonzero_exit_passes_and_stderr_is_captured() -> TestResult {
    let report = run_cases(
        "id: err\ntype: cli.run\nharness: {entrypoint: \"sh -c 'echo boom >&2; exit 2'\"}\nexit_code: 2\nassert: {target: stderr, must: [{regex: ['^boom$']}]}",
        RunSettings::default(),
    )?;
    ensure(result_of(&report, "err")?.status == CaseStatus::Pass, "stderr should match")
}

/// Runs a fixture with an explicit environment snapshot.
fn run_with_env(yaml: &str, allowlist: &str) -> TestResult<Report> {
    let dir = tempfile::tempdir()?;
    let path = support::write_file(dir.path(), "env.spec.md", &fenced(yaml))?;
    let environment = ProcessEnvironment::from_pairs([
        ("PATH", std::env::var("PATH").unwrap_or_default()),
        ("DOCSPEC_KEEP", "k".to_string()),
        ("DOCSPEC_DROP", "d".to_string()),
    ]);
    let settings = RunSettings {
        env_allowlist: EnvAllowlist::parse(Some(allowlist)),
        ..RunSettings::default()
    };
    let sources = vec![DocumentSource {
        path,
        format: CaseFormat::Markdown,
    }];
    Ok(Runner::new(settings, environment).run(&sources)?.report)
}

/// Case printing `[$name]` and expecting `printed`, with optional env overrides.
fn echo_var_case(id: &str, name: &str, env: &str, printed: &str) -> String {
    format!(
        "- id: {id}\n  type: cli.run\n  harness: {{entrypoint: \"sh -c 'echo \\\"[${name}]\\\"'\", env: {{{env}}}}}\n  assert: {{target: stdout, must: [{{contain: ['{printed}']}}]}}\n"
    )
}

#[test]
fn harness_env_overrides_apply_after_allowlist() -> TestResult {
    let yaml = [
        echo_var_case("set", "DOCSPEC_NEW", "DOCSPEC_NEW: 7", "[7]"),
        echo_var_case("kept", "DOCSPEC_KEEP", "", "[k]"),
        echo_var_case("removed", "DOCSPEC_DROP", "DOCSPEC_DROP: null", "[]"),
    ]
    .concat();
    let report = run_with_env(&yaml, "")?;
    for id in ["set", "kept", "removed"] {
        let result = result_of(&report, id)?;
        ensure(result.status == CaseStatus::Pass, format!("{id}: unexpected {result:?}"))?;
    }
    Ok(())
}

#[test]
fn allowlist_hides_unlisted_variables() -> TestResult {
    let yaml = [
        echo_var_case("hidden", "DOCSPEC_KEEP", "", "[]"),
        echo_var_case("listed", "DOCSPEC_DROP", "", "[d]"),
    ]
    .concat();
    let report = run_with_env(&yaml, "PATH, DOCSPEC_DROP")?;
    for id in ["hidden", "listed"] {
        let result = result_of(&report, id)?;
        ensure(result.status == CaseStatus::Pass, format!("{id}: unexpected {result:?}"))?;
    }
    Ok(())
}

#[test]
fn json_type_checks_stdout_shape() -> TestResult {
    let report = run_cases(
        "- id: obj\n  type: cli.run\n  harness: {entrypoint: \"echo '{\\\"ok\\\": true}'\"}\n  assert: {target: stdout, must: [{json_type: [dict]}]}\n\
         - id: arr\n  type: cli.run\n  harness: {entrypoint: \"echo '[1]'\"}\n  assert: {target: stdout, must: [{json_type: [object]}]}\n\
         - id: bad\n  type: cli.run\n  harness: {entrypoint: \"echo '{}'\"}\n  assert: {target: stdout, must: [{json_type: [tuple]}]}",
        RunSettings::default(),
    )?;
    ensure(result_of(&report, "obj")?.status == CaseStatus::Pass, "object output is a dict")?;
    expect_failure(
        &report,
        "arr",
        FailureCategory::Assertion,
        "[case_id=arr assert_path=assert.must[0] target=stdout op=json_type] expected json_type object, got list",
    )?;
    expect_failure(&report, "bad", FailureCategory::Schema, "unsupported json_type: tuple")
}

#[test]
fn stdout_path_targets_read_the_named_file() -> TestResult {
    let dir = tempfile::tempdir()?;
    let file = support::write_file(dir.path(), "out.txt", "generated content")?;
    let shown = file.display().to_string();
    let yaml = format!(
        "- id: exists\n  type: cli.run\n  harness: {{entrypoint: \"echo '{shown}'\"}}\n  assert: {{target: stdout_path, must: [{{exists: [true]}}]}}\n\
         - id: text\n  type: cli.run\n  harness: {{entrypoint: \"echo '{shown}'\"}}\n  assert: {{target: stdout_path_text, must: [{{contain: [generated]}}]}}\n\
         - id: absent\n  type: cli.run\n  harness: {{entrypoint: \"echo '{shown}.missing'\"}}\n  assert: {{target: stdout_path_text, must: [{{contain: [x]}}]}}\n\
         - id: silent\n  type: cli.run\n  harness: {{entrypoint: \"true\"}}\n  assert: {{target: stdout_path, must: [{{exists: [true]}}]}}"
    );
    let report = run_cases(&yaml, RunSettings::default())?;
    ensure(result_of(&report, "exists")?.status == CaseStatus::Pass, "path exists")?;
    ensure(result_of(&report, "text")?.status == CaseStatus::Pass, "path text matches")?;
    expect_failure(
        &report,
        "absent",
        FailureCategory::Assertion,
        "[case_id=absent assert_path=assert.must[0] target=stdout_path_text op=contain] cannot read stdout path",
    )?;
    expect_failure(
        &report,
        "silent",
        FailureCategory::Assertion,
        "[case_id=silent assert_path=assert.must[0] target=stdout_path op=exists] expected stdout to contain a path",
    )
}

#[test]
fn harness_validation_errors() -> TestResult {
    let report = run_cases(
        "- {id: shape, type: cli.run, harness: echo}\n\
         - {id: keys, type: cli.run, harness: {entrypoint: echo, cwd: /tmp}}\n\
         - {id: env, type: cli.run, harness: {entrypoint: echo, env: [A]}}\n\
         - {id: nested, type: cli.run, harness: {entrypoint: echo, env: {A: [1]}}}\n\
         - {id: blank, type: cli.run, harness: {entrypoint: '   '}}\n\
         - {id: quote, type: cli.run, harness: {entrypoint: \"echo 'open\"}}\n\
         - {id: argv, type: cli.run, harness: {entrypoint: echo}, argv: {a: 1}}\n\
         - {id: code, type: cli.run, harness: {entrypoint: echo}, exit_code: zero}\n\
         - {id: none, type: cli.run}",
        RunSettings::default(),
    )?;
    expect_failure(&report, "shape", FailureCategory::Schema, "harness must be a mapping")?;
    expect_failure(&report, "keys", FailureCategory::Schema, "unsupported harness key(s): cwd")?;
    expect_failure(&report, "env", FailureCategory::Schema, "harness.env must be a mapping")?;
    expect_failure(&report, "nested", FailureCategory::Schema, "harness.env.A must be a scalar")?;
    expect_failure(&report, "blank", FailureCategory::Schema, "cli.run requires non-empty harness.entrypoint")?;
    expect_failure(&report, "quote", FailureCategory::Schema, "harness.entrypoint has an unterminated quote")?;
    expect_failure(&report, "argv", FailureCategory::Schema, "argv must be a list or string")?;
    expect_failure(&report, "code", FailureCategory::Schema, "exit_code must be an integer")?;
    expect_failure(&report, "none", FailureCategory::Runtime, "cli.run requires explicit harness.entrypoint")
}

#[test]
fn run_default_entrypoint_applies_when_case_omits_it() -> TestResult {
    let settings = RunSettings {
        default_entrypoint: Some("echo from-default".to_string()),
        ..RunSettings::default()
    };
    let report = run_cases(
        "id: dflt\ntype: cli.run\nassert: {target: stdout, must: [{contain: [from-default]}]}",
        settings,
    )?;
    ensure(result_of(&report, "dflt")?.status == CaseStatus::Pass, "default entrypoint used")
}

#[test]
fn slow_children_are_killed_at_the_timeout() -> TestResult {
    let settings = RunSettings {
        process_timeout: Duration::from_millis(200),
        ..RunSettings::default()
    };
    let report = run_cases("id: slow\ntype: cli.run\nharness: {entrypoint: \"sleep 5\"}", settings)?;
    expect_failure(&report, "slow", FailureCategory::Runtime, "cli.run entrypoint timed out after 200 ms")
}

#[test]
fn background_children_holding_stdout_hit_the_timeout() -> TestResult {
    let settings = RunSettings {
        process_timeout: Duration::from_millis(300),
        ..RunSettings::default()
    };
    let started = Instant::now();
    let report = run_cases(
        "id: held\ntype: cli.run\nharness: {entrypoint: \"sh -c 'sleep 5 & echo hi'\"}\nassert: {target: stdout, must: [{contain: [hi]}]}",
        settings,
    )?;
    let elapsed = started.elapsed();
    ensure(elapsed < Duration::from_secs(3), format!("run took {elapsed:?}"))?;
    expect_failure(&report, "held", FailureCategory::Runtime, "cli.run entrypoint timed out after 300 ms")
}

#[test]
fn unknown_targets_and_unsupported_ops_are_schema_errors() -> TestResult {
    let report = run_cases(
        "- id: tgt\n  type: cli.run\n  harness: {entrypoint: echo}\n  assert: {target: exit_status, must: [{contain: ['0']}]}\n\
         - id: op\n  type: cli.run\n  harness: {entrypoint: echo}\n  assert: {target: stdout, must: [{exists: [true]}]}",
        RunSettings::default(),
    )?;
    expect_failure(&report, "tgt", FailureCategory::Schema, "unknown assert target: exit_status")?;
    expect_failure(&report, "op", FailureCategory::Schema, "unsupported op for stdout: exists")
}

#[test]
fn missing_program_is_a_runtime_failure() -> TestResult {
    let report = run_cases(
        "id: ghost\ntype: cli.run\nharness: {entrypoint: docspec-no-such-program-xyz}",
        RunSettings::default(),
    )?;
    let result = result_of(&report, "ghost")?;
    ensure(result.category == Some(FailureCategory::Runtime), format!("unexpected {result:?}"))
}
