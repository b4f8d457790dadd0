// crates/docspec-core/tests/support/mod.rs
// ============================================================================
// Module: Test Support
// Description: Shared fixtures and helpers for docspec-core integration tests.
// ============================================================================
//! ## Overview
//! Result-based assertions, temporary fixture documents, and runner helpers.

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
#![allow(dead_code, reason = "Helpers are selectively used across suites.")]

use std::error::Error;
use std::fmt;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use docspec_core::Case;
use docspec_core::CaseFormat;
use docspec_core::CaseResult;
use docspec_core::DocumentSource;
use docspec_core::NormalizeOptions;
use docspec_core::ProcessEnvironment;
use docspec_core::Report;
use docspec_core::RunOutcome;
use docspec_core::RunSettings;
use docspec_core::Runner;
use docspec_core::normalize_payload;
use tempfile::TempDir;

// ========================================================================
// Test Result Helpers
// ========================================================================

/// Standard result type used across core integration tests.
pub type TestResult<T = ()> = Result<T, Box<dyn Error>>;

/// Lightweight error type for test assertions.
#[derive(Debug)]
struct TestError {
    /// Human-readable failure message.
    message: String,
}

impl fmt::Display for TestError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.message)
    }
}

impl Error for TestError {}

/// Returns an error when a test condition fails.
///
/// # Errors
/// Returns a `TestError` when the condition is false.
pub fn ensure(condition: bool, message: impl Into<String>) -> TestResult {
    if condition {
        Ok(())
    } else {
        Err(Box::new(TestError {
            message: message.into(),
        }))
    }
}

// ========================================================================
// Fixture Helpers
// ========================================================================

/// Writes `contents` to `dir/name`, creating parent directories.
pub fn write_file(dir: &Path, name: &str, contents: &str) -> TestResult<PathBuf> {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, contents)?;
    Ok(path)
}

/// Wraps YAML in a `spec-test yaml` fence.
pub fn fenced(yaml: &str) -> String {
    format!("# Fixture\n\n```spec-test yaml\n{yaml}\n```\n")
}

/// Builds a single case from YAML attributed to `document`.
pub fn case_from_yaml(yaml: &str, document: &Path) -> TestResult<Case> {
    let payload: serde_yaml::Value = serde_yaml::from_str(yaml)?;
    let mut cases = normalize_payload(payload, document, NormalizeOptions::default())?;
    ensure(cases.len() == 1, format!("expected one case, got {}", cases.len()))?;
    Ok(cases.remove(0))
}

/// Creates a runner over the current process environment.
pub fn runner(settings: RunSettings) -> Runner {
    Runner::new(settings, ProcessEnvironment::capture())
}

/// Writes `markdown` into a fresh directory and runs it.
pub fn run_markdown(markdown: &str, settings: RunSettings) -> TestResult<(TempDir, RunOutcome)> {
    let dir = tempfile::tempdir()?;
    let path = write_file(dir.path(), "fixture.spec.md", markdown)?;
    let sources = vec![DocumentSource {
        path,
        format: CaseFormat::Markdown,
    }];
    let outcome = runner(settings).run(&sources)?;
    Ok((dir, outcome))
}

/// Returns the result for `id`, failing when absent.
pub fn result_of<'a>(report: &'a Report, id: &str) -> TestResult<&'a CaseResult> {
    report
        .results
        .iter()
        .find(|result| result.id == id)
        .ok_or_else(|| format!("no result for {id}").into())
}
