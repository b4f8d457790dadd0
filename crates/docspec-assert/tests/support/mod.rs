// crates/docspec-assert/tests/support/mod.rs
// ============================================================================
// Module: Test Support
// Description: Shared helpers for assertion engine integration tests.
// ============================================================================
//! ## Overview
//! Result-based assertion helpers plus a tiny substring leaf evaluator.

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

use docspec_assert::AssertNode;
use docspec_assert::AssertResult;
use docspec_assert::LeafOp;
use docspec_assert::LeafRequest;
use docspec_assert::Outcome;
use docspec_assert::operand_text;
use docspec_assert::parse_assertion;

// ========================================================================
// Test Result Helpers
// ========================================================================

/// Standard result type used across assertion integration tests.
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
// Tree Helpers
// ========================================================================

/// Parses a YAML snippet into an assertion tree.
pub fn tree(yaml: &str) -> TestResult<AssertNode> {
    let value: serde_yaml::Value = serde_yaml::from_str(yaml)?;
    Ok(parse_assertion(&value)?)
}

/// Evaluates `contain` leaves against per-target subjects.
///
/// Targets `a` and `b` map to the provided subjects; any other target fails.
pub fn contain_against<'a>(
    a: &'a str,
    b: &'a str,
) -> impl Fn(&LeafRequest<'_>) -> AssertResult<Outcome> + 'a {
    move |request: &LeafRequest<'_>| {
        let subject = match request.target {
            "a" => a,
            "b" => b,
            other => return Ok(Outcome::fail(format!("no subject for {other}"))),
        };
        let operands = request.leaf.operands(LeafOp::Contain).unwrap_or_default();
        for operand in operands {
            let needle = operand_text(operand);
            if !subject.contains(&needle) {
                return Ok(Outcome::fail(format!(
                    "{} expected to contain: {needle}",
                    request.context("contain")
                )));
            }
        }
        Ok(Outcome::Pass)
    }
}
