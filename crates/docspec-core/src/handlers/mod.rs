// crates/docspec-core/src/handlers/mod.rs
// ============================================================================
// Module: Case Type Handlers
// Description: Handler trait, shared assertion preamble, and text leaf dispatch.
// Purpose: Resolve a subject per case type and drive the assertion evaluator.
// Dependencies: docspec-assert, serde_yaml
// ============================================================================

//! ## Overview
//! Every case type implements [`CaseHandler`]. Before a handler runs, the
//! runner calls [`prepare_assertions`] which resolves the assert-health
//! mode, parses the tree, and lints it. Handlers then only resolve their
//! subject and map leaves onto [`crate::leaf`] operations.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod cli_run;
pub mod text_file;

// ============================================================================
// SECTION: Imports
// ============================================================================

use docspec_assert::AssertNode;
use docspec_assert::AssertResult;
use docspec_assert::Diagnostic;
use docspec_assert::HealthMode;
use docspec_assert::LeafOp;
use docspec_assert::LeafRequest;
use docspec_assert::Outcome;
use docspec_assert::format_health_failure;
use docspec_assert::lint;
use docspec_assert::parse_assertion;
use serde_yaml::Value;

use crate::cases::Case;
use crate::environment::ProcessEnvironment;
use crate::error::CaseError;
use crate::leaf::check_contain;
use crate::leaf::check_regex;
use crate::leaf::unsupported_op;
use crate::runner::RunSettings;

pub use cli_run::CliRunHandler;
pub use text_file::TextFileHandler;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Run-wide inputs available to handlers.
#[derive(Debug, Clone, Copy)]
pub struct HandlerContext<'a> {
    /// Resolved run settings.
    pub settings: &'a RunSettings,
    /// Environment snapshot taken at run start.
    pub environment: &'a ProcessEnvironment,
}

/// Evaluates cases of one type.
pub trait CaseHandler: Send + Sync {
    /// Case type name handled, such as `text.file`.
    fn case_type(&self) -> &'static str;

    /// Evaluates a case whose assertion tree has already been parsed.
    ///
    /// # Errors
    ///
    /// Returns [`CaseError`] when the case fails for any reason.
    fn evaluate(
        &self,
        case: &Case,
        tree: &AssertNode,
        context: &HandlerContext<'_>,
    ) -> Result<(), CaseError>;
}

/// Parsed assertions plus advisory diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedAssertions {
    /// Parsed assertion tree.
    pub tree: AssertNode,
    /// Diagnostics to surface as warnings (empty unless mode is `warn`).
    pub warnings: Vec<Diagnostic>,
}

// ============================================================================
// SECTION: Preamble
// ============================================================================

/// Resolves the assert-health mode for a case.
///
/// # Errors
///
/// Returns [`CaseError::Schema`] when `assert_health` is not a mapping or
/// names an unknown mode.
pub fn resolve_health_mode(case: &Case, default: HealthMode) -> Result<HealthMode, CaseError> {
    let Some(value) = case.present_field("assert_health") else {
        return Ok(default);
    };
    let Value::Mapping(mapping) = value else {
        return Err(CaseError::schema("assert_health must be a mapping when provided"));
    };
    match mapping.get("mode") {
        None | Some(Value::Null) => Ok(default),
        Some(Value::String(mode)) => mode.parse().map_err(CaseError::Schema),
        Some(_) => Err(CaseError::schema("assert_health.mode must be one of: ignore, warn, error")),
    }
}

/// Parses and lints a case's assertions under its assert-health policy.
///
/// # Errors
///
/// Returns [`CaseError::Schema`] for malformed trees or policy blocks, and
/// [`CaseError::Assertion`] when the policy is `error` and diagnostics exist.
pub fn prepare_assertions(
    case: &Case,
    default_mode: HealthMode,
) -> Result<PreparedAssertions, CaseError> {
    let mode = resolve_health_mode(case, default_mode)?;
    let tree = parse_assertion(case.field("assert").unwrap_or(&Value::Null))?;
    let diagnostics = lint(&tree);
    let warnings = match mode {
        HealthMode::Ignore => Vec::new(),
        HealthMode::Warn => diagnostics,
        HealthMode::Error if diagnostics.is_empty() => Vec::new(),
        HealthMode::Error => {
            return Err(CaseError::assertion(format_health_failure(&diagnostics)));
        }
    };
    Ok(PreparedAssertions {
        tree,
        warnings,
    })
}

/// Converts an evaluation outcome into a case result.
///
/// # Errors
///
/// Returns [`CaseError::Assertion`] for failing outcomes.
pub fn outcome_to_result(outcome: Outcome) -> Result<(), CaseError> {
    match outcome {
        Outcome::Pass => Ok(()),
        Outcome::Fail(reason) => Err(CaseError::Assertion(reason)),
    }
}

// ============================================================================
// SECTION: Text Leaves
// ============================================================================

/// Applies `contain`/`regex` leaf operations to a text subject.
///
/// # Errors
///
/// Returns a schema error for any other operation.
pub fn evaluate_text_ops(request: &LeafRequest<'_>, subject: &str) -> AssertResult<Outcome> {
    for entry in request.leaf.entries() {
        let outcome = match entry.op {
            LeafOp::Contain => check_contain(request, subject, &entry.operands),
            LeafOp::Regex => check_regex(request, subject, &entry.operands),
            LeafOp::JsonType | LeafOp::Exists => {
                return Err(unsupported_op(request.target, entry.op));
            }
        };
        if !outcome.is_pass() {
            return Ok(outcome);
        }
    }
    Ok(Outcome::Pass)
}
