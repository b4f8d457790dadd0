// crates/docspec-core/src/handlers/cli_run.rs
// ============================================================================
// Module: cli.run Handler
// Description: Runs a command with declared argv and environment, then asserts.
// Purpose: Evaluate `cli.run` cases against stdout, stderr, and named paths.
// Dependencies: docspec-assert, serde_yaml
// ============================================================================

//! ## Overview
//! A `cli.run` case carries a `harness` mapping (`entrypoint`, `env`), an
//! `argv` string or list, and an optional `exit_code` (default 0). The
//! entrypoint falls back to the run default when the case omits it. The
//! child inherits the allow-listed environment, then `harness.env`
//! overrides apply: null removes a variable, scalars set it.
//!
//! Targets:
//! - `stdout` / `stderr`: `contain`, `regex`, `json_type`.
//! - `stdout_path`: `exists` on the first non-blank stdout line.
//! - `stdout_path_text`: `contain`, `regex` over the file that line names.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use docspec_assert::AssertError;
use docspec_assert::AssertNode;
use docspec_assert::AssertResult;
use docspec_assert::LeafOp;
use docspec_assert::LeafRequest;
use docspec_assert::Outcome;
use docspec_assert::evaluate_root;
use docspec_assert::operand_text;
use serde_yaml::Mapping;
use serde_yaml::Value;

use super::CaseHandler;
use super::HandlerContext;
use super::evaluate_text_ops;
use super::outcome_to_result;
use crate::cases::Case;
use crate::error::CaseError;
use crate::leaf::check_contain;
use crate::leaf::check_exists;
use crate::leaf::check_json_type;
use crate::leaf::check_regex;
use crate::leaf::first_non_blank_line;
use crate::leaf::unsupported_op;
use crate::process::CapturedOutput;
use crate::process::ProcessError;
use crate::process::ProcessSpec;
use crate::process::run_captured;
use crate::process::tokenize_entrypoint;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Case type handled here.
pub const CLI_RUN_TYPE: &str = "cli.run";

/// Keys accepted inside `harness`.
const HARNESS_KEYS: &[&str] = &["entrypoint", "env"];

// ============================================================================
// SECTION: Harness
// ============================================================================

/// Parsed `harness` block of a `cli.run` case.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Harness {
    /// Entrypoint declared by the case, if any.
    pub entrypoint: Option<String>,
    /// Environment overrides; `None` removes the variable.
    pub env: BTreeMap<String, Option<String>>,
}

impl Harness {
    /// Parses the `harness` field of a case.
    ///
    /// # Errors
    ///
    /// Returns [`CaseError::Schema`] when the block or its `env` is not a
    /// mapping, contains unknown keys, or holds non-scalar values.
    pub fn from_case(case: &Case) -> Result<Self, CaseError> {
        let Some(value) = case.present_field("harness") else {
            return Ok(Self::default());
        };
        let Value::Mapping(mapping) = value else {
            return Err(CaseError::schema("harness must be a mapping"));
        };
        let mut unknown: Vec<String> = mapping
            .keys()
            .map(operand_text)
            .filter(|key| !HARNESS_KEYS.contains(&key.as_str()))
            .collect();
        if !unknown.is_empty() {
            unknown.sort();
            return Err(CaseError::schema(format!(
                "unsupported harness key(s): {}",
                unknown.join(", ")
            )));
        }
        let entrypoint = match mapping.get("entrypoint") {
            None | Some(Value::Null) => None,
            Some(Value::String(raw)) => Some(raw.clone()),
            Some(_) => return Err(CaseError::schema("harness.entrypoint must be a string")),
        };
        let env = match mapping.get("env") {
            None | Some(Value::Null) => BTreeMap::new(),
            Some(Value::Mapping(env)) => parse_env_overrides(env)?,
            Some(_) => return Err(CaseError::schema("harness.env must be a mapping")),
        };
        Ok(Self {
            entrypoint,
            env,
        })
    }
}

/// Converts `harness.env` into override entries.
fn parse_env_overrides(env: &Mapping) -> Result<BTreeMap<String, Option<String>>, CaseError> {
    env.iter()
        .map(|(key, value)| {
            let name = operand_text(key);
            match value {
                Value::Null => Ok((name, None)),
                Value::Bool(_) | Value::Number(_) | Value::String(_) => {
                    Ok((name, Some(operand_text(value))))
                }
                _ => Err(CaseError::schema(format!("harness.env.{name} must be a scalar"))),
            }
        })
        .collect()
}

// ============================================================================
// SECTION: Case Fields
// ============================================================================

/// Reads `argv` as a list of arguments.
fn parse_argv(case: &Case) -> Result<Vec<String>, CaseError> {
    match case.present_field("argv") {
        None => Ok(Vec::new()),
        Some(Value::String(arg)) => Ok(vec![arg.clone()]),
        Some(Value::Sequence(items)) => items
            .iter()
            .map(|item| match item {
                Value::Bool(_) | Value::Number(_) | Value::String(_) => Ok(operand_text(item)),
                _ => Err(CaseError::schema("argv must be a list or string")),
            })
            .collect(),
        Some(_) => Err(CaseError::schema("argv must be a list or string")),
    }
}

/// Reads the expected exit code.
fn parse_exit_code(case: &Case) -> Result<i32, CaseError> {
    match case.present_field("exit_code") {
        None => Ok(0),
        Some(Value::Number(number)) => number
            .as_i64()
            .and_then(|code| i32::try_from(code).ok())
            .ok_or_else(|| CaseError::schema("exit_code must be an integer")),
        Some(_) => Err(CaseError::schema("exit_code must be an integer")),
    }
}

// ============================================================================
// SECTION: Handler
// ============================================================================

/// Handler for `cli.run` cases.
#[derive(Debug, Clone, Copy, Default)]
pub struct CliRunHandler;

impl CaseHandler for CliRunHandler {
    fn case_type(&self) -> &'static str {
        CLI_RUN_TYPE
    }

    fn evaluate(
        &self,
        case: &Case,
        tree: &AssertNode,
        context: &HandlerContext<'_>,
    ) -> Result<(), CaseError> {
        let harness = Harness::from_case(case)?;
        let entrypoint = harness
            .entrypoint
            .as_deref()
            .or(context.settings.default_entrypoint.as_deref())
            .ok_or_else(|| CaseError::runtime("cli.run requires explicit harness.entrypoint"))?;
        let mut command =
            tokenize_entrypoint(entrypoint).map_err(|err| CaseError::schema(err.to_string()))?;
        if command.is_empty() {
            return Err(CaseError::schema("cli.run requires non-empty harness.entrypoint"));
        }
        let program = command.remove(0);
        command.extend(parse_argv(case)?);
        let expected_exit = parse_exit_code(case)?;

        let mut env = context.environment.filtered(&context.settings.env_allowlist);
        for (name, value) in harness.env {
            match value {
                Some(value) => {
                    env.insert(name, value);
                }
                None => {
                    env.remove(&name);
                }
            }
        }

        let spec = ProcessSpec {
            program,
            args: command,
            env,
            timeout: context.settings.process_timeout,
        };
        let output = run_captured(&spec).map_err(|err| match err {
            ProcessError::Tokenize(_) => CaseError::schema(err.to_string()),
            ProcessError::Spawn {
                ..
            }
            | ProcessError::Io(_)
            | ProcessError::TimedOut(_) => CaseError::runtime(err.to_string()),
        })?;
        if output.exit_code != expected_exit {
            return Err(CaseError::assertion(format!(
                "[case_id={}] exit_code expected={expected_exit} actual={}",
                case.id, output.exit_code
            )));
        }

        let evaluator =
            |request: &LeafRequest<'_>| -> AssertResult<Outcome> { evaluate_leaf(request, &output) };
        outcome_to_result(evaluate_root(tree, &case.id, &evaluator)?)
    }
}

// ============================================================================
// SECTION: Targets
// ============================================================================

/// Dispatches a leaf to its target.
fn evaluate_leaf(request: &LeafRequest<'_>, output: &CapturedOutput) -> AssertResult<Outcome> {
    match request.target {
        "stdout" => evaluate_stream(request, &output.stdout),
        "stderr" => evaluate_stream(request, &output.stderr),
        "stdout_path" => evaluate_stdout_path(request, &output.stdout),
        "stdout_path_text" => evaluate_stdout_path_text(request, &output.stdout),
        other => Err(AssertError::schema(format!("unknown assert target: {other}"))),
    }
}

/// Applies stream operations to captured output.
fn evaluate_stream(request: &LeafRequest<'_>, subject: &str) -> AssertResult<Outcome> {
    for entry in request.leaf.entries() {
        let outcome = match entry.op {
            LeafOp::Contain => check_contain(request, subject, &entry.operands),
            LeafOp::Regex => check_regex(request, subject, &entry.operands),
            LeafOp::JsonType => check_json_type(request, subject, &entry.operands)?,
            LeafOp::Exists => return Err(unsupported_op(request.target, entry.op)),
        };
        if !outcome.is_pass() {
            return Ok(outcome);
        }
    }
    Ok(Outcome::Pass)
}

/// Checks that the path printed on stdout exists.
fn evaluate_stdout_path(request: &LeafRequest<'_>, stdout: &str) -> AssertResult<Outcome> {
    for entry in request.leaf.entries() {
        if entry.op != LeafOp::Exists {
            return Err(unsupported_op(request.target, entry.op));
        }
    }
    let line = first_non_blank_line(stdout);
    for entry in request.leaf.entries() {
        let outcome = check_exists(request, line, &entry.operands)?;
        if !outcome.is_pass() {
            return Ok(outcome);
        }
    }
    Ok(Outcome::Pass)
}

/// Asserts over the contents of the file printed on stdout.
fn evaluate_stdout_path_text(request: &LeafRequest<'_>, stdout: &str) -> AssertResult<Outcome> {
    let mut first_op = None;
    for entry in request.leaf.entries() {
        if !matches!(entry.op, LeafOp::Contain | LeafOp::Regex) {
            return Err(unsupported_op(request.target, entry.op));
        }
        first_op.get_or_insert(entry.op);
    }
    let context = request.context(first_op.map_or("", LeafOp::as_str));
    let Some(line) = first_non_blank_line(stdout) else {
        return Ok(Outcome::fail(format!("{context} expected stdout to contain a path")));
    };
    let Ok(text) = fs::read_to_string(Path::new(line)) else {
        return Ok(Outcome::fail(format!("{context} cannot read stdout path")));
    };
    evaluate_text_ops(request, &text)
}
