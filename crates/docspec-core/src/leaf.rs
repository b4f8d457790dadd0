// crates/docspec-core/src/leaf.rs
// ============================================================================
// Module: Leaf Operations
// Description: Shared implementations of contain, regex, json_type, and exists.
// Purpose: Give every case handler identical leaf semantics and messages.
// Dependencies: docspec-assert, regex, serde_json
// ============================================================================

//! ## Overview
//! Handlers decide which operations a target supports and pick the subject;
//! the functions here apply one operation to that subject. Each checks its
//! operands in order and fails on the first that does not hold, prefixing
//! the reason with the request context
//! (`[case_id=.. assert_path=.. target=.. op=..]`).

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;

use docspec_assert::AssertError;
use docspec_assert::AssertResult;
use docspec_assert::LeafOp;
use docspec_assert::LeafRequest;
use docspec_assert::Outcome;
use docspec_assert::operand_text;
use regex::Regex;
use serde_json::Value as JsonValue;
use serde_yaml::Value;

// ============================================================================
// SECTION: Operations
// ============================================================================

/// Checks that every operand occurs in `subject`.
#[must_use]
pub fn check_contain(request: &LeafRequest<'_>, subject: &str, operands: &[Value]) -> Outcome {
    for operand in operands {
        let needle = operand_text(operand);
        if !subject.contains(&needle) {
            return Outcome::fail(format!(
                "{} expected to contain: {needle}",
                request.context(LeafOp::Contain.as_str())
            ));
        }
    }
    Outcome::Pass
}

/// Checks that every operand pattern matches somewhere in `subject`.
///
/// Patterns the engine cannot compile fail like a non-matching pattern.
#[must_use]
pub fn check_regex(request: &LeafRequest<'_>, subject: &str, operands: &[Value]) -> Outcome {
    for operand in operands {
        let pattern = operand_text(operand);
        let context = request.context(LeafOp::Regex.as_str());
        match Regex::new(&pattern) {
            Ok(regex) if regex.is_match(subject) => {}
            Ok(_) => return Outcome::fail(format!("{context} expected to match regex: {pattern}")),
            Err(err) => {
                return Outcome::fail(format!("{context} invalid regex {pattern}: {err}"));
            }
        }
    }
    Outcome::Pass
}

/// Checks that `subject` decodes as JSON of every operand's shape.
///
/// # Errors
///
/// Returns [`AssertError::Schema`] for operands other than
/// `list`/`array`/`dict`/`object`/`mapping`.
pub fn check_json_type(
    request: &LeafRequest<'_>,
    subject: &str,
    operands: &[Value],
) -> AssertResult<Outcome> {
    let wanted = operands
        .iter()
        .map(|operand| {
            let name = operand_text(operand).trim().to_ascii_lowercase();
            match name.as_str() {
                "list" | "array" => Ok((name, true)),
                "dict" | "object" | "mapping" => Ok((name, false)),
                _ => Err(AssertError::schema(format!("unsupported json_type: {name}"))),
            }
        })
        .collect::<AssertResult<Vec<_>>>()?;
    if wanted.is_empty() {
        return Ok(Outcome::Pass);
    }
    let context = request.context(LeafOp::JsonType.as_str());
    let value = match serde_json::from_str::<JsonValue>(subject.trim()) {
        Ok(value) => value,
        Err(err) => {
            return Ok(Outcome::fail(format!(
                "{context} {} is not valid JSON: {err}",
                request.target
            )));
        }
    };
    for (name, expect_list) in wanted {
        let matches = if expect_list { value.is_array() } else { value.is_object() };
        if !matches {
            return Ok(Outcome::fail(format!(
                "{context} expected json_type {name}, got {}",
                json_kind(&value)
            )));
        }
    }
    Ok(Outcome::Pass)
}

/// Checks that the path named by `line` exists.
///
/// # Errors
///
/// Returns [`AssertError::Schema`] when an operand is neither `true` nor null.
pub fn check_exists(
    request: &LeafRequest<'_>,
    line: Option<&str>,
    operands: &[Value],
) -> AssertResult<Outcome> {
    if operands.iter().any(|operand| !matches!(operand, Value::Bool(true) | Value::Null)) {
        return Err(AssertError::schema("exists operands must be true or null"));
    }
    let context = request.context(LeafOp::Exists.as_str());
    let Some(line) = line else {
        return Ok(Outcome::fail(format!("{context} expected stdout to contain a path")));
    };
    if Path::new(line).exists() {
        Ok(Outcome::Pass)
    } else {
        Ok(Outcome::fail(format!("{context} expected path to exist: {line}")))
    }
}

/// Builds the schema error for an operation a target does not support.
#[must_use]
pub fn unsupported_op(target: &str, op: LeafOp) -> AssertError {
    AssertError::schema(format!("unsupported op for {target}: {op}"))
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns the first line of `text` that is not blank, trimmed.
#[must_use]
pub fn first_non_blank_line(text: &str) -> Option<&str> {
    text.lines().map(str::trim).find(|line| !line.is_empty())
}

/// Names the JSON shape of a value for failure messages.
const fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "bool",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "list",
        JsonValue::Object(_) => "dict",
    }
}
