// crates/docspec-assert/src/parse.rs
// ============================================================================
// Module: Assertion Parser
// Description: Converts decoded YAML assertion values into typed trees.
// Purpose: Reject malformed shapes once, before linting or evaluation.
// Dependencies: serde_yaml, smallvec
// ============================================================================

//! ## Overview
//! [`parse_assertion`] walks a decoded `assert` value and returns an
//! [`AssertNode`] or the first shape violation found in pre-order. The
//! inherited-target requirement is not checked here because it depends on
//! the path taken through the tree; the evaluator enforces it per leaf.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_yaml::Mapping;
use serde_yaml::Value;
use smallvec::SmallVec;

use crate::error::AssertError;
use crate::error::AssertResult;
use crate::tree::AssertGroup;
use crate::tree::AssertLeaf;
use crate::tree::AssertNode;
use crate::tree::GroupKind;
use crate::tree::LeafEntry;
use crate::tree::LeafOp;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Group keys that older documents used and that are rejected.
const REJECTED_GROUP_ALIASES: [&str; 2] = ["all", "any"];
/// Key that sets a group's target.
const TARGET_KEY: &str = "target";
/// Maximum nesting depth accepted for assertion trees.
pub const MAX_ASSERT_DEPTH: usize = 64;

// ============================================================================
// SECTION: Parsing
// ============================================================================

/// Parses a decoded `assert` value into a typed tree.
///
/// A null value yields the vacuous tree.
///
/// # Errors
///
/// Returns [`AssertError::Schema`] describing the first malformed node.
pub fn parse_assertion(value: &Value) -> AssertResult<AssertNode> {
    if value.is_null() {
        return Ok(AssertNode::vacuous());
    }
    parse_node(value, 0)
}

/// Parses one node at the given depth.
fn parse_node(value: &Value, depth: usize) -> AssertResult<AssertNode> {
    if depth > MAX_ASSERT_DEPTH {
        return Err(AssertError::schema(format!(
            "assert tree exceeds maximum depth of {MAX_ASSERT_DEPTH}"
        )));
    }
    match value {
        Value::Sequence(items) => items
            .iter()
            .map(|item| parse_node(item, depth + 1))
            .collect::<AssertResult<Vec<_>>>()
            .map(AssertNode::Sequence),
        Value::Mapping(mapping) => parse_mapping(mapping, depth),
        _ => Err(AssertError::schema("assert node must be a mapping or list")),
    }
}

/// Parses a mapping as either a group or a leaf.
fn parse_mapping(mapping: &Mapping, depth: usize) -> AssertResult<AssertNode> {
    if REJECTED_GROUP_ALIASES.iter().any(|alias| mapping.contains_key(*alias)) {
        return Err(AssertError::schema(
            "assert group aliases 'all'/'any' are not supported; use 'must'/'can'",
        ));
    }
    let present: SmallVec<[GroupKind; 3]> =
        GroupKind::ALL.into_iter().filter(|kind| mapping.contains_key(kind.as_str())).collect();
    match present.as_slice() {
        [] => parse_leaf(mapping).map(AssertNode::Leaf),
        [kind] => parse_group(*kind, mapping, depth).map(AssertNode::Group),
        _ => Err(AssertError::schema("assert group must include exactly one key (must/can/cannot)")),
    }
}

/// Parses a group mapping with exactly one group key.
fn parse_group(kind: GroupKind, mapping: &Mapping, depth: usize) -> AssertResult<AssertGroup> {
    let children = match mapping.get(kind.as_str()) {
        Some(Value::Sequence(items)) if !items.is_empty() => items,
        _ => {
            return Err(AssertError::schema(format!("assert.{kind} must be a non-empty list")));
        }
    };
    for key in mapping.keys() {
        let name = key_text(key);
        if name != kind.as_str() && name != TARGET_KEY {
            return Err(AssertError::schema(format!("unknown key in assert group: {name}")));
        }
    }
    let target = match mapping.get(TARGET_KEY) {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) => {
            let trimmed = text.trim();
            if trimmed.is_empty() { None } else { Some(trimmed.to_string()) }
        }
        Some(_) => return Err(AssertError::schema("assert group target must be a string")),
    };
    let children = children
        .iter()
        .map(|child| parse_node(child, depth + 1))
        .collect::<AssertResult<Vec<_>>>()?;
    Ok(AssertGroup {
        kind,
        target,
        children,
    })
}

/// Parses a leaf mapping.
fn parse_leaf(mapping: &Mapping) -> AssertResult<AssertLeaf> {
    if mapping.contains_key(TARGET_KEY) {
        return Err(AssertError::schema(
            "leaf assertion must not include key: target; move target to a parent group",
        ));
    }
    if mapping.is_empty() {
        return Err(AssertError::schema("assertion leaf must declare at least one op"));
    }
    let mut entries = SmallVec::new();
    for (key, value) in mapping {
        let name = key_text(key);
        let Some(op) = LeafOp::from_key(&name) else {
            return Err(AssertError::schema(format!("unsupported assertion op: {name}")));
        };
        let Value::Sequence(items) = value else {
            return Err(AssertError::schema(format!("{op} operands must be a list")));
        };
        if let Some(bad) = items.iter().find(|item| !is_scalar(item)) {
            let kind = match bad {
                Value::Sequence(_) => "list",
                Value::Mapping(_) => "mapping",
                _ => "tagged value",
            };
            return Err(AssertError::schema(format!("{op} operands must be scalars, found {kind}")));
        }
        entries.push(LeafEntry {
            op,
            operands: items.clone(),
        });
    }
    Ok(AssertLeaf::from_entries(entries))
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns true for YAML scalars.
const fn is_scalar(value: &Value) -> bool {
    matches!(value, Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_))
}

/// Renders a mapping key for diagnostics.
fn key_text(key: &Value) -> String {
    match key {
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::Null => "null".to_string(),
        Value::Sequence(_) | Value::Mapping(_) | Value::Tagged(_) => "<non-scalar>".to_string(),
    }
}
