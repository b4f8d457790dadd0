// crates/docspec-assert/src/tree.rs
// ============================================================================
// Module: Assertion Tree
// Description: Typed representation of the must/can/cannot assertion grammar.
// Purpose: Give the evaluator and linter a validated, structurally comparable tree.
// Dependencies: serde_yaml, smallvec
// ============================================================================

//! ## Overview
//! An assertion is a tree of three node kinds. Sequences evaluate children in
//! order with the same inherited target, groups apply `must`/`can`/`cannot`
//! semantics (optionally overriding the target), and leaves hold one or more
//! operations with their operand lists. Trees are produced by
//! [`crate::parse_assertion`] and never mutated afterwards.
//!
//! Structural equality is derived so the linter can detect redundant
//! siblings by comparing subtrees directly.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde_yaml::Value;
use smallvec::SmallVec;

// ============================================================================
// SECTION: Group Kinds
// ============================================================================

/// Combinator applied to a group's children.
///
/// # Invariants
/// - Keys returned by [`GroupKind::as_str`] are the YAML keys that declare the
///   group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupKind {
    /// Every child must pass.
    Must,
    /// At least one child must pass.
    Can,
    /// No child may pass.
    Cannot,
}

impl GroupKind {
    /// All group kinds in declaration-key order.
    pub const ALL: [Self; 3] = [Self::Must, Self::Can, Self::Cannot];

    /// Returns the YAML key for this group kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Must => "must",
            Self::Can => "can",
            Self::Cannot => "cannot",
        }
    }

    /// Parses a YAML key into a group kind.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == key)
    }
}

impl fmt::Display for GroupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Leaf Operations
// ============================================================================

/// Operation a leaf applies to its subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeafOp {
    /// Substring containment.
    Contain,
    /// Regular-expression search.
    Regex,
    /// Structured-data shape check.
    JsonType,
    /// Filesystem existence check.
    Exists,
}

impl LeafOp {
    /// All leaf operations.
    pub const ALL: [Self; 4] = [Self::Contain, Self::Regex, Self::JsonType, Self::Exists];

    /// Returns the YAML key for this operation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Contain => "contain",
            Self::Regex => "regex",
            Self::JsonType => "json_type",
            Self::Exists => "exists",
        }
    }

    /// Parses a YAML key into a leaf operation.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.as_str() == key)
    }
}

impl fmt::Display for LeafOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Nodes
// ============================================================================

/// One operation with its operands, in document order.
///
/// # Invariants
/// - Operands are YAML scalars (string, number, bool, or null).
#[derive(Debug, Clone, PartialEq)]
pub struct LeafEntry {
    /// Operation to apply.
    pub op: LeafOp,
    /// Operand values.
    pub operands: Vec<Value>,
}

/// A leaf assertion: one or more operations applied to the inherited target.
///
/// # Invariants
/// - Holds at least one entry and each operation appears at most once.
#[derive(Debug, Clone, PartialEq)]
pub struct AssertLeaf {
    /// Operations in the order they were declared.
    entries: SmallVec<[LeafEntry; 2]>,
}

impl AssertLeaf {
    /// Builds a leaf from already-validated entries.
    #[must_use]
    pub(crate) const fn from_entries(entries: SmallVec<[LeafEntry; 2]>) -> Self {
        Self {
            entries,
        }
    }

    /// Returns the leaf operations in declaration order.
    #[must_use]
    pub fn entries(&self) -> &[LeafEntry] {
        &self.entries
    }

    /// Returns the operands for `op`, if the leaf declares it.
    #[must_use]
    pub fn operands(&self, op: LeafOp) -> Option<&[Value]> {
        self.entries.iter().find(|entry| entry.op == op).map(|entry| entry.operands.as_slice())
    }
}

/// A combinator group.
///
/// # Invariants
/// - `children` is non-empty.
/// - `target`, when present, is trimmed and non-empty.
#[derive(Debug, Clone, PartialEq)]
pub struct AssertGroup {
    /// Combinator applied to the children.
    pub kind: GroupKind,
    /// Target override for this subtree.
    pub target: Option<String>,
    /// Child nodes.
    pub children: Vec<AssertNode>,
}

/// A node of the assertion tree.
#[derive(Debug, Clone, PartialEq)]
pub enum AssertNode {
    /// Children evaluated in order; the first failure wins.
    Sequence(Vec<AssertNode>),
    /// A `must`/`can`/`cannot` group.
    Group(AssertGroup),
    /// A leaf assertion.
    Leaf(AssertLeaf),
}

impl AssertNode {
    /// Returns the node that passes vacuously (an empty sequence).
    #[must_use]
    pub const fn vacuous() -> Self {
        Self::Sequence(Vec::new())
    }
}

// ============================================================================
// SECTION: Operand Helpers
// ============================================================================

/// Renders a scalar operand as text.
///
/// Strings are returned as-is, numbers and booleans use their YAML spelling,
/// and null renders as the empty string.
#[must_use]
pub fn operand_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) | Value::Tagged(_) => String::new(),
    }
}
