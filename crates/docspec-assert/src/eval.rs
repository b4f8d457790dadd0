// crates/docspec-assert/src/eval.rs
// ============================================================================
// Module: Assertion Evaluator
// Description: Applies must/can/cannot semantics over a typed assertion tree.
// Purpose: Drive caller-supplied leaf evaluation with target inheritance.
// Dependencies: crate::{error, tree}
// ============================================================================

//! ## Overview
//! Evaluation returns an [`Outcome`] for ordinary pass/fail results and an
//! [`AssertError`] for schema or runtime problems. `can` and `cannot` groups
//! absorb [`Outcome::Fail`] from their children but never absorb errors.
//!
//! Paths follow a fixed notation rooted at [`ROOT_PATH`]: sequence children
//! append `[i]` and group children append `.<group>[i]`, so the first leaf of
//! a top-level `must` group is `assert.must[0]`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::error::AssertError;
use crate::error::AssertResult;
use crate::tree::AssertGroup;
use crate::tree::AssertLeaf;
use crate::tree::AssertNode;
use crate::tree::GroupKind;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Path of the root assertion node.
pub const ROOT_PATH: &str = "assert";

/// Result of evaluating a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The node passed.
    Pass,
    /// The node failed with a human-readable reason.
    Fail(String),
}

impl Outcome {
    /// Creates a failing outcome.
    #[must_use]
    pub fn fail(reason: impl Into<String>) -> Self {
        Self::Fail(reason.into())
    }

    /// Returns true when the outcome passed.
    #[must_use]
    pub const fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }
}

/// Everything a leaf evaluator needs to judge one leaf.
#[derive(Debug, Clone, Copy)]
pub struct LeafRequest<'a> {
    /// The leaf being evaluated.
    pub leaf: &'a AssertLeaf,
    /// Effective (inherited or overridden) target name.
    pub target: &'a str,
    /// Owning case identifier.
    pub case_id: &'a str,
    /// Path of the leaf within the tree.
    pub path: &'a str,
}

impl LeafRequest<'_> {
    /// Formats the standard failure-context prefix for an operation.
    #[must_use]
    pub fn context(&self, op: &str) -> String {
        format!(
            "[case_id={} assert_path={} target={} op={op}]",
            self.case_id, self.path, self.target
        )
    }
}

/// Evaluates leaves against a case-specific subject.
pub trait LeafEvaluator {
    /// Evaluates a single leaf.
    ///
    /// # Errors
    ///
    /// Returns [`AssertError`] when the leaf is malformed for this target or
    /// the subject cannot be inspected.
    fn eval_leaf(&self, request: &LeafRequest<'_>) -> AssertResult<Outcome>;
}

impl<F> LeafEvaluator for F
where
    F: Fn(&LeafRequest<'_>) -> AssertResult<Outcome>,
{
    fn eval_leaf(&self, request: &LeafRequest<'_>) -> AssertResult<Outcome> {
        self(request)
    }
}

// ============================================================================
// SECTION: Evaluation
// ============================================================================

/// Evaluates a whole tree from [`ROOT_PATH`] with no inherited target.
///
/// # Errors
///
/// Returns [`AssertError`] on schema or runtime violations.
pub fn evaluate_root<E>(node: &AssertNode, case_id: &str, evaluator: &E) -> AssertResult<Outcome>
where
    E: LeafEvaluator + ?Sized,
{
    evaluate(node, None, case_id, ROOT_PATH, evaluator)
}

/// Evaluates `node` located at `path` with the given inherited target.
///
/// # Errors
///
/// Returns [`AssertError`] on schema or runtime violations. Errors from any
/// descendant propagate regardless of the enclosing group kind.
pub fn evaluate<E>(
    node: &AssertNode,
    inherited_target: Option<&str>,
    case_id: &str,
    path: &str,
    evaluator: &E,
) -> AssertResult<Outcome>
where
    E: LeafEvaluator + ?Sized,
{
    match node {
        AssertNode::Sequence(children) => {
            for (index, child) in children.iter().enumerate() {
                let child_path = format!("{path}[{index}]");
                let outcome = evaluate(child, inherited_target, case_id, &child_path, evaluator)?;
                if !outcome.is_pass() {
                    return Ok(outcome);
                }
            }
            Ok(Outcome::Pass)
        }
        AssertNode::Group(group) => {
            evaluate_group(group, inherited_target, case_id, path, evaluator)
        }
        AssertNode::Leaf(leaf) => {
            let target = inherited_target.map(str::trim).unwrap_or_default();
            if target.is_empty() {
                return Err(AssertError::schema(
                    "assertion leaf requires inherited target from a parent group",
                ));
            }
            evaluator.eval_leaf(&LeafRequest {
                leaf,
                target,
                case_id,
                path,
            })
        }
    }
}

/// Evaluates a group's children under its combinator.
fn evaluate_group<E>(
    group: &AssertGroup,
    inherited_target: Option<&str>,
    case_id: &str,
    path: &str,
    evaluator: &E,
) -> AssertResult<Outcome>
where
    E: LeafEvaluator + ?Sized,
{
    let target = group.target.as_deref().or(inherited_target);
    let kind = group.kind;
    let mut passed = 0usize;
    for (index, child) in group.children.iter().enumerate() {
        let child_path = format!("{path}.{kind}[{index}]");
        let outcome = evaluate(child, target, case_id, &child_path, evaluator)?;
        match (kind, outcome) {
            (GroupKind::Must, Outcome::Fail(reason)) => return Ok(Outcome::Fail(reason)),
            (GroupKind::Can, Outcome::Pass) => return Ok(Outcome::Pass),
            (GroupKind::Cannot, Outcome::Pass) => passed += 1,
            _ => {}
        }
    }
    Ok(match kind {
        GroupKind::Must => Outcome::Pass,
        GroupKind::Can => Outcome::fail("all 'can' branches failed"),
        GroupKind::Cannot if passed > 0 => {
            Outcome::fail(format!("'cannot' failed: {passed} branch(es) passed"))
        }
        GroupKind::Cannot => Outcome::Pass,
    })
}
