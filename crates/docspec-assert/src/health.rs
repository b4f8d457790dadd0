// crates/docspec-assert/src/health.rs
// ============================================================================
// Module: Assertion Health Linter
// Description: Static detection of vacuous, redundant, or non-portable assertions.
// Purpose: Flag assertions that cannot meaningfully fail before they are run.
// Dependencies: regex, serde
// ============================================================================

//! ## Overview
//! [`lint`] walks a parsed tree and reports [`Diagnostic`]s. It never fails
//! and never evaluates anything; callers decide via [`HealthMode`] whether
//! diagnostics are ignored, printed as warnings, or turned into a case
//! failure.
//!
//! | Code  | Finding                                              |
//! |-------|------------------------------------------------------|
//! | AH001 | `contain` with the empty string                      |
//! | AH002 | `regex` that matches any input                       |
//! | AH003 | duplicate operands within one operation              |
//! | AH004 | structurally identical siblings in a group           |
//! | AH005 | `regex` using a construct outside the portable subset |

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;
use serde::Serialize;

use crate::eval::ROOT_PATH;
use crate::tree::AssertLeaf;
use crate::tree::AssertNode;
use crate::tree::GroupKind;
use crate::tree::LeafOp;
use crate::tree::operand_text;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Regex spellings that match every input.
const ALWAYS_TRUE_REGEX: &[&str] = &["", ".*", "^.*$", "^.*", ".*$", "\\A.*\\Z", "\\A.*\\z"];

/// Literal markers of non-portable regex constructs.
const NON_PORTABLE_MARKERS: &[&str] = &["(?<=", "(?<!", "(?P<", "(?P=", "(?P>", "\\k<", "(?(", "(?>"];

/// Patterns matching non-portable regex constructs that need context.
const NON_PORTABLE_PATTERNS: &[&str] = &[
    // named group
    r"\(\?<[A-Za-z_][A-Za-z0-9_]*>",
    // inline flag group
    r"\(\?[aiLmsux-]+(?::|\))",
    // possessive quantifier not preceded by an escape
    r"(?:^|[^\\])(?:\\\\)*[+*?]\+",
    // numbered backreference not preceded by an escape
    r"(?:^|[^\\])(?:\\\\)*\\[1-9]",
];

// ============================================================================
// SECTION: Types
// ============================================================================

/// Assertion health diagnostic codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum HealthCode {
    /// `contain` with the empty string.
    #[serde(rename = "AH001")]
    Ah001,
    /// Always-true regex.
    #[serde(rename = "AH002")]
    Ah002,
    /// Duplicate operands.
    #[serde(rename = "AH003")]
    Ah003,
    /// Redundant sibling branch.
    #[serde(rename = "AH004")]
    Ah004,
    /// Non-portable regex construct.
    #[serde(rename = "AH005")]
    Ah005,
}

impl HealthCode {
    /// Returns the stable code label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ah001 => "AH001",
            Self::Ah002 => "AH002",
            Self::Ah003 => "AH003",
            Self::Ah004 => "AH004",
            Self::Ah005 => "AH005",
        }
    }
}

impl fmt::Display for HealthCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single assertion-health finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Finding code.
    pub code: HealthCode,
    /// Tree path of the offending node or operation.
    pub path: String,
    /// Human-readable explanation.
    pub message: String,
}

impl Diagnostic {
    /// Creates a diagnostic.
    fn new(code: HealthCode, path: String, message: impl Into<String>) -> Self {
        Self {
            code,
            path,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}: {}", self.code, self.path, self.message)
    }
}

/// Policy applied to diagnostics before evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthMode {
    /// Diagnostics are computed but suppressed.
    #[default]
    Ignore,
    /// Diagnostics are reported as warnings and evaluation proceeds.
    Warn,
    /// Any diagnostic fails the case without evaluation.
    Error,
}

impl HealthMode {
    /// Returns the lowercase mode label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ignore => "ignore",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl FromStr for HealthMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "ignore" => Ok(Self::Ignore),
            "warn" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            _ => Err("assert_health.mode must be one of: ignore, warn, error".to_string()),
        }
    }
}

// ============================================================================
// SECTION: Linting
// ============================================================================

/// Lints a parsed assertion tree rooted at [`ROOT_PATH`].
#[must_use]
pub fn lint(node: &AssertNode) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    lint_node(node, ROOT_PATH, None, &mut diagnostics);
    diagnostics
}

/// Formats the case failure message for health violations in error mode.
#[must_use]
pub fn format_health_failure(diagnostics: &[Diagnostic]) -> String {
    let parts: Vec<String> =
        diagnostics.iter().map(|diag| format!("{}@{}", diag.code, diag.path)).collect();
    format!(
        "assertion health check failed ({} issue(s)): {}",
        diagnostics.len(),
        parts.join("; ")
    )
}

/// Lints one node; `group` is the innermost enclosing group kind.
fn lint_node(node: &AssertNode, path: &str, group: Option<GroupKind>, out: &mut Vec<Diagnostic>) {
    match node {
        AssertNode::Sequence(children) => {
            for (index, child) in children.iter().enumerate() {
                lint_node(child, &format!("{path}[{index}]"), group, out);
            }
        }
        AssertNode::Group(inner) => {
            let kind = inner.kind;
            let group_path = format!("{path}.{kind}");
            let redundant = inner
                .children
                .iter()
                .enumerate()
                .any(|(index, child)| inner.children[..index].contains(child));
            if redundant {
                out.push(Diagnostic::new(
                    HealthCode::Ah004,
                    group_path.clone(),
                    format!("redundant sibling assertion branch in '{kind}'"),
                ));
            }
            for (index, child) in inner.children.iter().enumerate() {
                lint_node(child, &format!("{group_path}[{index}]"), Some(kind), out);
            }
        }
        AssertNode::Leaf(leaf) => lint_leaf(leaf, path, group, out),
    }
}

/// Lints the operations of a single leaf.
fn lint_leaf(leaf: &AssertLeaf, path: &str, group: Option<GroupKind>, out: &mut Vec<Diagnostic>) {
    let negated = group == Some(GroupKind::Cannot);
    for entry in leaf.entries() {
        let op = entry.op;
        let op_path = format!("{path}.{op}");
        let values: Vec<String> = entry.operands.iter().map(operand_text).collect();
        let mut seen = HashSet::new();
        if !values.iter().all(|value| seen.insert(value.as_str())) {
            out.push(Diagnostic::new(
                HealthCode::Ah003,
                op_path.clone(),
                format!("duplicate values in '{op}' list can hide intent drift"),
            ));
        }
        match op {
            LeafOp::Contain if values.iter().any(String::is_empty) => {
                let message = if negated {
                    "cannot(contain:'') is always false"
                } else {
                    "contain with empty string is always true"
                };
                out.push(Diagnostic::new(HealthCode::Ah001, op_path, message));
            }
            LeafOp::Regex => lint_patterns(&values, &op_path, negated, out),
            LeafOp::Contain | LeafOp::JsonType | LeafOp::Exists => {}
        }
    }
}

/// Applies the AH002 and AH005 checks to regex operands.
fn lint_patterns(patterns: &[String], path: &str, negated: bool, out: &mut Vec<Diagnostic>) {
    for pattern in patterns {
        if ALWAYS_TRUE_REGEX.contains(&pattern.as_str()) {
            let message = if negated {
                "cannot(regex always-true) is always false"
            } else {
                "regex pattern is trivially always true"
            };
            out.push(Diagnostic::new(HealthCode::Ah002, path.to_string(), message));
        }
        if is_non_portable(pattern) {
            out.push(Diagnostic::new(
                HealthCode::Ah005,
                path.to_string(),
                "regex uses non-portable construct",
            ));
            break;
        }
    }
}

/// Returns true when a pattern uses a construct outside the portable subset.
fn is_non_portable(pattern: &str) -> bool {
    if NON_PORTABLE_MARKERS.iter().any(|marker| pattern.contains(marker)) {
        return true;
    }
    non_portable_patterns().iter().any(|detector| detector.is_match(pattern))
}

/// Returns the compiled detectors for context-sensitive constructs.
fn non_portable_patterns() -> &'static [Regex] {
    static DETECTORS: OnceLock<Vec<Regex>> = OnceLock::new();
    DETECTORS.get_or_init(|| {
        NON_PORTABLE_PATTERNS.iter().filter_map(|source| Regex::new(source).ok()).collect()
    })
}
