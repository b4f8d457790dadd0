// crates/docspec-core/src/capabilities.rs
// ============================================================================
// Module: Capability Gate
// Description: Supported capability set and per-case `requires` handling.
// Purpose: Skip or fail cases that need features this runner lacks.
// Dependencies: serde_yaml
// ============================================================================

//! ## Overview
//! A case may declare `requires: {capabilities: [...], when_missing: skip|fail}`.
//! The gate runs before type dispatch, so a case for an unsupported type can
//! still be skipped cleanly. Missing capabilities are reported sorted.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use serde_yaml::Value;

use crate::cases::Case;
use crate::error::CaseError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Capabilities implemented by this runner.
pub const SUPPORTED_CAPABILITIES: &[&str] = &[
    "text.file",
    "cli.run",
    "assert.op.contain",
    "assert.op.regex",
    "assert.op.json_type",
    "assert.op.exists",
    "assert.group.must",
    "assert.group.can",
    "assert.group.cannot",
    "assert_health.ah001",
    "assert_health.ah002",
    "assert_health.ah003",
    "assert_health.ah004",
    "assert_health.ah005",
    "requires.capabilities",
];

/// Case key holding capability requirements.
const REQUIRES_KEY: &str = "requires";

// ============================================================================
// SECTION: Types
// ============================================================================

/// Set of capability names.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CapabilitySet {
    /// Capability names.
    names: BTreeSet<String>,
}

impl CapabilitySet {
    /// Returns the capabilities implemented by this runner.
    #[must_use]
    pub fn supported() -> Self {
        SUPPORTED_CAPABILITIES.iter().copied().collect()
    }

    /// Returns true when `name` is in the set.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Iterates names in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Returns the sorted, de-duplicated names from `required` not in the set.
    #[must_use]
    pub fn missing<'a>(&self, required: &'a [String]) -> Vec<&'a str> {
        let missing: BTreeSet<&str> = required
            .iter()
            .map(String::as_str)
            .filter(|name| !self.contains(name))
            .collect();
        missing.into_iter().collect()
    }
}

impl<'a> FromIterator<&'a str> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().map(str::to_string).collect(),
        }
    }
}

/// Policy when required capabilities are missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WhenMissing {
    /// Report the case as skipped.
    Skip,
    /// Fail the case with a runtime error.
    #[default]
    Fail,
}

/// Parsed `requires` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirements {
    /// Required capability names.
    pub capabilities: Vec<String>,
    /// Policy for missing capabilities.
    pub when_missing: WhenMissing,
}

impl Requirements {
    /// Parses the `requires` field of a case, if present.
    ///
    /// # Errors
    ///
    /// Returns [`CaseError::Schema`] when the block is malformed.
    pub fn from_case(case: &Case) -> Result<Option<Self>, CaseError> {
        let Some(value) = case.present_field(REQUIRES_KEY) else {
            return Ok(None);
        };
        let Value::Mapping(mapping) = value else {
            return Err(CaseError::schema("requires must be a mapping"));
        };
        for key in mapping.keys() {
            if !matches!(key.as_str(), Some("capabilities" | "when_missing")) {
                let name = key.as_str().unwrap_or("<non-string>");
                return Err(CaseError::schema(format!("unsupported requires key: {name}")));
            }
        }
        let capabilities = match mapping.get("capabilities") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Sequence(items)) => items
                .iter()
                .map(|item| match item.as_str().map(str::trim) {
                    Some(name) if !name.is_empty() => Ok(name.to_string()),
                    _ => Err(CaseError::schema(
                        "requires.capabilities must be a list of non-empty strings",
                    )),
                })
                .collect::<Result<Vec<_>, _>>()?,
            Some(_) => {
                return Err(CaseError::schema(
                    "requires.capabilities must be a list of non-empty strings",
                ));
            }
        };
        let when_missing = match mapping.get("when_missing") {
            None | Some(Value::Null) => WhenMissing::default(),
            Some(value) => match value.as_str().map(str::trim) {
                Some("skip") => WhenMissing::Skip,
                Some("fail") => WhenMissing::Fail,
                _ => {
                    return Err(CaseError::schema(
                        "requires.when_missing must be one of: skip, fail",
                    ));
                }
            },
        };
        Ok(Some(Self {
            capabilities,
            when_missing,
        }))
    }
}

/// Result of gating a case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Evaluate the case.
    Proceed,
    /// Skip the case with the given message.
    Skip(String),
}

// ============================================================================
// SECTION: Gate
// ============================================================================

/// Applies the capability gate to a case.
///
/// # Errors
///
/// Returns [`CaseError::Schema`] for malformed `requires` blocks and
/// [`CaseError::Runtime`] when capabilities are missing under `fail`.
pub fn gate(case: &Case, supported: &CapabilitySet) -> Result<GateDecision, CaseError> {
    let Some(requirements) = Requirements::from_case(case)? else {
        return Ok(GateDecision::Proceed);
    };
    let missing = supported.missing(&requirements.capabilities);
    if missing.is_empty() {
        return Ok(GateDecision::Proceed);
    }
    let message = format!("missing required capabilities: {}", missing.join(", "));
    match requirements.when_missing {
        WhenMissing::Skip => Ok(GateDecision::Skip(message)),
        WhenMissing::Fail => Err(CaseError::runtime(message)),
    }
}
