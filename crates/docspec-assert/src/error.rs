// crates/docspec-assert/src/error.rs
// ============================================================================
// Module: Assertion Error Definitions
// Description: Schema and runtime errors raised while parsing or evaluating.
// Purpose: Separate hard errors from ordinary assertion failures.
// Dependencies: std::fmt
// ============================================================================

//! ## Overview
//! Assertion *failures* are ordinary values ([`crate::Outcome::Fail`]) so that
//! `can` and `cannot` groups can absorb them. Everything in this module is a
//! hard error: a malformed tree or an evaluator that could not run at all.
//! These always propagate through every group kind.

use std::fmt;

/// Hard errors raised by the assertion engine.
///
/// # Invariants
/// - The message is reported verbatim; `Display` adds no prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssertError {
    /// The assertion tree or a case field has an invalid shape.
    Schema(String),
    /// The subject could not be produced or inspected.
    Runtime(String),
}

impl AssertError {
    /// Creates a schema error.
    #[must_use]
    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema(message.into())
    }

    /// Creates a runtime error.
    #[must_use]
    pub fn runtime(message: impl Into<String>) -> Self {
        Self::Runtime(message.into())
    }

    /// Returns the message carried by the error.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Schema(message) | Self::Runtime(message) => message,
        }
    }

    /// Returns true for schema errors.
    #[must_use]
    pub const fn is_schema(&self) -> bool {
        matches!(self, Self::Schema(_))
    }
}

impl fmt::Display for AssertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for AssertError {}

/// Result alias for assertion engine operations.
pub type AssertResult<T> = Result<T, AssertError>;
