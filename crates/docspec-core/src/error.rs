// crates/docspec-core/src/error.rs
// ============================================================================
// Module: Docspec Errors
// Description: Per-case and run-fatal error types.
// Purpose: Map failures onto report categories or abort the run.
// Dependencies: docspec-assert, thiserror
// ============================================================================

//! ## Overview
//! [`CaseError`] is caught at the case boundary and becomes a failing
//! [`crate::CaseResult`] whose category matches the variant.
//! [`DocumentError`] is never caught by the engine: unreadable or malformed
//! fixture documents abort the whole run.

// ============================================================================
// SECTION: Imports
// ============================================================================

use docspec_assert::AssertError;
use thiserror::Error;

use crate::report::FailureCategory;

// ============================================================================
// SECTION: Case Errors
// ============================================================================

/// Failure raised while evaluating a single case.
///
/// # Invariants
/// - Messages are reported verbatim in the case result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaseError {
    /// The case or its assertion tree has an invalid shape.
    #[error("{0}")]
    Schema(String),
    /// An assertion did not hold.
    #[error("{0}")]
    Assertion(String),
    /// The subject could not be produced.
    #[error("{0}")]
    Runtime(String),
}

impl CaseError {
    /// Creates a schema error.
    #[must_use]
    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema(message.into())
    }

    /// Creates an assertion failure.
    #[must_use]
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::Assertion(message.into())
    }

    /// Creates a runtime error.
    #[must_use]
    pub fn runtime(message: impl Into<String>) -> Self {
        Self::Runtime(message.into())
    }

    /// Returns the report category for this error.
    #[must_use]
    pub const fn category(&self) -> FailureCategory {
        match self {
            Self::Schema(_) => FailureCategory::Schema,
            Self::Assertion(_) => FailureCategory::Assertion,
            Self::Runtime(_) => FailureCategory::Runtime,
        }
    }

    /// Returns the error message.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Schema(message) | Self::Assertion(message) | Self::Runtime(message) => message,
        }
    }
}

impl From<AssertError> for CaseError {
    fn from(error: AssertError) -> Self {
        match error {
            AssertError::Schema(message) => Self::Schema(message),
            AssertError::Runtime(message) => Self::Runtime(message),
        }
    }
}

// ============================================================================
// SECTION: Document Errors
// ============================================================================

/// Run-fatal failure while locating, reading, or decoding fixture documents.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The document could not be read.
    #[error("cannot read {path}: {message}")]
    Read {
        /// Document path.
        path: String,
        /// Underlying error text.
        message: String,
    },
    /// The document exceeds the configured size limit.
    #[error("{path} exceeds size limit of {limit} bytes")]
    TooLarge {
        /// Document path.
        path: String,
        /// Configured limit in bytes.
        limit: usize,
    },
    /// A payload could not be decoded.
    #[error("cannot decode spec-test payload in {path}: {message}")]
    Decode {
        /// Document path.
        path: String,
        /// Decoder error text.
        message: String,
    },
    /// A payload decoded but does not have the shape of a case list.
    #[error("{0}")]
    Shape(String),
    /// The case location could not be listed or matched no supported format.
    #[error("{0}")]
    Listing(String),
}
