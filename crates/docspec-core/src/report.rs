// crates/docspec-core/src/report.rs
// ============================================================================
// Module: Run Report
// Description: Case results and the versioned report document.
// Purpose: Define the stable JSON shape consumed by conformance tooling.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! A [`Report`] is `{version: 1, results: [...]}` where each result carries
//! `id`, `status`, `category`, and `message` in that order. Absent category
//! and message serialize as `null` rather than being omitted so consumers can
//! rely on a fixed key set.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::io;
use std::path::Path;

use serde::Deserialize;
use serde::Serialize;

use crate::error::CaseError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Report format version.
pub const REPORT_VERSION: u32 = 1;

/// Identifier used when a case has no usable id.
pub const UNKNOWN_CASE_ID: &str = "UNKNOWN";

// ============================================================================
// SECTION: Types
// ============================================================================

/// Final status of a case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseStatus {
    /// Every assertion held.
    Pass,
    /// The case failed; see the category.
    Fail,
    /// The case was not run because capabilities were missing.
    Skip,
}

impl CaseStatus {
    /// Returns the lowercase status label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Fail => "fail",
            Self::Skip => "skip",
        }
    }
}

/// Category of a failing case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureCategory {
    /// Malformed case or assertion tree.
    Schema,
    /// An assertion did not hold.
    Assertion,
    /// The subject could not be produced.
    Runtime,
}

impl FailureCategory {
    /// Returns the lowercase category label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Schema => "schema",
            Self::Assertion => "assertion",
            Self::Runtime => "runtime",
        }
    }
}

/// Outcome of one case.
///
/// # Invariants
/// - `category` is set only when `status` is [`CaseStatus::Fail`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseResult {
    /// Case identifier.
    pub id: String,
    /// Final status.
    pub status: CaseStatus,
    /// Failure category.
    pub category: Option<FailureCategory>,
    /// Failure or skip explanation.
    pub message: Option<String>,
}

impl CaseResult {
    /// Creates a passing result.
    #[must_use]
    pub fn pass(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: CaseStatus::Pass,
            category: None,
            message: None,
        }
    }

    /// Creates a skipped result.
    #[must_use]
    pub fn skip(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: CaseStatus::Skip,
            category: None,
            message: Some(message.into()),
        }
    }

    /// Creates a failing result from a case error.
    #[must_use]
    pub fn fail(id: impl Into<String>, error: &CaseError) -> Self {
        Self {
            id: id.into(),
            status: CaseStatus::Fail,
            category: Some(error.category()),
            message: Some(error.message().to_string()),
        }
    }

    /// Returns true when the case failed.
    #[must_use]
    pub fn is_fail(&self) -> bool {
        self.status == CaseStatus::Fail
    }
}

/// Versioned run report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// Format version, always [`REPORT_VERSION`].
    pub version: u32,
    /// Results in document order, then case order.
    pub results: Vec<CaseResult>,
}

impl Report {
    /// Creates a report from ordered results.
    #[must_use]
    pub const fn new(results: Vec<CaseResult>) -> Self {
        Self {
            version: REPORT_VERSION,
            results,
        }
    }

    /// Returns true when any case failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.results.iter().any(CaseResult::is_fail)
    }

    /// Counts results with the given status.
    #[must_use]
    pub fn count(&self, status: CaseStatus) -> usize {
        self.results.iter().filter(|result| result.status == status).count()
    }

    /// Renders the report as pretty JSON with a trailing newline.
    ///
    /// # Errors
    ///
    /// Returns an error when serialization fails.
    pub fn to_pretty_json(&self) -> Result<String, serde_json::Error> {
        let mut text = serde_json::to_string_pretty(self)?;
        text.push('\n');
        Ok(text)
    }
}

// ============================================================================
// SECTION: Output
// ============================================================================

/// Writes the report to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns an error when serialization or any filesystem operation fails.
pub fn write_report(path: &Path, report: &Report) -> io::Result<()> {
    let text = report.to_pretty_json().map_err(io::Error::other)?;
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, text)
}
