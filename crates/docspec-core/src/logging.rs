// crates/docspec-core/src/logging.rs
// ============================================================================
// Module: Run Event Logging
// Description: Structured JSON-lines events emitted during a run.
// Purpose: Let operators trace documents, cases, and warnings without a logger stack.
// Dependencies: docspec-assert, serde, serde_json
// ============================================================================

//! ## Overview
//! A [`Runner`](crate::runner::Runner) reports progress through a
//! [`RunLogSink`]. Each [`RunEvent`] serializes to one JSON object per line.
//! Sink failures are swallowed; logging never changes a run's outcome.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use docspec_assert::Diagnostic;
use docspec_assert::HealthCode;
use serde::Serialize;

use crate::report::CaseResult;
use crate::report::CaseStatus;
use crate::report::Report;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Run event payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Fixture document path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
    /// Case identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub case_id: Option<String>,
    /// Case status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<CaseStatus>,
    /// Assert-health code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<HealthCode>,
    /// Assertion path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Failure, skip, or diagnostic message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Count of documents or cases, depending on the event.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    /// Count of failed cases.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failures: Option<usize>,
}

impl RunEvent {
    /// Creates an empty event with a consistent timestamp.
    fn base(event: &'static str) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        Self {
            event,
            timestamp_ms,
            document: None,
            case_id: None,
            status: None,
            code: None,
            path: None,
            message: None,
            count: None,
            failures: None,
        }
    }

    /// A run began over `documents` fixture documents.
    #[must_use]
    pub fn run_started(documents: usize) -> Self {
        Self {
            count: Some(documents),
            ..Self::base("run_started")
        }
    }

    /// A document was read and yielded `cases` cases.
    #[must_use]
    pub fn document_loaded(document: &Path, cases: usize) -> Self {
        Self {
            document: Some(document.display().to_string()),
            count: Some(cases),
            ..Self::base("document_loaded")
        }
    }

    /// A case produced its result.
    #[must_use]
    pub fn case_finished(document: &Path, result: &CaseResult) -> Self {
        Self {
            document: Some(document.display().to_string()),
            case_id: Some(result.id.clone()),
            status: Some(result.status),
            message: result.message.clone(),
            ..Self::base("case_finished")
        }
    }

    /// An advisory assert-health diagnostic was raised.
    #[must_use]
    pub fn assert_health_warning(case_id: &str, diagnostic: &Diagnostic) -> Self {
        Self {
            case_id: Some(case_id.to_string()),
            code: Some(diagnostic.code),
            path: Some(diagnostic.path.clone()),
            message: Some(diagnostic.message.clone()),
            ..Self::base("assert_health_warning")
        }
    }

    /// The run completed.
    #[must_use]
    pub fn run_finished(report: &Report) -> Self {
        Self {
            count: Some(report.results.len()),
            failures: Some(report.count(CaseStatus::Fail)),
            ..Self::base("run_finished")
        }
    }
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Destination for run events.
pub trait RunLogSink: Send + Sync {
    /// Record a run event.
    fn record(&self, event: &RunEvent);
}

/// Sink that writes JSON lines to stderr.
pub struct StderrLogSink;

impl RunLogSink for StderrLogSink {
    fn record(&self, event: &RunEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(io::stderr(), "{payload}");
        }
    }
}

/// Sink that appends JSON lines to a file.
pub struct FileLogSink {
    /// Append-only handle.
    file: Mutex<std::fs::File>,
}

impl FileLogSink {
    /// Opens the log file in append mode, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl RunLogSink for FileLogSink {
    fn record(&self, event: &RunEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// Sink that drops every event.
pub struct NoopLogSink;

impl RunLogSink for NoopLogSink {
    fn record(&self, _event: &RunEvent) {}
}
