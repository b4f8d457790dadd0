// crates/docspec-core/src/runner.rs
// ============================================================================
// Module: Case Runner
// Description: Sequential evaluation of fixture documents into a report.
// Purpose: Apply gate, health policy, and type dispatch to every case.
// Dependencies: docspec-assert
// ============================================================================

//! ## Overview
//! [`Runner::run`] walks documents in the order given and cases in document
//! order. Every case ends as exactly one [`CaseResult`]; per-case errors are
//! recorded, never raised. Only [`DocumentError`] aborts a run.
//!
//! Per-case order: id/type check, capability gate, handler lookup,
//! assert-health preamble, handler evaluation.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use docspec_assert::Diagnostic;
use docspec_assert::HealthMode;
use docspec_assert::lint;
use docspec_assert::parse_assertion;
use serde_yaml::Value;

use crate::capabilities::CapabilitySet;
use crate::capabilities::GateDecision;
use crate::capabilities::gate;
use crate::cases::Case;
use crate::cases::NormalizeOptions;
use crate::cases::load_document;
use crate::discovery::DocumentSource;
use crate::environment::EnvAllowlist;
use crate::environment::ProcessEnvironment;
use crate::error::CaseError;
use crate::error::DocumentError;
use crate::handlers::CaseHandler;
use crate::handlers::CliRunHandler;
use crate::handlers::HandlerContext;
use crate::handlers::TextFileHandler;
use crate::handlers::prepare_assertions;
use crate::logging::NoopLogSink;
use crate::logging::RunEvent;
use crate::logging::RunLogSink;
use crate::report::CaseResult;
use crate::report::Report;
use crate::report::UNKNOWN_CASE_ID;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default bound on a `cli.run` child, in milliseconds.
pub const DEFAULT_PROCESS_TIMEOUT_MS: u64 = 120_000;

/// Default maximum fixture document size in bytes.
pub const DEFAULT_MAX_FIXTURE_BYTES: usize = 4 * 1024 * 1024;

// ============================================================================
// SECTION: Settings
// ============================================================================

/// Run-level defaults. Case fields always take precedence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    /// Assert-health mode for cases without their own.
    pub assert_health: HealthMode,
    /// `cli.run` entrypoint for cases without their own.
    pub default_entrypoint: Option<String>,
    /// Variables children may inherit.
    pub env_allowlist: EnvAllowlist,
    /// Bound on each child process.
    pub process_timeout: Duration,
    /// Maximum fixture and subject size in bytes.
    pub max_fixture_bytes: usize,
    /// Case normalization profile.
    pub normalize: NormalizeOptions,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            assert_health: HealthMode::default(),
            default_entrypoint: None,
            env_allowlist: EnvAllowlist::default(),
            process_timeout: Duration::from_millis(DEFAULT_PROCESS_TIMEOUT_MS),
            max_fixture_bytes: DEFAULT_MAX_FIXTURE_BYTES,
            normalize: NormalizeOptions::default(),
        }
    }
}

// ============================================================================
// SECTION: Results
// ============================================================================

/// Result of one case plus its advisory diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseEvaluation {
    /// Report entry for the case.
    pub result: CaseResult,
    /// Diagnostics raised under `warn` mode.
    pub warnings: Vec<Diagnostic>,
}

/// Advisory diagnostic attributed to a case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseWarning {
    /// Case identifier.
    pub case_id: String,
    /// The diagnostic.
    pub diagnostic: Diagnostic,
}

/// Report and warnings of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    /// Report covering every case.
    pub report: Report,
    /// Warnings in emission order.
    pub warnings: Vec<CaseWarning>,
}

// ============================================================================
// SECTION: Runner
// ============================================================================

/// Evaluates cases with a fixed environment snapshot and handler set.
pub struct Runner {
    /// Run-level defaults.
    settings: RunSettings,
    /// Environment snapshot for children.
    environment: ProcessEnvironment,
    /// Capabilities consulted by the gate.
    capabilities: CapabilitySet,
    /// Registered case type handlers.
    handlers: Vec<Box<dyn CaseHandler>>,
    /// Event destination.
    sink: Arc<dyn RunLogSink>,
}

impl Runner {
    /// Creates a runner with the built-in handlers and a no-op sink.
    #[must_use]
    pub fn new(settings: RunSettings, environment: ProcessEnvironment) -> Self {
        Self {
            settings,
            environment,
            capabilities: CapabilitySet::supported(),
            handlers: vec![Box::new(TextFileHandler), Box::new(CliRunHandler)],
            sink: Arc::new(NoopLogSink),
        }
    }

    /// Replaces the event sink.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn RunLogSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Replaces the capability set consulted by the gate.
    #[must_use]
    pub fn with_capabilities(mut self, capabilities: CapabilitySet) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Returns the run settings.
    #[must_use]
    pub const fn settings(&self) -> &RunSettings {
        &self.settings
    }

    /// Evaluates every case in `sources`, in order.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError`] when a document cannot be read, decoded, or
    /// normalized. Cases evaluated before the failure are discarded.
    pub fn run(&self, sources: &[DocumentSource]) -> Result<RunOutcome, DocumentError> {
        self.sink.record(&RunEvent::run_started(sources.len()));
        let mut results = Vec::new();
        let mut warnings = Vec::new();
        for source in sources {
            let cases =
                load_document(source, self.settings.normalize, self.settings.max_fixture_bytes)?;
            self.sink.record(&RunEvent::document_loaded(&source.path, cases.len()));
            for case in &cases {
                let evaluation = self.evaluate_case(case);
                for diagnostic in evaluation.warnings {
                    self.sink
                        .record(&RunEvent::assert_health_warning(&evaluation.result.id, &diagnostic));
                    warnings.push(CaseWarning {
                        case_id: evaluation.result.id.clone(),
                        diagnostic,
                    });
                }
                self.sink.record(&RunEvent::case_finished(&source.path, &evaluation.result));
                results.push(evaluation.result);
            }
        }
        let report = Report::new(results);
        self.sink.record(&RunEvent::run_finished(&report));
        Ok(RunOutcome {
            report,
            warnings,
        })
    }

    /// Evaluates one case to exactly one result.
    #[must_use]
    pub fn evaluate_case(&self, case: &Case) -> CaseEvaluation {
        if case.id.is_empty() || case.case_type.is_empty() {
            let id = if case.id.is_empty() { UNKNOWN_CASE_ID } else { case.id.as_str() };
            return CaseEvaluation {
                result: CaseResult::fail(id, &CaseError::schema("case missing id or type")),
                warnings: Vec::new(),
            };
        }
        let mut warnings = Vec::new();
        let result = match self.dispatch(case, &mut warnings) {
            Ok(GateDecision::Proceed) => CaseResult::pass(case.id.as_str()),
            Ok(GateDecision::Skip(message)) => CaseResult::skip(case.id.as_str(), message),
            Err(err) => CaseResult::fail(case.id.as_str(), &err),
        };
        CaseEvaluation {
            result,
            warnings,
        }
    }

    /// Gates, prepares, and hands a case to its handler.
    fn dispatch(
        &self,
        case: &Case,
        warnings: &mut Vec<Diagnostic>,
    ) -> Result<GateDecision, CaseError> {
        if let GateDecision::Skip(message) = gate(case, &self.capabilities)? {
            return Ok(GateDecision::Skip(message));
        }
        let handler = self
            .handlers
            .iter()
            .find(|handler| handler.case_type() == case.case_type)
            .ok_or_else(|| CaseError::runtime(format!("unknown case type: {}", case.case_type)))?;
        let prepared = prepare_assertions(case, self.settings.assert_health)?;
        warnings.extend(prepared.warnings);
        let context = HandlerContext {
            settings: &self.settings,
            environment: &self.environment,
        };
        handler.evaluate(case, &prepared.tree, &context)?;
        Ok(GateDecision::Proceed)
    }
}

// ============================================================================
// SECTION: Lint
// ============================================================================

/// Parses a case's assertions and returns every health diagnostic,
/// regardless of its assert-health mode.
///
/// # Errors
///
/// Returns [`CaseError::Schema`] when the tree is malformed.
pub fn lint_case(case: &Case) -> Result<Vec<Diagnostic>, CaseError> {
    let tree = parse_assertion(case.field("assert").unwrap_or(&Value::Null))?;
    Ok(lint(&tree))
}
