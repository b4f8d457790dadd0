// crates/docspec-core/src/lib.rs
// ============================================================================
// Module: Docspec Core Library
// Description: Case extraction, evaluation, and reporting for docspec fixtures.
// Purpose: Provide the run engine used by the docspec CLI.
// Dependencies: docspec-assert, regex, serde, serde_json, serde_yaml, thiserror, wait-timeout
// ============================================================================

//! ## Overview
//! A run walks fixture documents in order. Each document yields cases
//! (from fenced `spec-test` YAML blocks or whole-file YAML/JSON), each case
//! passes the capability gate, is dispatched to its type handler, and ends as
//! exactly one [`CaseResult`]. Per-case problems never abort the run; only
//! [`DocumentError`]s do.
//!
//! Security posture: fixture documents and the commands they name are
//! trusted to the extent the operator trusts the repository. `text.file`
//! paths are confined to the contract root and child environments are
//! filtered through the configured allow-list.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod capabilities;
pub mod cases;
pub mod discovery;
pub mod environment;
pub mod error;
pub mod fence;
pub mod handlers;
pub mod leaf;
pub mod logging;
pub mod process;
pub mod report;
pub mod runner;
pub mod sandbox;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use capabilities::CapabilitySet;
pub use capabilities::GateDecision;
pub use capabilities::Requirements;
pub use capabilities::WhenMissing;
pub use cases::Case;
pub use cases::NormalizeOptions;
pub use cases::load_document;
pub use cases::normalize_payload;
pub use discovery::CaseFormat;
pub use discovery::DiscoveryOptions;
pub use discovery::DocumentSource;
pub use discovery::discover_documents;
pub use environment::EnvAllowlist;
pub use environment::ProcessEnvironment;
pub use error::CaseError;
pub use error::DocumentError;
pub use fence::FenceBlock;
pub use fence::FenceBlocks;
pub use fence::fence_blocks;
pub use handlers::CaseHandler;
pub use handlers::HandlerContext;
pub use logging::FileLogSink;
pub use logging::NoopLogSink;
pub use logging::RunEvent;
pub use logging::RunLogSink;
pub use logging::StderrLogSink;
pub use report::CaseResult;
pub use report::CaseStatus;
pub use report::FailureCategory;
pub use report::REPORT_VERSION;
pub use report::Report;
pub use report::write_report;
pub use runner::CaseEvaluation;
pub use runner::CaseWarning;
pub use runner::RunOutcome;
pub use runner::RunSettings;
pub use runner::Runner;
pub use runner::lint_case;
