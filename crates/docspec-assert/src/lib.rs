// crates/docspec-assert/src/lib.rs
// ============================================================================
// Module: Assertion Engine Root
// Description: Public API surface for the assertion subsystem.
// Purpose: Wire together the tree model, parser, evaluator, and health linter.
// Dependencies: crate::{error, eval, health, parse, tree}
// ============================================================================

//! ## Overview
//! Docspec assertions are small trees of `must`/`can`/`cannot` groups over
//! `contain`/`regex`/`json_type`/`exists` leaves. This crate parses the YAML
//! shape into a typed tree once, lints it for vacuous or non-portable
//! patterns, and evaluates it against a caller-supplied leaf evaluator. It
//! knows nothing about case types or subjects; handlers live in
//! `docspec-core`.

// ============================================================================
// SECTION: Core Modules
// ============================================================================

pub mod error;
pub mod eval;
pub mod health;
pub mod parse;
pub mod tree;


// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use error::AssertError;
pub use error::AssertResult;
pub use eval::LeafEvaluator;
pub use eval::LeafRequest;
pub use eval::Outcome;
pub use eval::ROOT_PATH;
pub use eval::evaluate;
pub use eval::evaluate_root;
pub use health::Diagnostic;
pub use health::HealthCode;
pub use health::HealthMode;
pub use health::format_health_failure;
pub use health::lint;
pub use parse::parse_assertion;
pub use tree::AssertGroup;
pub use tree::AssertLeaf;
pub use tree::AssertNode;
pub use tree::GroupKind;
pub use tree::LeafEntry;
pub use tree::LeafOp;
pub use tree::operand_text;
