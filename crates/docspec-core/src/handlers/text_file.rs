// crates/docspec-core/src/handlers/text_file.rs
// ============================================================================
// Module: text.file Handler
// Description: Asserts over the text of the fixture document or a sibling file.
// Purpose: Evaluate `text.file` cases against the `text` target.
// Dependencies: docspec-assert, serde_yaml
// ============================================================================

//! ## Overview
//! The subject is the fixture document itself unless the case names a
//! `path`, which is resolved relative to the document and confined to its
//! contract root. Only the `text` target exists, with `contain` and `regex`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use docspec_assert::AssertError;
use docspec_assert::AssertNode;
use docspec_assert::AssertResult;
use docspec_assert::LeafRequest;
use docspec_assert::Outcome;
use docspec_assert::evaluate_root;
use serde_yaml::Value;

use super::CaseHandler;
use super::HandlerContext;
use super::evaluate_text_ops;
use super::outcome_to_result;
use crate::cases::Case;
use crate::cases::read_text_limited;
use crate::error::CaseError;
use crate::sandbox::canonical_document;
use crate::sandbox::resolve_text_path;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Case type handled here.
pub const TEXT_FILE_TYPE: &str = "text.file";

/// The only target this handler understands.
const TEXT_TARGET: &str = "text";

// ============================================================================
// SECTION: Handler
// ============================================================================

/// Handler for `text.file` cases.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextFileHandler;

impl CaseHandler for TextFileHandler {
    fn case_type(&self) -> &'static str {
        TEXT_FILE_TYPE
    }

    fn evaluate(
        &self,
        case: &Case,
        tree: &AssertNode,
        context: &HandlerContext<'_>,
    ) -> Result<(), CaseError> {
        let subject_path = match case.present_field("path") {
            None => canonical_document(&case.document)?,
            Some(Value::String(raw)) => resolve_text_path(&case.document, raw)?,
            Some(_) => return Err(CaseError::schema("text.file path must be a string")),
        };
        let subject = read_text_limited(&subject_path, context.settings.max_fixture_bytes)
            .map_err(|err| CaseError::runtime(err.to_string()))?;
        let evaluator = |request: &LeafRequest<'_>| -> AssertResult<Outcome> {
            if request.target != TEXT_TARGET {
                return Err(AssertError::schema(format!(
                    "unknown assert target: {}",
                    request.target
                )));
            }
            evaluate_text_ops(request, &subject)
        };
        outcome_to_result(evaluate_root(tree, &case.id, &evaluator)?)
    }
}
