// crates/docspec-cli/src/lib.rs
// ============================================================================
// Module: Docspec CLI Library
// Description: Shared helpers for the docspec command-line interface.
// Purpose: Provide reusable components (i18n) for the CLI binary and tests.
// Dependencies: Standard library.
// ============================================================================

//! ## Overview
//! This library houses the message catalog used by the `docspec` binary so
//! every user-facing line is produced through [`t!`](crate::t).

// ============================================================================
// SECTION: Modules
// ============================================================================

/// Message catalog and translation helpers.
pub mod i18n;
