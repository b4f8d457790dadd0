// crates/docspec-config/src/lib.rs
// ============================================================================
// Module: Docspec Config Library
// Description: Canonical configuration model for docspec runs.
// Purpose: Single source of truth for docspec.toml semantics.
// Dependencies: docspec-assert, docspec-core, serde, toml
// ============================================================================

//! ## Overview
//! `docspec-config` loads `docspec.toml`, layers `DOCSPEC_*` environment
//! overrides from an explicit snapshot, validates the result fail-closed,
//! and converts it into [`docspec_core::RunSettings`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
