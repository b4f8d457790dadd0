// crates/docspec-core/src/sandbox.rs
// ============================================================================
// Module: Path Sandbox
// Description: Contract-root discovery and confinement of fixture-relative paths.
// Purpose: Keep `text.file` reads inside the repository that owns the fixture.
// Dependencies: std
// ============================================================================

//! ## Overview
//! The contract root of a fixture document is the nearest ancestor directory
//! containing a `.git` entry (a directory, or a file for worktrees and
//! submodules). Documents outside any repository use their own directory.
//!
//! ## Invariants
//! - Resolution is lexical: `.` and `..` are folded without touching the
//!   filesystem, and the result must stay under the contract root.
//! - Absolute paths, POSIX or drive-letter, are rejected before joining.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use crate::error::CaseError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Entry that marks a repository root.
pub const ROOT_MARKER: &str = ".git";

// ============================================================================
// SECTION: Resolution
// ============================================================================

/// Returns the canonical path of a fixture document.
///
/// # Errors
///
/// Returns [`CaseError::Runtime`] when the document cannot be canonicalized.
pub fn canonical_document(document: &Path) -> Result<PathBuf, CaseError> {
    document.canonicalize().map_err(|err| {
        CaseError::runtime(format!("cannot resolve fixture path {}: {err}", document.display()))
    })
}

/// Returns the contract root for a canonical document path.
#[must_use]
pub fn contract_root(document: &Path) -> PathBuf {
    let start = document.parent().unwrap_or(document);
    start
        .ancestors()
        .find(|dir| dir.join(ROOT_MARKER).exists())
        .unwrap_or(start)
        .to_path_buf()
}

/// Resolves a `text.file` path relative to its fixture document.
///
/// # Errors
///
/// Returns [`CaseError::Schema`] for blank or absolute paths and for paths
/// that escape the contract root; [`CaseError::Runtime`] when the document
/// itself cannot be resolved.
pub fn resolve_text_path(document: &Path, raw: &str) -> Result<PathBuf, CaseError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(CaseError::schema("text.file path must be non-empty"));
    }
    if is_os_absolute(raw) {
        return Err(CaseError::schema("text.file path must be relative"));
    }
    let document = canonical_document(document)?;
    let root = contract_root(&document);
    let base = document.parent().unwrap_or(&root);
    let candidate = normalize_lexically(&base.join(raw));
    if !candidate.starts_with(&root) {
        return Err(CaseError::schema("text.file path escapes contract root"));
    }
    if candidate.exists() {
        let canonical = candidate
            .canonicalize()
            .map_err(|_| CaseError::schema("text.file path escapes contract root"))?;
        let canonical_root = root
            .canonicalize()
            .map_err(|_| CaseError::schema("text.file path escapes contract root"))?;
        if !canonical.starts_with(&canonical_root) {
            return Err(CaseError::schema("text.file path escapes contract root"));
        }
        return Ok(canonical);
    }
    Ok(candidate)
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns true for POSIX, UNC, or drive-letter absolute paths.
fn is_os_absolute(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    let drive = bytes.len() >= 3
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && matches!(bytes[2], b'/' | b'\\');
    raw.starts_with('/') || raw.starts_with('\\') || drive || Path::new(raw).is_absolute()
}

/// Folds `.` and `..` components without consulting the filesystem.
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            Component::Prefix(_) | Component::RootDir | Component::Normal(_) => {
                normalized.push(component.as_os_str());
            }
        }
    }
    normalized
}
