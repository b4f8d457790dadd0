// crates/docspec-cli/src/i18n.rs
// ============================================================================
// Module: CLI Message Catalog
// Description: Message catalog and placeholder substitution for the CLI.
// Purpose: Centralize user-facing strings so output stays consistent.
// Dependencies: Standard library collections.
// ============================================================================

//! ## Overview
//! All runtime output of the `docspec` binary is routed through the
//! [`t!`](crate::t) macro. Missing keys fall back to the key itself.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// SECTION: Types
// ============================================================================

/// A formatted message argument captured by the [`macro@crate::t`] macro.
#[derive(Clone)]
pub struct MessageArg {
    /// The placeholder name used in message templates (e.g., `"path"`).
    pub key: &'static str,
    /// The formatted string value to substitute for this placeholder.
    pub value: String,
}

impl MessageArg {
    /// Constructs a new [`MessageArg`] from a key and displayable value.
    pub fn new(key: &'static str, value: impl Into<String>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// English catalog entries.
const CATALOG: &[(&str, &str)] = &[
    ("main.version", "docspec {version}"),
    ("main.error", "ERROR: {error}"),
    ("output.stream.stdout", "stdout"),
    ("output.stream.stderr", "stderr"),
    ("output.write_failed", "Failed to write to {stream}: {error}"),
    ("config.load_failed", "{error}"),
    ("cases.missing", "cases path does not exist: {path}"),
    ("cases.pattern_empty", "--case-file-pattern requires a non-empty value"),
    ("cases.formats_invalid", "--case-formats: {error}"),
    ("run.log_open_failed", "{error}"),
    ("run.failed", "{error}"),
    ("run.report_failed", "cannot write report {path}: {error}"),
    ("run.wrote", "wrote {path}"),
    (
        "run.summary",
        "{total} case(s): {passed} passed, {failed} failed, {skipped} skipped",
    ),
    ("run.warn.assert_health", "WARN: ASSERT_HEALTH {code} at {path}: {message}"),
    ("lint.diagnostic", "{case_id}: {code} at {path}: {message}"),
    ("lint.invalid", "{case_id}: {category} error: {message}"),
    ("lint.clean", "{count} case(s) checked, no assertion health issues"),
    ("lint.summary", "{count} case(s) checked, {issues} issue(s) found"),
];

/// Returns the catalog as a lookup map.
fn catalog() -> &'static HashMap<&'static str, &'static str> {
    static CATALOG_MAP: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    CATALOG_MAP.get_or_init(|| CATALOG.iter().copied().collect())
}

// ============================================================================
// SECTION: Translation
// ============================================================================

/// Looks up `key` and substitutes `args` into its placeholders.
#[must_use]
pub fn translate(key: &str, args: Vec<MessageArg>) -> String {
    let template = catalog().get(key).copied().unwrap_or(key);
    let mut result = template.to_string();
    for arg in args {
        let placeholder = format!("{{{}}}", arg.key);
        result = result.replace(&placeholder, &arg.value);
    }
    result
}

// ============================================================================
// SECTION: Macro
// ============================================================================

/// Formats a catalog message from a key and named arguments.
///
/// # Arguments
///
/// - `$key` must match a catalog entry.
/// - Named arguments are substituted into `{placeholder}` positions.
#[macro_export]
macro_rules! t {
    ($key:literal $(, $name:ident = $value:expr )* $(,)?) => {{
        let args = ::std::vec![
            $(
                $crate::i18n::MessageArg::new(stringify!($name), $value.to_string()),
            )*
        ];
        $crate::i18n::translate($key, args)
    }};
}
