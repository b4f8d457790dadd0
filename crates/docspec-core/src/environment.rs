// crates/docspec-core/src/environment.rs
// ============================================================================
// Module: Process Environment
// Description: Environment snapshot and allow-list filtering for child processes.
// Purpose: Pass the environment explicitly instead of reading globals mid-run.
// Dependencies: std
// ============================================================================

//! ## Overview
//! The run captures the process environment once. `cli.run` derives each
//! child environment from that snapshot by applying the [`EnvAllowlist`] and
//! then the case's `harness.env` overrides.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Immutable snapshot of environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProcessEnvironment {
    /// Variables keyed by name.
    vars: BTreeMap<String, String>,
}

impl ProcessEnvironment {
    /// Captures the current process environment, skipping non-UTF-8 entries.
    #[must_use]
    pub fn capture() -> Self {
        let vars = std::env::vars_os()
            .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
            .collect();
        Self {
            vars,
        }
    }

    /// Builds a snapshot from explicit pairs.
    #[must_use]
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs.into_iter().map(|(key, value)| (key.into(), value.into())).collect(),
        }
    }

    /// Returns every captured variable.
    #[must_use]
    pub const fn vars(&self) -> &BTreeMap<String, String> {
        &self.vars
    }

    /// Returns the variables visible to a child under `allowlist`.
    #[must_use]
    pub fn filtered(&self, allowlist: &EnvAllowlist) -> BTreeMap<String, String> {
        match allowlist {
            EnvAllowlist::Unrestricted => self.vars.clone(),
            EnvAllowlist::Only(names) => self
                .vars
                .iter()
                .filter(|(key, _)| names.contains(key.as_str()))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        }
    }
}

/// Names of variables a child process may inherit.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EnvAllowlist {
    /// Inherit everything.
    #[default]
    Unrestricted,
    /// Inherit only the named variables; an empty set inherits nothing.
    Only(BTreeSet<String>),
}

impl EnvAllowlist {
    /// Parses a comma-separated allow-list value.
    ///
    /// An unset or blank value is unrestricted. A non-blank value restricts
    /// inheritance to its trimmed, non-empty names, so `","` yields an empty
    /// allow-list.
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("") => Self::Unrestricted,
            Some(value) => Self::Only(
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(str::to_string)
                    .collect(),
            ),
        }
    }
}
