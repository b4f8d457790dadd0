// crates/docspec-core/src/cases.rs
// ============================================================================
// Module: Case Normalizer
// Description: Decodes fixture payloads into case records.
// Purpose: Turn YAML or JSON payloads into an ordered list of cases.
// Dependencies: serde_json, serde_yaml
// ============================================================================

//! ## Overview
//! Payloads decode to either a single mapping or a list of mappings. Every
//! element must carry `id` and `type` keys; a missing key, a non-mapping
//! element, or a scalar payload is a [`DocumentError`] that aborts the run.
//! Keys that are present but blank are left for the runner to report as a
//! per-case schema failure.
//!
//! Under the compatibility profile ([`NormalizeOptions::kind_alias`]) a
//! `kind` key stands in for a missing `type`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::path::PathBuf;

use docspec_assert::operand_text;
use serde_yaml::Mapping;
use serde_yaml::Value;

use crate::discovery::CaseFormat;
use crate::discovery::DocumentSource;
use crate::error::DocumentError;
use crate::fence::fence_blocks;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Case identifier key.
const ID_KEY: &str = "id";
/// Case type key.
const TYPE_KEY: &str = "type";
/// Legacy alias for the case type key.
const KIND_KEY: &str = "kind";

// ============================================================================
// SECTION: Types
// ============================================================================

/// Normalization profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// Accept `kind` as an alias for a missing `type`.
    pub kind_alias: bool,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            kind_alias: true,
        }
    }
}

/// One test case extracted from a fixture document.
///
/// # Invariants
/// - `fields` contains both the `id` and `type` keys.
/// - `id` and `case_type` are the string renderings of those keys and may be
///   empty; the runner rejects empty values before evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct Case {
    /// Case identifier.
    pub id: String,
    /// Case type name.
    pub case_type: String,
    /// Full case mapping, including `id` and `type`.
    pub fields: Mapping,
    /// Fixture document the case was read from.
    pub document: PathBuf,
}

impl Case {
    /// Returns a top-level case field.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Returns a top-level field, treating explicit null as absent.
    #[must_use]
    pub fn present_field(&self, key: &str) -> Option<&Value> {
        self.field(key).filter(|value| !value.is_null())
    }
}

// ============================================================================
// SECTION: Normalization
// ============================================================================

/// Normalizes a decoded payload into cases.
///
/// # Errors
///
/// Returns [`DocumentError::Shape`] when the payload is not a mapping or a
/// list of mappings, or when an element lacks `id` or `type`.
pub fn normalize_payload(
    payload: Value,
    document: &Path,
    options: NormalizeOptions,
) -> Result<Vec<Case>, DocumentError> {
    let shown = document.display();
    match payload {
        Value::Sequence(items) => items
            .into_iter()
            .map(|item| match item {
                Value::Mapping(mapping) => normalize_mapping(mapping, document, options),
                _ => Err(DocumentError::Shape(format!(
                    "spec-test block in {shown} contains a non-mapping test"
                ))),
            })
            .collect(),
        Value::Mapping(mapping) => Ok(vec![normalize_mapping(mapping, document, options)?]),
        _ => Err(DocumentError::Shape(format!(
            "spec-test block in {shown} must be a mapping or a list of mappings"
        ))),
    }
}

/// Normalizes one case mapping.
fn normalize_mapping(
    mut mapping: Mapping,
    document: &Path,
    options: NormalizeOptions,
) -> Result<Case, DocumentError> {
    if options.kind_alias
        && !mapping.contains_key(TYPE_KEY)
        && let Some(kind) = mapping.remove(KIND_KEY)
    {
        mapping.insert(Value::String(TYPE_KEY.to_string()), kind);
    }
    let (Some(id), Some(case_type)) = (mapping.get(ID_KEY), mapping.get(TYPE_KEY)) else {
        return Err(DocumentError::Shape(format!(
            "spec-test in {} must include 'id' and 'type'",
            document.display()
        )));
    };
    Ok(Case {
        id: operand_text(id).trim().to_string(),
        case_type: operand_text(case_type).trim().to_string(),
        fields: mapping,
        document: document.to_path_buf(),
    })
}

// ============================================================================
// SECTION: Document Loading
// ============================================================================

/// Reads and normalizes every case in a fixture document.
///
/// # Errors
///
/// Returns [`DocumentError`] when the document cannot be read, exceeds
/// `max_bytes`, or any payload fails to decode or normalize.
pub fn load_document(
    source: &DocumentSource,
    options: NormalizeOptions,
    max_bytes: usize,
) -> Result<Vec<Case>, DocumentError> {
    let path = source.path.as_path();
    let text = read_text_limited(path, max_bytes)?;
    match source.format {
        CaseFormat::Markdown => {
            let mut cases = Vec::new();
            for block in fence_blocks(&text) {
                let payload: Value = serde_yaml::from_str(&block.payload).map_err(|err| {
                    DocumentError::Decode {
                        path: format!("{}:{}", path.display(), block.line),
                        message: err.to_string(),
                    }
                })?;
                cases.extend(normalize_payload(payload, path, options)?);
            }
            Ok(cases)
        }
        CaseFormat::Yaml => {
            let payload: Value =
                serde_yaml::from_str(&text).map_err(|err| decode_error(path, &err))?;
            normalize_payload(payload, path, options)
        }
        CaseFormat::Json => {
            let payload: Value =
                serde_json::from_str(&text).map_err(|err| decode_error(path, &err))?;
            normalize_payload(payload, path, options)
        }
    }
}

/// Builds a decode error for a whole-file payload.
fn decode_error(path: &Path, error: &dyn std::error::Error) -> DocumentError {
    DocumentError::Decode {
        path: path.display().to_string(),
        message: error.to_string(),
    }
}

/// Reads a UTF-8 file while enforcing a maximum byte limit.
///
/// # Errors
///
/// Returns [`DocumentError`] on I/O failure, oversize input, or invalid UTF-8.
pub fn read_text_limited(path: &Path, max_bytes: usize) -> Result<String, DocumentError> {
    let read_error = |message: String| DocumentError::Read {
        path: path.display().to_string(),
        message,
    };
    let file = File::open(path).map_err(|err| read_error(err.to_string()))?;
    let limit = u64::try_from(max_bytes.saturating_add(1)).unwrap_or(u64::MAX);
    let mut bytes = Vec::new();
    file.take(limit).read_to_end(&mut bytes).map_err(|err| read_error(err.to_string()))?;
    if bytes.len() > max_bytes {
        return Err(DocumentError::TooLarge {
            path: path.display().to_string(),
            limit: max_bytes,
        });
    }
    String::from_utf8(bytes).map_err(|_| read_error("document must be utf-8".to_string()))
}
