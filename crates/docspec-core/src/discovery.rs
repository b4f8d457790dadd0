// crates/docspec-core/src/discovery.rs
// ============================================================================
// Module: Fixture Discovery
// Description: Resolves the fixture documents a run should read.
// Purpose: Produce a deterministic, sorted list of documents and their formats.
// Dependencies: regex, serde
// ============================================================================

//! ## Overview
//! `--cases` names a single document or a directory. Directories are listed
//! non-recursively and entries are sorted by file name. Markdown documents
//! are selected with a case-insensitive glob (`*.spec.md` by default), YAML
//! and JSON documents by their `.spec.yaml`/`.spec.yml`/`.spec.json` suffix,
//! each only when its format is enabled. A document named explicitly is
//! also accepted as Markdown when it has an `.md` extension.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::str::FromStr;

use regex::Regex;
use regex::RegexBuilder;
use serde::Deserialize;
use serde::Serialize;

use crate::error::DocumentError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default glob for Markdown fixture documents.
pub const DEFAULT_CASE_PATTERN: &str = "*.spec.md";
/// File-name suffixes for whole-file YAML documents.
const YAML_SUFFIXES: [&str; 2] = [".spec.yaml", ".spec.yml"];
/// File-name suffix for whole-file JSON documents.
const JSON_SUFFIX: &str = ".spec.json";

// ============================================================================
// SECTION: Types
// ============================================================================

/// Fixture document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CaseFormat {
    /// Markdown with fenced `spec-test` blocks.
    #[serde(rename = "md")]
    Markdown,
    /// Whole-file YAML payload.
    #[serde(rename = "yaml")]
    Yaml,
    /// Whole-file JSON payload.
    #[serde(rename = "json")]
    Json,
}

impl CaseFormat {
    /// Returns the short format label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Markdown => "md",
            Self::Yaml => "yaml",
            Self::Json => "json",
        }
    }

    /// Parses a comma-separated format list such as `md,yaml`.
    ///
    /// # Errors
    ///
    /// Returns a message naming the first unsupported entry, or when no
    /// formats remain after trimming.
    pub fn parse_list(value: &str) -> Result<Vec<Self>, String> {
        let mut formats = Vec::new();
        for label in value.split(',').map(str::trim).filter(|label| !label.is_empty()) {
            let format = label.parse::<Self>()?;
            if !formats.contains(&format) {
                formats.push(format);
            }
        }
        if formats.is_empty() {
            return Err("case formats require at least one format".to_string());
        }
        Ok(formats)
    }
}

impl FromStr for CaseFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "md" | "markdown" => Ok(Self::Markdown),
            "yaml" | "yml" => Ok(Self::Yaml),
            "json" => Ok(Self::Json),
            other => Err(format!("unsupported case format: {other}")),
        }
    }
}

impl fmt::Display for CaseFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Discovery settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryOptions {
    /// Glob for Markdown documents (`*` and `?` wildcards).
    pub pattern: String,
    /// Enabled formats.
    pub formats: Vec<CaseFormat>,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_CASE_PATTERN.to_string(),
            formats: vec![CaseFormat::Markdown],
        }
    }
}

/// A fixture document selected for the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSource {
    /// Document path.
    pub path: PathBuf,
    /// Document format.
    pub format: CaseFormat,
}

// ============================================================================
// SECTION: Discovery
// ============================================================================

/// Resolves fixture documents under `cases`.
///
/// # Errors
///
/// Returns [`DocumentError::Listing`] when the location cannot be listed,
/// the pattern is empty, or an explicit file matches no enabled format.
pub fn discover_documents(
    cases: &Path,
    options: &DiscoveryOptions,
) -> Result<Vec<DocumentSource>, DocumentError> {
    let matcher = glob_regex(&options.pattern)?;
    if cases.is_file() {
        let name = file_name(cases);
        let explicit_markdown = options.formats.contains(&CaseFormat::Markdown)
            && name.to_ascii_lowercase().ends_with(".md");
        return classify(&name, &matcher, &options.formats)
            .or_else(|| explicit_markdown.then_some(CaseFormat::Markdown))
            .map(|format| {
                vec![DocumentSource {
                    path: cases.to_path_buf(),
                    format,
                }]
            })
            .ok_or_else(|| {
                DocumentError::Listing(format!(
                    "case file does not match enabled formats: {}",
                    cases.display()
                ))
            });
    }
    let entries = fs::read_dir(cases).map_err(|err| {
        DocumentError::Listing(format!("cannot list cases in {}: {err}", cases.display()))
    })?;
    let mut documents = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|err| {
            DocumentError::Listing(format!("cannot list cases in {}: {err}", cases.display()))
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if let Some(format) = classify(&file_name(&path), &matcher, &options.formats) {
            documents.push(DocumentSource {
                path,
                format,
            });
        }
    }
    documents.sort_by(|left, right| left.path.cmp(&right.path));
    Ok(documents)
}

/// Returns the format of a file name, if any enabled format selects it.
fn classify(name: &str, markdown: &Regex, formats: &[CaseFormat]) -> Option<CaseFormat> {
    let lowered = name.to_ascii_lowercase();
    formats.iter().copied().find(|format| match format {
        CaseFormat::Markdown => markdown.is_match(name),
        CaseFormat::Yaml => YAML_SUFFIXES.iter().any(|suffix| lowered.ends_with(suffix)),
        CaseFormat::Json => lowered.ends_with(JSON_SUFFIX),
    })
}

/// Returns the final path component as text.
fn file_name(path: &Path) -> String {
    path.file_name().map(|name| name.to_string_lossy().into_owned()).unwrap_or_default()
}

/// Compiles a file-name glob into an anchored, case-insensitive regex.
fn glob_regex(pattern: &str) -> Result<Regex, DocumentError> {
    let pattern = pattern.trim();
    if pattern.is_empty() {
        return Err(DocumentError::Listing("case file pattern must be non-empty".to_string()));
    }
    let mut source = String::from("^");
    for ch in pattern.chars() {
        match ch {
            '*' => source.push_str(".*"),
            '?' => source.push('.'),
            other => source.push_str(&regex::escape(other.encode_utf8(&mut [0; 4]))),
        }
    }
    source.push('$');
    RegexBuilder::new(&source)
        .case_insensitive(true)
        .build()
        .map_err(|err| DocumentError::Listing(format!("invalid case file pattern: {err}")))
}
