// crates/docspec-core/tests/cases.rs
// ============================================================================
// Module: Case Loading Tests
// Description: Payload normalization and whole-document loading.
// Purpose: Ensure documents yield ordered cases and fatal shape errors.
// Dependencies: docspec-core, tempfile
// ============================================================================
//! ## Overview
//! Integration tests for [`docspec_core::normalize_payload`] and
//! [`docspec_core::load_document`].

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod support;

use std::path::Path;

use docspec_core::CaseFormat;
use docspec_core::DocumentError;
use docspec_core::DocumentSource;
use docspec_core::NormalizeOptions;
use docspec_core::load_document;
use docspec_core::normalize_payload;
use support::TestResult;
use support::ensure;
use support::fenced;
use support::write_file;

/// Normalizes YAML with the given options.
fn normalize(yaml: &str, kind_alias: bool) -> TestResult<Result<Vec<String>, DocumentError>> {
    let payload: serde_yaml::Value = serde_yaml::from_str(yaml)?;
    let options = NormalizeOptions {
        kind_alias,
    };
    Ok(normalize_payload(payload, Path::new("doc.md"), options)
        .map(|cases| cases.into_iter().map(|case| format!("{}:{}", case.id, case.case_type)).collect()))
}

#[test]
fn mapping_and_list_payloads_normalize_in_order() -> TestResult {
    let single = normalize("id: a\ntype: text.file", true)?;
    ensure(single.ok() == Some(vec!["a:text.file".to_string()]), "single mapping")?;
    let list = normalize("- {id: a, type: x}\n- {id: 7, type: y}", true)?;
    ensure(list.ok() == Some(vec!["a:x".to_string(), "7:y".to_string()]), "list order")
}

#[test]
fn kind_alias_is_a_profile_switch() -> TestResult {
    let aliased = normalize("id: a\nkind: cli.run", true)?;
    ensure(aliased.ok() == Some(vec!["a:cli.run".to_string()]), "kind should alias type")?;
    let canonical = normalize("id: a\nkind: cli.run", false)?;
    ensure(
        matches!(canonical, Err(DocumentError::Shape(message)) if message.contains("must include 'id' and 'type'")),
        "canonical profile must ignore kind",
    )?;
    let both = normalize("id: a\ntype: text.file\nkind: cli.run", true)?;
    ensure(both.ok() == Some(vec!["a:text.file".to_string()]), "type wins over kind")
}

#[test]
fn shape_errors_are_fatal() -> TestResult {
    let scalar = normalize("just text", true)?;
    ensure(
        matches!(&scalar, Err(DocumentError::Shape(message)) if message.contains("must be a mapping or a list of mappings")),
        format!("unexpected {scalar:?}"),
    )?;
    let mixed = normalize("- {id: a, type: x}\n- 3", true)?;
    ensure(
        matches!(&mixed, Err(DocumentError::Shape(message)) if message.contains("contains a non-mapping test")),
        format!("unexpected {mixed:?}"),
    )?;
    let missing = normalize("id: a", true)?;
    ensure(
        matches!(&missing, Err(DocumentError::Shape(message)) if message.contains("must include 'id' and 'type'")),
        format!("unexpected {missing:?}"),
    )
}

#[test]
fn markdown_documents_concatenate_blocks() -> TestResult {
    let dir = tempfile::tempdir()?;
    let text = format!("{}\n{}", fenced("id: one\ntype: text.file"), fenced("- {id: two, type: text.file}\n- {id: three, type: cli.run}"));
    let path = write_file(dir.path(), "a.spec.md", &text)?;
    let source = DocumentSource {
        path: path.clone(),
        format: CaseFormat::Markdown,
    };
    let cases = load_document(&source, NormalizeOptions::default(), 1024 * 1024)?;
    let ids: Vec<&str> = cases.iter().map(|case| case.id.as_str()).collect();
    ensure(ids == ["one", "two", "three"], format!("ids {ids:?}"))?;
    ensure(cases.iter().all(|case| case.document == path), "cases remember their document")
}

#[test]
fn decode_errors_name_the_block_line() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = write_file(dir.path(), "bad.spec.md", "line one\n```spec-test yaml\nid: [unclosed\n```\n")?;
    let source = DocumentSource {
        path: path.clone(),
        format: CaseFormat::Markdown,
    };
    let err = load_document(&source, NormalizeOptions::default(), 1024)
        .err()
        .ok_or("expected decode error")?;
    let expected = format!("{}:2", path.display());
    ensure(
        matches!(&err, DocumentError::Decode { path, .. } if *path == expected),
        format!("unexpected {err:?}"),
    )
}

#[test]
fn whole_file_yaml_and_json_documents() -> TestResult {
    let dir = tempfile::tempdir()?;
    let yaml = write_file(dir.path(), "c.spec.yaml", "- id: y1\n  type: text.file\n")?;
    let json = write_file(dir.path(), "c.spec.json", r#"[{"id": "j1", "type": "cli.run"}]"#)?;
    let from_yaml = load_document(
        &DocumentSource {
            path: yaml,
            format: CaseFormat::Yaml,
        },
        NormalizeOptions::default(),
        1024,
    )?;
    let from_json = load_document(
        &DocumentSource {
            path: json,
            format: CaseFormat::Json,
        },
        NormalizeOptions::default(),
        1024,
    )?;
    ensure(from_yaml.len() == 1 && from_yaml[0].id == "y1", "yaml case")?;
    ensure(from_json.len() == 1 && from_json[0].case_type == "cli.run", "json case")
}

#[test]
fn oversize_documents_are_rejected() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = write_file(dir.path(), "big.spec.md", &"x".repeat(64))?;
    let source = DocumentSource {
        path,
        format: CaseFormat::Markdown,
    };
    let err = load_document(&source, NormalizeOptions::default(), 16).err();
    ensure(
        matches!(err, Some(DocumentError::TooLarge { limit: 16, .. })),
        format!("unexpected {err:?}"),
    )
}

#[test]
fn documents_without_blocks_yield_no_cases() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = write_file(dir.path(), "empty.spec.md", "# Nothing here\n")?;
    let source = DocumentSource {
        path,
        format: CaseFormat::Markdown,
    };
    let cases = load_document(&source, NormalizeOptions::default(), 1024)?;
    ensure(cases.is_empty(), "no blocks means no cases")
}
