// crates/docspec-core/src/fence.rs
// ============================================================================
// Module: Fence Extractor
// Description: Locates fenced `spec-test` YAML blocks inside Markdown text.
// Purpose: Yield raw case payloads in document order without parsing Markdown.
// Dependencies: std
// ============================================================================

//! ## Overview
//! A qualifying block opens with at least three backticks or tildes (after
//! optional spaces or tabs) followed by an info string whose lowercase,
//! whitespace-separated tokens include `spec-test` and one of `yaml`/`yml`.
//! It closes on a line consisting only of the same fence character repeated
//! at least as many times as the opener.
//!
//! ## Invariants
//! - Blocks are yielded in document order and scanning resumes after each
//!   closing fence.
//! - An unterminated block ends the scan; its content is never yielded.
//! - Fences that do not qualify are not tracked, so their content is scanned
//!   like any other text.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::iter::Enumerate;
use std::str::Lines;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Minimum fence run length.
const MIN_FENCE_LEN: usize = 3;
/// Info-string token that marks a test block.
const SPEC_TEST_TAG: &str = "spec-test";
/// Info-string tokens that mark YAML content.
const YAML_TAGS: [&str; 2] = ["yaml", "yml"];

// ============================================================================
// SECTION: Types
// ============================================================================

/// One extracted block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FenceBlock {
    /// 1-based line number of the opening fence.
    pub line: usize,
    /// Lines strictly between the fences, joined with `\n`.
    pub payload: String,
}

/// Opening fence of the block currently being collected.
#[derive(Debug, Clone, Copy)]
struct Opener {
    /// Fence character.
    fence: char,
    /// Number of fence characters in the opener.
    len: usize,
}

/// Lazy iterator over qualifying blocks.
#[derive(Debug)]
pub struct FenceBlocks<'a> {
    /// Remaining numbered lines.
    lines: Enumerate<Lines<'a>>,
    /// Set once an unterminated block is seen.
    exhausted: bool,
}

/// Returns an iterator over the `spec-test` blocks in `text`.
#[must_use]
pub fn fence_blocks(text: &str) -> FenceBlocks<'_> {
    FenceBlocks {
        lines: text.lines().enumerate(),
        exhausted: false,
    }
}

impl Iterator for FenceBlocks<'_> {
    type Item = FenceBlock;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }
        let (index, opener) =
            self.lines.by_ref().find_map(|(index, line)| parse_opener(line).map(|op| (index, op)))?;
        let mut body = Vec::new();
        for (_, line) in self.lines.by_ref() {
            if is_closer(line, opener) {
                return Some(FenceBlock {
                    line: index + 1,
                    payload: body.join("\n"),
                });
            }
            body.push(line);
        }
        self.exhausted = true;
        None
    }
}

// ============================================================================
// SECTION: Fence Recognition
// ============================================================================

/// Parses a qualifying opening fence.
fn parse_opener(line: &str) -> Option<Opener> {
    let stripped = line.trim_start_matches([' ', '\t']);
    let fence = stripped.chars().next().filter(|ch| matches!(ch, '`' | '~'))?;
    let len = stripped.chars().take_while(|ch| *ch == fence).count();
    if len < MIN_FENCE_LEN {
        return None;
    }
    let info = stripped[len * fence.len_utf8()..].trim();
    if info.is_empty() {
        return None;
    }
    let info = info.to_lowercase();
    let tokens: Vec<&str> = info.split_whitespace().collect();
    let tagged = tokens.contains(&SPEC_TEST_TAG);
    let yaml = tokens.iter().any(|token| YAML_TAGS.contains(token));
    (tagged && yaml).then_some(Opener {
        fence,
        len,
    })
}

/// Returns true when `line` closes a block opened by `opener`.
fn is_closer(line: &str, opener: Opener) -> bool {
    let trimmed = line.trim();
    let count = trimmed.chars().count();
    count >= opener.len && trimmed.chars().all(|ch| ch == opener.fence)
}
