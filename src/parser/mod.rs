//! Unified-diff hunk parser.
//!
//! Features:
//! - Works on hunks-only patches (no `---`/`+++` file headers required);
//!   anything before the first valid `@@` header is ignored.
//! - Strict header grammar, compiled once. A malformed header is skipped with
//!   a warning and parsing continues under stale counters, so a single bad
//!   header never aborts the whole file.
//! - Records every in-hunk line, including non-counted marker lines
//!   (`\ No newline at end of file`), together with running old/new counters.
//!
//! Counters are initialized to the header's declared starts and every content
//! line stores the post-increment pair: the first context line of a
//! `@@ -1,3 +1,4 @@` hunk records `(2, 2)`. Increments saturate at
//! `u32::MAX`, so a grammatically valid header declaring the ceiling cannot
//! wrap the counters.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::warn;

use crate::errors::ParseError;

lazy_static! {
    /// `@@ -<oldStart>[,<oldLen>] +<newStart>[,<newLen>] @@[ <section>]`
    static ref RE_HUNK_HEADER: Regex =
        Regex::new(r"^@@ -(\d+)(?:,(\d+))? \+(\d+)(?:,(\d+))? @@ ?(.*)").unwrap();
}

/// Classification of a single patch line by its leading sigil.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Leading space; present on both sides of the diff.
    Context,
    /// Leading `+`; present only on the new side.
    Added,
    /// Leading `-`; present only on the old side.
    Removed,
    /// Any other leading byte (marker lines, stray text). Never counted,
    /// never matched.
    Other,
}

impl LineKind {
    pub fn from_line(line: &str) -> Self {
        match line.as_bytes().first() {
            Some(b'+') => LineKind::Added,
            Some(b'-') => LineKind::Removed,
            Some(b' ') => LineKind::Context,
            _ => LineKind::Other,
        }
    }

    /// Maps a parsed line kind onto the edit classification of a match.
    /// `Other` lines are not edits and yield `None`.
    pub fn edit(self) -> Option<LineEdit> {
        match self {
            LineKind::Added => Some(LineEdit::Addition),
            LineKind::Removed => Some(LineEdit::Deletion),
            LineKind::Context => Some(LineEdit::Context),
            LineKind::Other => None,
        }
    }
}

/// Edit classification of a matched diff line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEdit {
    Context,
    Addition,
    Deletion,
}

/// One recorded line inside a hunk.
///
/// `text` is the raw patch line including its sigil, so containment checks
/// against it tolerate references that carry their own sigil. `old_line` and
/// `new_line` are the counter values after this line's own increment; for an
/// added line `old_line` is simply the stale old counter (and vice versa).
#[derive(Debug, Clone)]
pub struct DiffLine {
    pub kind: LineKind,
    pub text: String,
    pub old_line: u32,
    pub new_line: u32,
}

/// A diff hunk: header fields plus its ordered line sequence.
#[derive(Debug, Clone)]
pub struct Hunk {
    pub old_start: u32,
    /// Declared old-side length; 1 when the header omits the comma group.
    pub old_len: u32,
    pub new_start: u32,
    /// Declared new-side length; 1 when the header omits the comma group.
    pub new_len: u32,
    /// Section text after the closing `@@`, empty when absent.
    pub heading: String,
    pub lines: Vec<DiffLine>,
}

/// Parses a per-file unified-diff patch into hunks.
///
/// Never fails: malformed headers are skipped (see module docs) and an input
/// without any valid header yields an empty vec.
pub fn parse_file_patch(patch: &str) -> Vec<Hunk> {
    let mut hunks: Vec<Hunk> = Vec::new();
    let mut cur: Option<Hunk> = None;
    let mut old_line = 0u32;
    let mut new_line = 0u32;

    for raw in patch.lines() {
        if raw.starts_with("@@") {
            match parse_hunk_header(raw) {
                Ok(next) => {
                    if let Some(h) = cur.take() {
                        if !h.lines.is_empty() {
                            hunks.push(h);
                        }
                    }
                    old_line = next.old_start;
                    new_line = next.new_start;
                    cur = Some(next);
                }
                Err(e) => {
                    // Stale counters stay in effect; an open hunk keeps
                    // accruing lines, a closed state keeps ignoring them.
                    warn!("parse: {e}");
                }
            }
            continue;
        }

        let Some(hunk) = cur.as_mut() else {
            // Prelude before the first valid header.
            continue;
        };

        let kind = LineKind::from_line(raw);
        match kind {
            LineKind::Removed => old_line = old_line.saturating_add(1),
            LineKind::Added => new_line = new_line.saturating_add(1),
            LineKind::Context => {
                old_line = old_line.saturating_add(1);
                new_line = new_line.saturating_add(1);
            }
            LineKind::Other => {}
        }
        hunk.lines.push(DiffLine {
            kind,
            text: raw.to_string(),
            old_line,
            new_line,
        });
    }

    if let Some(h) = cur {
        if !h.lines.is_empty() {
            hunks.push(h);
        }
    }
    hunks
}

/// Parses one `@@` header line into an empty hunk.
fn parse_hunk_header(line: &str) -> Result<Hunk, ParseError> {
    let caps = RE_HUNK_HEADER
        .captures(line)
        .ok_or_else(|| ParseError::InvalidHunkHeader(line.to_string()))?;

    let req = |i: usize| -> Result<u32, ParseError> {
        caps[i]
            .parse()
            .map_err(|_| ParseError::Overflow(line.to_string()))
    };
    // Omitted comma group means a length of 1 per the unified-diff grammar.
    let opt = |i: usize| -> Result<u32, ParseError> {
        match caps.get(i) {
            Some(m) => m
                .as_str()
                .parse()
                .map_err(|_| ParseError::Overflow(line.to_string())),
            None => Ok(1),
        }
    };

    Ok(Hunk {
        old_start: req(1)?,
        old_len: opt(2)?,
        new_start: req(3)?,
        new_len: opt(4)?,
        heading: caps.get(5).map(|m| m.as_str().to_string()).unwrap_or_default(),
        lines: Vec::new(),
    })
}
