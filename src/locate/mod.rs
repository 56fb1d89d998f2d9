//! Line locating inside a parsed file diff.
//!
//! The scan is substring containment over raw patch lines, in document order
//! across hunks; the first hit wins. Analyzers routinely decorate what is
//! really a context line with a leading `+`, so a reference that found
//! nothing and starts with `+` gets a second full pass with the sigil
//! stripped and the remainder left-trimmed. Because the raw line keeps its
//! own sigil, references carrying a correct sigil match directly on the first
//! pass. Marker lines (`\ No newline ...`) never match.

use tracing::debug;

use crate::catalog::FileDiff;
use crate::parser::LineEdit;

/// Coordinates of a matched diff line.
///
/// Both counters carry their post-increment value at the match; the side not
/// touched by the line's own edit is simply stale. The position builder picks
/// the side(s) `edit` makes meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineMatch {
    pub edit: LineEdit,
    pub old_line: u32,
    pub new_line: u32,
}

/// Finds the first diff line whose raw text contains `reference`.
///
/// `None` means the text is absent from the file's diff; that is an expected
/// outcome here, and the caller decides whether it is an error. The edit
/// classification always comes from the matched line itself, never from the
/// reference's own leading character.
pub fn locate_line(file: &FileDiff, reference: &str) -> Option<LineMatch> {
    if let Some(m) = scan(file, reference) {
        return Some(m);
    }
    if let Some(stripped) = reference.strip_prefix('+') {
        debug!("locate: retry with stripped sigil in {}", file.new_path);
        return scan(file, stripped.trim_start());
    }
    None
}

fn scan(file: &FileDiff, needle: &str) -> Option<LineMatch> {
    for hunk in file.hunks() {
        for line in &hunk.lines {
            let Some(edit) = line.kind.edit() else {
                continue;
            };
            if line.text.contains(needle) {
                return Some(LineMatch {
                    edit,
                    old_line: line.old_line,
                    new_line: line.new_line,
                });
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::EditType;

    const SAMPLE_PATCH: &str = "\
@@ -1,3 +1,4 @@
 context1
-old line
+new line A
+new line B
 context2
";

    fn sample_file() -> FileDiff {
        FileDiff::new(
            "src/sample.rs",
            None,
            SAMPLE_PATCH,
            "",
            "",
            EditType::Modified,
        )
    }

    #[test]
    fn finds_added_line() {
        let m = locate_line(&sample_file(), "new line A").unwrap();
        assert_eq!(m.edit, LineEdit::Addition);
        assert_eq!(m.new_line, 3);
    }

    #[test]
    fn finds_removed_line() {
        let m = locate_line(&sample_file(), "old line").unwrap();
        assert_eq!(m.edit, LineEdit::Deletion);
        assert_eq!(m.old_line, 3);
    }

    #[test]
    fn finds_context_line_with_both_counters() {
        let m = locate_line(&sample_file(), "context1").unwrap();
        assert_eq!(m.edit, LineEdit::Context);
        assert_eq!((m.old_line, m.new_line), (2, 2));
    }

    #[test]
    fn absent_text_is_none() {
        assert!(locate_line(&sample_file(), "missing text").is_none());
    }

    #[test]
    fn spurious_plus_on_context_line_falls_back() {
        let m = locate_line(&sample_file(), "+context1").unwrap();
        // Classification comes from the matched line, not the reference.
        assert_eq!(m.edit, LineEdit::Context);
        assert_eq!((m.old_line, m.new_line), (2, 2));
    }

    #[test]
    fn plus_reference_matches_added_line_directly() {
        let m = locate_line(&sample_file(), "+new line B").unwrap();
        assert_eq!(m.edit, LineEdit::Addition);
        assert_eq!(m.new_line, 4);
    }

    #[test]
    fn minus_reference_matches_raw_removed_line() {
        let m = locate_line(&sample_file(), "-old line").unwrap();
        assert_eq!(m.edit, LineEdit::Deletion);
        assert_eq!(m.old_line, 3);
    }

    #[test]
    fn full_primary_pass_runs_before_fallback() {
        // " alpha beta" matches only the stripped form, "+alpha raw" matches
        // the reference as-is; the direct hit wins even though it comes later.
        let patch = "\
@@ -1,2 +1,3 @@
 alpha beta
 filler
+alpha raw
";
        let file = FileDiff::new("f.rs", None, patch, "", "", EditType::Modified);
        let m = locate_line(&file, "+alpha").unwrap();
        assert_eq!(m.edit, LineEdit::Addition);
        assert_eq!(m.new_line, 4);
    }

    #[test]
    fn first_match_wins_across_hunks() {
        let patch = "\
@@ -1 +1 @@
 shared token
@@ -10 +10 @@
+shared token
";
        let file = FileDiff::new("f.rs", None, patch, "", "", EditType::Modified);
        let m = locate_line(&file, "shared token").unwrap();
        assert_eq!(m.edit, LineEdit::Context);
        assert_eq!((m.old_line, m.new_line), (2, 2));
    }

    #[test]
    fn marker_lines_never_match() {
        let patch = "\
@@ -1 +1 @@
-a
+b
\\ No newline at end of file
";
        let file = FileDiff::new("f.rs", None, patch, "", "", EditType::Modified);
        assert!(locate_line(&file, "No newline").is_none());
    }

    #[test]
    fn empty_patch_has_no_matches() {
        let file = FileDiff::new("f.rs", None, "", "", "", EditType::Modified);
        assert!(locate_line(&file, "anything").is_none());
    }

    #[test]
    fn repeated_lookups_are_identical() {
        let file = sample_file();
        let a = locate_line(&file, "new line A").unwrap();
        let b = locate_line(&file, "new line A").unwrap();
        assert_eq!(a, b);
    }
}
