//! Anchor descriptors for inline comments.

use serde::{Deserialize, Serialize};

use crate::catalog::FileDiff;
use crate::hosts::types::DiffRefs;
use crate::locate::LineMatch;
use crate::parser::LineEdit;

/// Provider-agnostic inline-comment anchor.
///
/// Exactly one of `old_line`/`new_line` is set for additions/deletions, both
/// for context anchors; the unset side is omitted from serialization.
/// `old_path` is the rename source when there is one, otherwise it repeats
/// `new_path`, which is what hosting APIs expect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub new_path: String,
    pub old_path: String,
    pub base_sha: String,
    pub start_sha: String,
    pub head_sha: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_line: Option<u32>,
}

/// Builds the anchor for a located line.
///
/// Matched counters are post-increment, so the uniform `-1` lands on the true
/// line number of each side the edit touches. Requiring a `LineMatch` makes a
/// partial or garbage position unrepresentable: there is no way to call this
/// without a successful lookup.
pub fn build_position(file: &FileDiff, m: &LineMatch, refs: &DiffRefs) -> Position {
    let mut pos = Position {
        new_path: file.new_path.clone(),
        old_path: file
            .old_path
            .clone()
            .unwrap_or_else(|| file.new_path.clone()),
        base_sha: refs.base_sha.clone(),
        start_sha: refs.start_sha.clone(),
        head_sha: refs.head_sha.clone(),
        old_line: None,
        new_line: None,
    };
    match m.edit {
        LineEdit::Addition => pos.new_line = Some(m.new_line - 1),
        LineEdit::Deletion => pos.old_line = Some(m.old_line - 1),
        LineEdit::Context => {
            pos.old_line = Some(m.old_line - 1);
            pos.new_line = Some(m.new_line - 1);
        }
    }
    pos
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::EditType;
    use crate::locate::locate_line;

    fn refs() -> DiffRefs {
        DiffRefs {
            base_sha: "base".into(),
            start_sha: "start".into(),
            head_sha: "head".into(),
        }
    }

    fn sample_file() -> FileDiff {
        FileDiff::new(
            "src/sample.rs",
            None,
            "@@ -1,3 +1,4 @@\n context1\n-old line\n+new line A\n+new line B\n context2\n",
            "",
            "",
            EditType::Modified,
        )
    }

    #[test]
    fn addition_sets_only_new_line() {
        let file = sample_file();
        let m = locate_line(&file, "new line A").unwrap();
        let pos = build_position(&file, &m, &refs());
        assert_eq!(pos.new_line, Some(2));
        assert_eq!(pos.old_line, None);
    }

    #[test]
    fn deletion_sets_only_old_line() {
        let file = sample_file();
        let m = locate_line(&file, "old line").unwrap();
        let pos = build_position(&file, &m, &refs());
        assert_eq!(pos.old_line, Some(2));
        assert_eq!(pos.new_line, None);
    }

    #[test]
    fn context_sets_both_lines() {
        let file = sample_file();
        let m = locate_line(&file, "context1").unwrap();
        let pos = build_position(&file, &m, &refs());
        assert_eq!(pos.old_line, Some(1));
        assert_eq!(pos.new_line, Some(1));
    }

    #[test]
    fn old_path_repeats_new_path_without_rename() {
        let file = sample_file();
        let m = locate_line(&file, "context2").unwrap();
        let pos = build_position(&file, &m, &refs());
        assert_eq!(pos.old_path, "src/sample.rs");
        assert_eq!(pos.new_path, "src/sample.rs");
    }

    #[test]
    fn rename_keeps_the_old_path() {
        let file = FileDiff::new(
            "src/renamed.rs",
            Some("src/original.rs".to_string()),
            "@@ -1 +1 @@\n-a\n+b\n",
            "",
            "",
            EditType::Renamed,
        );
        let m = locate_line(&file, "b").unwrap();
        let pos = build_position(&file, &m, &refs());
        assert_eq!(pos.old_path, "src/original.rs");
        assert_eq!(pos.new_path, "src/renamed.rs");
    }

    #[test]
    fn commit_triple_is_carried_verbatim() {
        let file = sample_file();
        let m = locate_line(&file, "context1").unwrap();
        let pos = build_position(&file, &m, &refs());
        assert_eq!(pos.base_sha, "base");
        assert_eq!(pos.start_sha, "start");
        assert_eq!(pos.head_sha, "head");
    }

    #[test]
    fn serialization_omits_unset_line_keys() {
        let file = sample_file();
        let m = locate_line(&file, "new line A").unwrap();
        let pos = build_position(&file, &m, &refs());
        let json = serde_json::to_value(&pos).unwrap();
        let obj = json.as_object().unwrap();
        assert!(obj.contains_key("new_path"));
        assert!(obj.contains_key("old_path"));
        assert!(obj.contains_key("base_sha"));
        assert!(obj.contains_key("start_sha"));
        assert!(obj.contains_key("head_sha"));
        assert!(obj.contains_key("new_line"));
        assert!(!obj.contains_key("old_line"));
        assert_eq!(json["new_line"], 2);
    }

    #[test]
    fn resolving_twice_is_idempotent() {
        let file = sample_file();
        let a = build_position(&file, &locate_line(&file, "old line").unwrap(), &refs());
        let b = build_position(&file, &locate_line(&file, "old line").unwrap(), &refs());
        assert_eq!(a, b);
    }
}
