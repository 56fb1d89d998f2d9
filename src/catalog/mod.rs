//! Session-scoped catalog of per-file diffs.
//!
//! Built once per session from the gateway's change entries:
//! - old content is fetched at the target branch, new content at the source
//!   branch; a side missing at its ref, or one that is not valid UTF-8,
//!   contributes an empty string
//! - entries failing the reviewable-file predicate are dropped
//! - lookup is by new path; a duplicate path overwrites (last entry wins)
//!
//! `FileDiff` values are immutable once built; hunks parse lazily on first
//! access, so concurrent lookups after the build need no locking.

use std::collections::HashMap;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::{AnchorResult, ContentError};
use crate::hosts::HostGateway;
use crate::hosts::types::{ChangeEntry, ReviewRequest};
use crate::parser::{Hunk, parse_file_patch};

/// Predicate deciding which changed paths enter the catalog.
pub type ReviewablePredicate = fn(&str) -> bool;

/// Extensions that never carry reviewable text (media, archives, binaries,
/// generated lockfiles).
const SKIP_EXTENSIONS: &[&str] = &[
    ".png", ".jpg", ".jpeg", ".gif", ".svg", ".webp", ".ico", ".bmp", ".pdf", ".zip", ".gz",
    ".tar", ".7z", ".rar", ".jar", ".war", ".exe", ".dll", ".so", ".dylib", ".bin", ".class",
    ".o", ".a", ".woff", ".woff2", ".ttf", ".eot", ".otf", ".mp3", ".mp4", ".avi", ".mov",
    ".lock",
];

/// Default reviewable-file predicate.
pub fn default_reviewable(path: &str) -> bool {
    let lower = path.to_ascii_lowercase();
    !SKIP_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// File-level change classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditType {
    Added,
    Deleted,
    Renamed,
    Modified,
}

impl EditType {
    /// Resolves the three provider change flags into one classification.
    /// Conflicting flags resolve by precedence:
    /// added > deleted > renamed > modified.
    pub fn from_change_flags(is_new: bool, is_deleted: bool, is_renamed: bool) -> Self {
        if is_new {
            EditType::Added
        } else if is_deleted {
            EditType::Deleted
        } else if is_renamed {
            EditType::Renamed
        } else {
            EditType::Modified
        }
    }
}

/// One changed file: identity, raw patch, both content sides.
#[derive(Debug)]
pub struct FileDiff {
    pub new_path: String,
    /// Rename source; `None` when the path did not change.
    pub old_path: Option<String>,
    pub patch: String,
    pub old_content: String,
    pub new_content: String,
    pub edit_type: EditType,
    hunks: OnceLock<Vec<Hunk>>,
}

impl FileDiff {
    pub fn new(
        new_path: impl Into<String>,
        old_path: Option<String>,
        patch: impl Into<String>,
        old_content: impl Into<String>,
        new_content: impl Into<String>,
        edit_type: EditType,
    ) -> Self {
        Self {
            new_path: new_path.into(),
            old_path,
            patch: patch.into(),
            old_content: old_content.into(),
            new_content: new_content.into(),
            edit_type,
            hunks: OnceLock::new(),
        }
    }

    /// Builds the entry from a raw change entry plus both decoded sides.
    pub fn from_entry(entry: &ChangeEntry, old_content: String, new_content: String) -> Self {
        let old_path = if entry.old_path != entry.new_path {
            Some(entry.old_path.clone())
        } else {
            None
        };
        Self::new(
            entry.new_path.clone(),
            old_path,
            entry.patch.clone(),
            old_content,
            new_content,
            EditType::from_change_flags(entry.new_file, entry.deleted_file, entry.renamed_file),
        )
    }

    /// Parsed hunks, computed on first use and memoized.
    pub fn hunks(&self) -> &[Hunk] {
        self.hunks.get_or_init(|| parse_file_patch(&self.patch))
    }
}

/// All reviewable file diffs of a session, keyed by new path.
#[derive(Debug, Default)]
pub struct DiffCatalog {
    files: HashMap<String, FileDiff>,
}

impl DiffCatalog {
    /// Assembles a catalog from prepared entries; duplicates overwrite.
    pub fn from_files(files: Vec<FileDiff>) -> Self {
        let mut map: HashMap<String, FileDiff> = HashMap::new();
        for fd in files {
            if map.insert(fd.new_path.clone(), fd).is_some() {
                debug!("catalog: duplicate path overwritten, last entry wins");
            }
        }
        Self { files: map }
    }

    /// Fetches change entries and both content sides through the gateway.
    pub async fn build<G: HostGateway>(
        gateway: &G,
        request: &ReviewRequest,
        reviewable: ReviewablePredicate,
    ) -> AnchorResult<Self> {
        let entries = gateway.changed_files().await?;
        debug!("catalog: {} change entries fetched", entries.len());

        let mut files = Vec::with_capacity(entries.len());
        for entry in &entries {
            if !reviewable(&entry.new_path) {
                debug!("catalog: skipping non-reviewable {}", entry.new_path);
                continue;
            }
            let old_bytes = gateway
                .file_bytes(&entry.old_path, &request.target_branch)
                .await?;
            let new_bytes = gateway
                .file_bytes(&entry.new_path, &request.source_branch)
                .await?;
            let old_content = decode_side(&entry.old_path, &request.target_branch, old_bytes);
            let new_content = decode_side(&entry.new_path, &request.source_branch, new_bytes);
            files.push(FileDiff::from_entry(entry, old_content, new_content));
        }

        Ok(Self::from_files(files))
    }

    pub fn get(&self, path: &str) -> Option<&FileDiff> {
        self.files.get(path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }
}

/// Decodes one content side; a missing file or non-UTF-8 bytes become an
/// empty string so resolution can still use the patch itself.
fn decode_side(path: &str, git_ref: &str, bytes: Option<Vec<u8>>) -> String {
    match bytes {
        None => String::new(),
        Some(b) => match String::from_utf8(b) {
            Ok(s) => s,
            Err(_) => {
                let e = ContentError::NotUtf8 {
                    path: path.to_string(),
                    git_ref: git_ref.to_string(),
                };
                warn!("catalog: {e}; substituting empty content");
                String::new()
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(old: &str, new: &str) -> ChangeEntry {
        ChangeEntry {
            old_path: old.to_string(),
            new_path: new.to_string(),
            patch: "@@ -1 +1 @@\n-a\n+b\n".to_string(),
            new_file: false,
            renamed_file: false,
            deleted_file: false,
        }
    }

    #[test]
    fn change_flag_precedence() {
        assert_eq!(
            EditType::from_change_flags(true, true, true),
            EditType::Added
        );
        assert_eq!(
            EditType::from_change_flags(false, true, true),
            EditType::Deleted
        );
        assert_eq!(
            EditType::from_change_flags(false, false, true),
            EditType::Renamed
        );
        assert_eq!(
            EditType::from_change_flags(false, false, false),
            EditType::Modified
        );
    }

    #[test]
    fn rename_sets_old_path_only_on_path_change() {
        let fd = FileDiff::from_entry(&entry("a.rs", "a.rs"), String::new(), String::new());
        assert_eq!(fd.old_path, None);

        let fd = FileDiff::from_entry(&entry("old.rs", "new.rs"), String::new(), String::new());
        assert_eq!(fd.old_path.as_deref(), Some("old.rs"));
    }

    #[test]
    fn default_predicate_rejects_binary_artifacts() {
        assert!(default_reviewable("src/main.rs"));
        assert!(default_reviewable("README.md"));
        assert!(!default_reviewable("logo.PNG"));
        assert!(!default_reviewable("assets/font.woff2"));
        assert!(!default_reviewable("Cargo.lock"));
    }

    #[test]
    fn hunks_parse_lazily_and_memoize() {
        let fd = FileDiff::from_entry(&entry("a.rs", "a.rs"), String::new(), String::new());
        let first = fd.hunks().as_ptr();
        let second = fd.hunks().as_ptr();
        assert_eq!(first, second);
        assert_eq!(fd.hunks().len(), 1);
    }

    #[test]
    fn duplicate_paths_keep_last_entry() {
        let a = FileDiff::new("x.rs", None, "", "first", "", EditType::Modified);
        let b = FileDiff::new("x.rs", None, "", "second", "", EditType::Modified);
        let catalog = DiffCatalog::from_files(vec![a, b]);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.paths().collect::<Vec<_>>(), vec!["x.rs"]);
        assert_eq!(catalog.get("x.rs").map(|f| f.old_content.as_str()), Some("second"));
    }

    #[test]
    fn non_utf8_side_becomes_empty() {
        let s = decode_side("bin.dat", "main", Some(vec![0xff, 0xfe, 0x00]));
        assert_eq!(s, "");
        let s = decode_side("gone.rs", "main", None);
        assert_eq!(s, "");
        let s = decode_side("ok.rs", "main", Some(b"fn main() {}".to_vec()));
        assert_eq!(s, "fn main() {}");
    }
}
