//! Provider-agnostic data model for the review-session surface.
//!
//! These types are the normalized input/output of the gateway seam and are
//! consumed by the catalog, the resolver and the placement loop.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Triple of commit identifiers binding inline comments to a diff version.
///
/// All three are required: anchors built from a partial triple are rejected
/// by hosting APIs once the request gets new pushes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffRefs {
    pub base_sha: String,
    pub start_sha: String,
    pub head_sha: String,
}

/// High-level metadata for the change request under review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewRequest {
    pub title: String,
    pub description: Option<String>,
    pub state: String,
    pub web_url: String,
    pub source_branch: String,
    pub target_branch: String,
    pub labels: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub diff_refs: DiffRefs,
}

/// One changed-file entry as reported by the hosting service.
///
/// `patch` is the raw per-file unified diff; hunks-only input (no `---`/`+++`
/// headers) is fine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeEntry {
    pub old_path: String,
    pub new_path: String,
    pub patch: String,
    #[serde(default)]
    pub new_file: bool,
    #[serde(default)]
    pub renamed_file: bool,
    #[serde(default)]
    pub deleted_file: bool,
}

/// Identifier of a posted note/discussion, kept to delete temporaries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NoteId(pub String);

impl std::fmt::Display for NoteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
