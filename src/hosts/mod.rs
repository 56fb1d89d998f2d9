//! Hosting-service seam without async-trait or dynamic trait objects.
//!
//! Transport lives outside this crate. `HostGateway` is the interface an
//! embedding service implements; the engine consumes it through plain
//! generics, so async fns stay unboxed. What each host can do is declared up
//! front on `HostKind` and queried before attempting an operation, instead of
//! being discovered through runtime failures.

pub mod types;
pub use types::*;

use serde::{Deserialize, Serialize};

use crate::errors::HostError;
use crate::position::Position;

/// Hosting services the engine carries capability sets for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum HostKind {
    GitLab,
    GitHub,
    Bitbucket,
}

/// Operations a host may or may not support.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Per-file change entries with raw patches.
    DiffFiles,
    /// Standalone notes on the change request.
    Comments,
    /// Inline comments posted one by one at an anchor position.
    InlineComments,
    /// Staged create-then-publish workflow for inline comment batches.
    InlineCommentBatch,
    /// Reading the issue-style comment thread.
    IssueComments,
    /// Replacing request labels.
    Labels,
    /// Title/branches/description metadata.
    Describe,
}

impl HostKind {
    /// Declared capability set for this host.
    pub const fn capabilities(self) -> &'static [Capability] {
        match self {
            // GitLab posts inline discussions directly; it has no staged
            // batch workflow and no issue-comment thread on an MR.
            HostKind::GitLab => &[
                Capability::DiffFiles,
                Capability::Comments,
                Capability::InlineComments,
                Capability::Labels,
                Capability::Describe,
            ],
            HostKind::GitHub => &[
                Capability::DiffFiles,
                Capability::Comments,
                Capability::InlineComments,
                Capability::InlineCommentBatch,
                Capability::IssueComments,
                Capability::Labels,
                Capability::Describe,
            ],
            HostKind::Bitbucket => &[
                Capability::DiffFiles,
                Capability::Comments,
                Capability::InlineComments,
                Capability::Describe,
            ],
        }
    }

    pub fn supports(self, cap: Capability) -> bool {
        self.capabilities().contains(&cap)
    }
}

/// Interface to the hosting service.
///
/// Implementations live in the embedding service and map their transport
/// failures into `HostError`. Gateways are used via generics only; object
/// safety is not provided.
#[allow(async_fn_in_trait)]
pub trait HostGateway {
    /// Which host this gateway talks to; selects the capability set.
    fn kind(&self) -> HostKind;

    /// Change-request metadata, including the commit triple.
    async fn describe(&self) -> Result<ReviewRequest, HostError>;

    /// Per-file change entries with raw patches.
    async fn changed_files(&self) -> Result<Vec<ChangeEntry>, HostError>;

    /// Raw bytes of `path` at `git_ref` (branch name or SHA).
    ///
    /// `Ok(None)` when the file does not exist at that ref (e.g. the old side
    /// of a newly added file).
    async fn file_bytes(&self, path: &str, git_ref: &str) -> Result<Option<Vec<u8>>, HostError>;

    /// Posts a standalone note on the change request.
    async fn publish_note(&self, body: &str) -> Result<NoteId, HostError>;

    /// Deletes a previously posted note.
    async fn delete_note(&self, id: &NoteId) -> Result<(), HostError>;

    /// Posts an inline comment anchored at `position`.
    async fn publish_inline(&self, body: &str, position: &Position) -> Result<NoteId, HostError>;

    /// Replaces the labels on the change request.
    async fn publish_labels(&self, labels: &[String]) -> Result<(), HostError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gitlab_capability_set_matches_its_api() {
        let k = HostKind::GitLab;
        assert!(k.supports(Capability::InlineComments));
        assert!(k.supports(Capability::Labels));
        assert!(!k.supports(Capability::InlineCommentBatch));
        assert!(!k.supports(Capability::IssueComments));
    }

    #[test]
    fn github_supports_everything_declared() {
        let k = HostKind::GitHub;
        for cap in [
            Capability::DiffFiles,
            Capability::Comments,
            Capability::InlineComments,
            Capability::InlineCommentBatch,
            Capability::IssueComments,
            Capability::Labels,
            Capability::Describe,
        ] {
            assert!(k.supports(cap), "missing {cap:?}");
        }
    }

    #[test]
    fn bitbucket_lacks_labels() {
        assert!(!HostKind::Bitbucket.supports(Capability::Labels));
        assert!(HostKind::Bitbucket.supports(Capability::InlineComments));
    }
}
