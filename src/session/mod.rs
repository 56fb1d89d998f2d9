//! Review session: explicit state threaded through every call.
//!
//! One value owns everything the resolution flow shares across calls:
//! - request metadata (title, branches, description, the commit triple)
//! - the lazily built, memoized diff catalog
//! - ids of temporary notes pending removal
//!
//! Batch placement lives here too. Every draft is isolated: one that fails to
//! resolve or publish is logged and recorded in its outcome while the rest of
//! the batch proceeds; nothing already posted is rolled back.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, info, warn};

use crate::catalog::{DiffCatalog, ReviewablePredicate, default_reviewable};
use crate::errors::{AnchorResult, Error, PublishError, ResolveError};
use crate::hosts::types::{NoteId, ReviewRequest};
use crate::hosts::{Capability, HostGateway};
use crate::locate::{LineMatch, locate_line};
use crate::parser::LineEdit;
use crate::position::{Position, build_position};
use crate::suggest::rewrite_suggestion_fences;

/// Options fixed at session open.
#[derive(Debug, Clone, Copy)]
pub struct SessionOptions {
    /// Predicate deciding which changed paths enter the diff catalog.
    pub reviewable: ReviewablePredicate,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            reviewable: default_reviewable,
        }
    }
}

/// One inline comment to place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InlineDraft {
    /// Path of the file the comment refers to (new side).
    pub path: String,
    /// Line text produced by the analyzer, possibly sigil-decorated.
    pub line_ref: String,
    /// Comment body (markdown).
    pub body: String,
}

/// One code suggestion to place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestionDraft {
    pub path: String,
    /// 1-based inclusive bounds in the new file content.
    pub start_line: u32,
    pub end_line: u32,
    /// Markdown body containing a ```suggestion fence.
    pub body: String,
}

/// Per-draft result of a batch placement.
#[derive(Debug, Clone)]
pub struct PlacementOutcome {
    pub path: String,
    /// The line text the anchor was resolved from.
    pub line_ref: String,
    /// Was a note actually posted?
    pub posted: bool,
    /// Reason if skipped (empty draft, unresolved line, host failure).
    pub skipped_reason: Option<String>,
    /// Host id of the posted note, when there is one.
    pub note: Option<NoteId>,
}

impl PlacementOutcome {
    fn skipped(path: &str, line_ref: &str, reason: impl Into<String>) -> Self {
        Self {
            path: path.to_string(),
            line_ref: line_ref.to_string(),
            posted: false,
            skipped_reason: Some(reason.into()),
            note: None,
        }
    }
}

/// Session state for one change request.
pub struct ReviewSession {
    request: ReviewRequest,
    options: SessionOptions,
    catalog: OnceCell<DiffCatalog>,
    temp_notes: Mutex<Vec<NoteId>>,
}

impl ReviewSession {
    /// Opens a session by fetching request metadata once.
    pub async fn open<G: HostGateway>(gateway: &G) -> AnchorResult<Self> {
        Self::open_with(gateway, SessionOptions::default()).await
    }

    pub async fn open_with<G: HostGateway>(
        gateway: &G,
        options: SessionOptions,
    ) -> AnchorResult<Self> {
        let t0 = Instant::now();
        debug!("session: fetch request metadata");
        let request = gateway.describe().await?;
        debug!(
            "session: '{}' ({} -> {}) in {} ms",
            request.title,
            request.source_branch,
            request.target_branch,
            t0.elapsed().as_millis()
        );
        Ok(Self::from_request(request, options))
    }

    /// Builds a session from already-fetched metadata, no gateway call.
    pub fn from_request(request: ReviewRequest, options: SessionOptions) -> Self {
        Self {
            request,
            options,
            catalog: OnceCell::new(),
            temp_notes: Mutex::new(Vec::new()),
        }
    }

    pub fn request(&self) -> &ReviewRequest {
        &self.request
    }

    pub fn title(&self) -> &str {
        &self.request.title
    }

    pub fn description(&self) -> Option<&str> {
        self.request.description.as_deref()
    }

    pub fn source_branch(&self) -> &str {
        &self.request.source_branch
    }

    pub fn target_branch(&self) -> &str {
        &self.request.target_branch
    }

    pub fn labels(&self) -> &[String] {
        &self.request.labels
    }

    /// Diff catalog, built through the gateway on first use and memoized for
    /// the whole session.
    pub async fn catalog<G: HostGateway>(&self, gateway: &G) -> AnchorResult<&DiffCatalog> {
        self.catalog
            .get_or_try_init(|| async {
                let t0 = Instant::now();
                debug!("catalog: build start");
                let c = DiffCatalog::build(gateway, &self.request, self.options.reviewable).await?;
                debug!(
                    "catalog: built files={} in {} ms",
                    c.len(),
                    t0.elapsed().as_millis()
                );
                Ok(c)
            })
            .await
    }

    /// Resolves a line reference against a file's diff into an anchor.
    ///
    /// An empty reference is rejected up front: substring containment would
    /// otherwise match the first content line of the file.
    pub async fn resolve<G: HostGateway>(
        &self,
        gateway: &G,
        path: &str,
        reference: &str,
    ) -> AnchorResult<Position> {
        if reference.is_empty() {
            return Err(Error::Validation(format!(
                "empty line reference for {path}"
            )));
        }
        let catalog = self.catalog(gateway).await?;
        let file = catalog.get(path).ok_or_else(|| ResolveError::FileNotInDiff {
            path: path.to_string(),
        })?;
        let m = locate_line(file, reference).ok_or_else(|| ResolveError::ReferenceNotFound {
            path: path.to_string(),
        })?;
        Ok(build_position(file, &m, &self.request.diff_refs))
    }

    /// Posts a standalone note. Temporary notes are remembered so
    /// `remove_temporary_notes` can delete them later.
    pub async fn publish_note<G: HostGateway>(
        &self,
        gateway: &G,
        body: &str,
        temporary: bool,
    ) -> AnchorResult<NoteId> {
        let id = gateway
            .publish_note(body)
            .await
            .map_err(PublishError::Host)?;
        if temporary {
            self.temp_notes.lock().await.push(id.clone());
        }
        Ok(id)
    }

    /// Deletes every temporary note posted in this session.
    ///
    /// Failures are logged per note; the list is cleared up front so a retry
    /// cannot double-delete.
    pub async fn remove_temporary_notes<G: HostGateway>(&self, gateway: &G) {
        let notes: Vec<NoteId> = std::mem::take(&mut *self.temp_notes.lock().await);
        if notes.is_empty() {
            return;
        }
        debug!("session: removing {} temporary notes", notes.len());
        for id in notes {
            if let Err(e) = gateway.delete_note(&id).await {
                warn!("session: failed to delete temporary note {id}: {e}");
            }
        }
    }

    /// Replaces the labels on the change request, when the host supports it.
    pub async fn publish_labels<G: HostGateway>(
        &self,
        gateway: &G,
        labels: &[String],
    ) -> AnchorResult<()> {
        if !gateway.kind().supports(Capability::Labels) {
            return Err(PublishError::Unsupported("labels").into());
        }
        gateway
            .publish_labels(labels)
            .await
            .map_err(PublishError::Host)?;
        Ok(())
    }
}

/// Places a batch of inline comments, one gateway call per draft.
///
/// The `InlineComments` capability is checked once up front; the catalog is
/// built before the loop so a transport failure surfaces once instead of per
/// draft. Each draft is then isolated.
pub async fn place_inline_comments<G: HostGateway>(
    gateway: &G,
    session: &ReviewSession,
    drafts: &[InlineDraft],
) -> AnchorResult<Vec<PlacementOutcome>> {
    let t0 = Instant::now();
    info!("publish: inline batch start drafts={}", drafts.len());

    if !gateway.kind().supports(Capability::InlineComments) {
        warn!(
            "publish: host {:?} does not support inline comments",
            gateway.kind()
        );
        return Ok(drafts
            .iter()
            .map(|d| PlacementOutcome::skipped(&d.path, &d.line_ref, "inline comments unsupported"))
            .collect());
    }

    session.catalog(gateway).await?;

    let mut results = Vec::with_capacity(drafts.len());
    for draft in drafts {
        results.push(place_one(gateway, session, draft).await);
    }

    let posted = results.iter().filter(|r| r.posted).count();
    info!(
        "publish: inline batch done posted={} skipped={} in {} ms",
        posted,
        results.len() - posted,
        t0.elapsed().as_millis()
    );
    Ok(results)
}

async fn place_one<G: HostGateway>(
    gateway: &G,
    session: &ReviewSession,
    draft: &InlineDraft,
) -> PlacementOutcome {
    if draft.path.is_empty() || draft.line_ref.is_empty() || draft.body.is_empty() {
        debug!("publish: draft with empty fields skipped");
        return PlacementOutcome::skipped(&draft.path, &draft.line_ref, "empty draft fields");
    }

    let position = match session.resolve(gateway, &draft.path, &draft.line_ref).await {
        Ok(p) => p,
        Err(e) => {
            info!(
                "publish: could not resolve position in {}: {e}",
                draft.path
            );
            return PlacementOutcome::skipped(&draft.path, &draft.line_ref, e.to_string());
        }
    };

    match gateway.publish_inline(&draft.body, &position).await {
        Ok(id) => PlacementOutcome {
            path: draft.path.clone(),
            line_ref: draft.line_ref.clone(),
            posted: true,
            skipped_reason: None,
            note: Some(id),
        },
        Err(e) => {
            let e = PublishError::Host(e);
            warn!("publish: inline comment failed for {}: {e}", draft.path);
            PlacementOutcome::skipped(&draft.path, &draft.line_ref, e.to_string())
        }
    }
}

/// Places code suggestions through the inline path.
///
/// The anchor line is read from the new file content at `start_line`, the
/// suggestion fence is rewritten to carry the replacement range, and the
/// anchor itself is an addition at the range's first line. Per-draft
/// isolation as in `place_inline_comments`.
pub async fn place_code_suggestions<G: HostGateway>(
    gateway: &G,
    session: &ReviewSession,
    drafts: &[SuggestionDraft],
) -> AnchorResult<Vec<PlacementOutcome>> {
    let t0 = Instant::now();
    info!("publish: suggestion batch start drafts={}", drafts.len());

    if !gateway.kind().supports(Capability::InlineComments) {
        warn!(
            "publish: host {:?} does not support inline comments",
            gateway.kind()
        );
        return Ok(drafts
            .iter()
            .map(|d| PlacementOutcome::skipped(&d.path, "", "inline comments unsupported"))
            .collect());
    }

    session.catalog(gateway).await?;

    let mut results = Vec::with_capacity(drafts.len());
    for draft in drafts {
        results.push(suggest_one(gateway, session, draft).await);
    }

    let posted = results.iter().filter(|r| r.posted).count();
    info!(
        "publish: suggestion batch done posted={} skipped={} in {} ms",
        posted,
        results.len() - posted,
        t0.elapsed().as_millis()
    );
    Ok(results)
}

async fn suggest_one<G: HostGateway>(
    gateway: &G,
    session: &ReviewSession,
    draft: &SuggestionDraft,
) -> PlacementOutcome {
    if draft.path.is_empty()
        || draft.body.is_empty()
        || draft.start_line == 0
        || draft.end_line < draft.start_line
    {
        debug!("publish: invalid suggestion draft skipped");
        return PlacementOutcome::skipped(&draft.path, "", "invalid suggestion draft");
    }

    let outcome: AnchorResult<(String, NoteId)> = async {
        let catalog = session.catalog(gateway).await?;
        let file = catalog
            .get(&draft.path)
            .ok_or_else(|| ResolveError::FileNotInDiff {
                path: draft.path.clone(),
            })?;

        let anchor = file
            .new_content
            .lines()
            .nth(draft.start_line as usize - 1)
            .ok_or_else(|| ResolveError::LineOutOfRange {
                path: draft.path.clone(),
                line: draft.start_line,
            })?;

        let body = rewrite_suggestion_fences(&draft.body, draft.start_line, draft.end_line);

        // Synthesized addition at the range's first line: the post-increment
        // coordinate start_line + 1 lands the built anchor on start_line.
        let m = LineMatch {
            edit: LineEdit::Addition,
            old_line: 0,
            new_line: draft.start_line + 1,
        };
        let position = build_position(file, &m, &session.request.diff_refs);
        let id = gateway
            .publish_inline(&body, &position)
            .await
            .map_err(PublishError::Host)?;
        Ok((anchor.to_string(), id))
    }
    .await;

    match outcome {
        Ok((anchor, id)) => PlacementOutcome {
            path: draft.path.clone(),
            line_ref: anchor,
            posted: true,
            skipped_reason: None,
            note: Some(id),
        },
        Err(e) => {
            warn!("publish: could not place suggestion for {}: {e}", draft.path);
            PlacementOutcome::skipped(&draft.path, "", e.to_string())
        }
    }
}
