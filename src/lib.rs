//! Diff-position resolution engine for merge/pull-request review comments.
//!
//! Takes the line references an upstream analyzer produces (a line of source
//! text, possibly decorated with a spurious change sigil) and maps them onto
//! exact old/new unified-diff coordinates, then builds provider-agnostic
//! anchors for inline comments.
//!
//! 1) **Session open** — fetch request metadata once (title, branches,
//!    description, the base/start/head commit triple)
//! 2) **Catalog** — lazily build the per-file diff catalog: raw patch plus
//!    both content sides, filtered by the reviewable-file predicate,
//!    memoized for the whole session
//! 3) **Resolution** — parse hunks on first lookup, scan for the reference
//!    text (with a stripped-sigil fallback), classify the matched line, build
//!    the anchor position
//! 4) **Placement** — publish inline comments and code suggestions per draft,
//!    each isolated from the others; temporary notes are tracked and removed
//!    explicitly
//!
//! The crate uses `tracing` for debug logging and avoids `async-trait` and
//! heap trait objects (no `Box<dyn ...>`). The hosting-service transport sits
//! behind the `HostGateway` trait and is consumed through plain generics;
//! what each host can do is declared on `HostKind` and checked before use.

pub mod catalog;
pub mod errors;
pub mod hosts;
pub mod locate;
pub mod parser;
pub mod position;
pub mod session;
pub mod suggest;

// -----------------------------------------------------------------------------
// Convenience re-exports for downstream users
// -----------------------------------------------------------------------------

pub use catalog::{DiffCatalog, EditType, FileDiff, ReviewablePredicate, default_reviewable};
pub use errors::{
    AnchorResult, ContentError, Error, HostError, ParseError, PublishError, ResolveError,
};
pub use hosts::types::{ChangeEntry, DiffRefs, NoteId, ReviewRequest};
pub use hosts::{Capability, HostGateway, HostKind};
pub use locate::{LineMatch, locate_line};
pub use parser::{DiffLine, Hunk, LineEdit, LineKind, parse_file_patch};
pub use position::{Position, build_position};
pub use session::{
    InlineDraft, PlacementOutcome, ReviewSession, SessionOptions, SuggestionDraft,
    place_code_suggestions, place_inline_comments,
};
pub use suggest::rewrite_suggestion_fences;
