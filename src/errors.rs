//! Crate-wide error hierarchy for mr-anchor.
//!
//! Goals:
//! - Single root `Error` for all public functions.
//! - Every failure is scoped to the item that caused it (one hunk, one line,
//!   one comment); callers log and continue, nothing aborts a whole session.
//! - No dynamic dispatch, no async-trait, ergonomic `?` via `From` impls.

use thiserror::Error;

/// Convenient alias for crate-wide results.
pub type AnchorResult<T> = Result<T, Error>;

/// Root error type for the mr-anchor crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Unified-diff hunk parsing failure.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Line-reference resolution failure (file or line not found).
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Comment/suggestion publishing failure.
    #[error(transparent)]
    Publish(#[from] PublishError),

    /// Hosting-service gateway failure (fetch path).
    #[error(transparent)]
    Host(#[from] HostError),

    /// Input validation errors (empty paths, bad ranges, etc.).
    #[error("validation error: {0}")]
    Validation(String),
}

/// Hunk-header grammar errors.
///
/// Recovered inside the parser: the offending header is skipped and parsing
/// continues with stale counters, so these never abort a file.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid hunk header: {0}")]
    InvalidHunkHeader(String),

    #[error("integer overflow in hunk header: {0}")]
    Overflow(String),
}

/// Errors from mapping a line reference onto diff coordinates.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The requested path has no entry in the session's diff catalog.
    #[error("file not in diff: {path}")]
    FileNotInDiff { path: String },

    /// The reference text matched no line of the file's diff.
    #[error("line reference not found in {path}")]
    ReferenceNotFound { path: String },

    /// Suggestion start line lies outside the new file content.
    #[error("line {line} out of range for {path}")]
    LineOutOfRange { path: String, line: u32 },
}

/// File content decoding errors.
///
/// Recovered inside the catalog by substituting an empty string for the
/// affected side of the diff; not a variant of the root `Error`, because a
/// decoding failure never escapes the catalog.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("non-utf8 content for {path} at {git_ref}")]
    NotUtf8 { path: String, git_ref: String },
}

/// Publishing errors. Callers record these per item and keep going.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The gateway rejected or failed the publish call.
    #[error("publish failed: {0}")]
    Host(#[from] HostError),

    /// The host's declared capability set does not include this operation.
    #[error("operation not supported by host: {0}")]
    Unsupported(&'static str),
}

/// Gateway-side failure taxonomy shared with external implementations.
///
/// Implementations map their transport errors (HTTP statuses, timeouts) into
/// these variants so the resolution engine can log them uniformly.
#[derive(Debug, Error)]
pub enum HostError {
    /// Unauthorized (HTTP 401).
    #[error("unauthorized")]
    Unauthorized,

    /// Forbidden (HTTP 403).
    #[error("forbidden")]
    Forbidden,

    /// Not found (HTTP 404).
    #[error("not found")]
    NotFound,

    /// Rate limited (HTTP 429).
    #[error("rate limited")]
    RateLimited { retry_after_secs: Option<u64> },

    /// Gateway/Server error (HTTP 5xx).
    #[error("server error: status {0}")]
    Server(u16),

    /// Other HTTP status (4xx/3xx) not covered above.
    #[error("http status error: {0}")]
    HttpStatus(u16),

    /// Timeout at transport level.
    #[error("timeout")]
    Timeout,

    /// Network/transport failure without status (DNS/connect/reset).
    #[error("network error: {0}")]
    Network(String),

    /// JSON deserialization error in a gateway response.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Unexpected/invalid shape of a gateway response.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}
