//! The revision-store query trait and its error type.

use async_trait::async_trait;
use refmount_types::{FsError, TreePath};
use thiserror::Error;

use crate::reference::{GitReference, RefKind};
use crate::tree::TreeEntry;

/// Errors from revision-store queries.
#[derive(Debug, Error)]
pub enum GitError {
    /// The git subprocess could not be spawned or failed mid-call.
    #[error("git unavailable: {0}")]
    Unavailable(String),

    /// Output we could not parse.
    #[error("malformed git output: {0}")]
    Malformed(String),

    /// Unknown object hash or unlistable path.
    #[error("not found: {0}")]
    NotFound(String),

    /// The operation does not apply to this reference kind.
    #[error("bad reference: {0}")]
    BadReference(String),
}

impl GitError {
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }
}

impl From<GitError> for FsError {
    fn from(e: GitError) -> Self {
        match e {
            GitError::Unavailable(msg) => FsError::Backend(msg),
            GitError::Malformed(msg) => FsError::Malformed(msg),
            GitError::NotFound(what) => FsError::NotFound(what),
            GitError::BadReference(msg) => FsError::Backend(msg),
        }
    }
}

/// Result type for revision-store queries.
pub type GitResult<T> = Result<T, GitError>;

/// Read-only query surface over a revision store.
///
/// One production implementation shells out to git plumbing; tests supply
/// in-memory doubles. Implementations must tolerate concurrent calls; each
/// call is an independent query with no shared mutable state.
#[async_trait]
pub trait GitStore: Send + Sync {
    /// List one level of the tree at `path` under `reference`.
    ///
    /// With `children` set, lists the contents of the directory at `path`;
    /// otherwise returns a single-element listing describing `path` itself.
    /// Entry order is stable within a call but otherwise unspecified.
    async fn list_tree(
        &self,
        reference: &GitReference,
        path: &TreePath,
        children: bool,
    ) -> GitResult<Vec<TreeEntry>>;

    /// Read the full content of a blob by hash.
    async fn read_blob(&self, hash: &str) -> GitResult<Vec<u8>>;

    /// Enumerate branch or tag names.
    async fn list_refs(&self, kind: RefKind) -> GitResult<Vec<String>>;

    /// Enumerate abbreviated commit ids reachable from `reference`,
    /// newest first. Refuses bare commit references.
    async fn list_commits(&self, reference: &GitReference) -> GitResult<Vec<String>>;
}
