//! The filesystem operations trait.
//!
//! Path-based and fully read-only. Every mutating operation is present so
//! that generic callers can hold one trait object, but each one fails with
//! [`FsError::ReadOnly`] without touching the backend.

use std::sync::Arc;
use std::time::SystemTime;

use async_trait::async_trait;

use refmount_types::{Capability, DirEntry, FileAttr, FsError, FsResult};

use crate::file::BlobFile;

/// Filesystem operations over a single view.
///
/// Request paths are strings relative to the view's root and are resolved
/// lexically; `..` rising above the root fails with
/// [`FsError::EscapesRoot`]. Implementations must tolerate concurrent
/// calls.
#[async_trait]
pub trait Filesystem: Send + Sync {
    // ========================================================================
    // Reading
    // ========================================================================

    /// Get file attributes.
    async fn stat(&self, path: &str) -> FsResult<FileAttr>;

    /// Read directory entries.
    ///
    /// Fails with [`FsError::NotADirectory`] if the path denotes anything
    /// else. The root is always a directory.
    async fn read_dir(&self, path: &str) -> FsResult<Vec<DirEntry>>;

    /// Open a file for reading.
    ///
    /// The full content is buffered into the returned handle; directories
    /// fail with [`FsError::NotAFile`].
    async fn open(&self, path: &str) -> FsResult<BlobFile>;

    /// Read a symlink's target string, verbatim.
    ///
    /// The target is not resolved or validated; a target that rises above
    /// the view's root is returned as-is and only fails if the caller later
    /// resolves it through this view.
    async fn read_link(&self, path: &str) -> FsResult<String>;

    /// A new view rooted at `path`, sharing this view's backend.
    ///
    /// The target is not checked for existence or kind here; the first
    /// operation through the new view surfaces any problem.
    async fn chroot(&self, path: &str) -> FsResult<Arc<dyn Filesystem>>;

    /// What this filesystem can do. Read and seek only.
    fn capabilities(&self) -> Capability {
        Capability::read_only()
    }

    // ========================================================================
    // Writing (always refused)
    // ========================================================================

    /// Create a file. Always [`FsError::ReadOnly`].
    async fn create(&self, _path: &str) -> FsResult<BlobFile> {
        Err(FsError::ReadOnly)
    }

    /// Remove a file or directory. Always [`FsError::ReadOnly`].
    async fn remove(&self, _path: &str) -> FsResult<()> {
        Err(FsError::ReadOnly)
    }

    /// Rename an entry. Always [`FsError::ReadOnly`].
    async fn rename(&self, _from: &str, _to: &str) -> FsResult<()> {
        Err(FsError::ReadOnly)
    }

    /// Create a directory. Always [`FsError::ReadOnly`].
    async fn mkdir(&self, _path: &str, _perm: u32) -> FsResult<()> {
        Err(FsError::ReadOnly)
    }

    /// Change permission bits. Always [`FsError::ReadOnly`].
    async fn chmod(&self, _path: &str, _perm: u32) -> FsResult<()> {
        Err(FsError::ReadOnly)
    }

    /// Change ownership. Always [`FsError::ReadOnly`].
    async fn chown(&self, _path: &str, _uid: u32, _gid: u32) -> FsResult<()> {
        Err(FsError::ReadOnly)
    }

    /// Set timestamps. Always [`FsError::ReadOnly`].
    async fn set_times(&self, _path: &str, _mtime: SystemTime) -> FsResult<()> {
        Err(FsError::ReadOnly)
    }

    /// Truncate a file. Always [`FsError::ReadOnly`].
    async fn truncate(&self, _path: &str, _size: u64) -> FsResult<()> {
        Err(FsError::ReadOnly)
    }

    /// Create a symlink. Always [`FsError::ReadOnly`].
    async fn symlink(&self, _target: &str, _link: &str) -> FsResult<()> {
        Err(FsError::ReadOnly)
    }
}
