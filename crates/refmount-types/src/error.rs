//! Filesystem error types.

use std::io;
use thiserror::Error;

/// Error type shared by the filesystem view and the inode table.
#[derive(Debug, Error)]
pub enum FsError {
    /// Path resolution would rise above the logical root.
    #[error("path escapes the filesystem root")]
    EscapesRoot,

    /// No such path, entry, or object.
    #[error("not found: {0}")]
    NotFound(String),

    /// More than one tree entry matched a single name. Well-formed
    /// backends never produce this.
    #[error("ambiguous listing for: {0}")]
    Ambiguous(String),

    /// Expected a directory.
    #[error("not a directory: {0}")]
    NotADirectory(String),

    /// Expected a readable file.
    #[error("not a file: {0}")]
    NotAFile(String),

    /// Expected a symbolic link.
    #[error("not a symbolic link: {0}")]
    NotASymlink(String),

    /// Filesystem is read-only; no mutating operation ever succeeds.
    #[error("filesystem is read-only")]
    ReadOnly,

    /// Unknown inode id or file handle.
    #[error("invalid handle: {0}")]
    InvalidHandle(u64),

    /// The revision store could not be reached or its process failed.
    #[error("backend unavailable: {0}")]
    Backend(String),

    /// The revision store answered with output we could not parse.
    #[error("malformed backend output: {0}")]
    Malformed(String),
}

impl FsError {
    /// Create a NotFound error.
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound(path.into())
    }

    /// Create a NotADirectory error.
    pub fn not_a_directory(path: impl Into<String>) -> Self {
        Self::NotADirectory(path.into())
    }

    /// Create a NotAFile error.
    pub fn not_a_file(path: impl Into<String>) -> Self {
        Self::NotAFile(path.into())
    }

    /// Create a NotASymlink error.
    pub fn not_a_symlink(path: impl Into<String>) -> Self {
        Self::NotASymlink(path.into())
    }

    /// Create a Backend error.
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    /// Create a Malformed error.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }
}

/// Convert FsError to std::io::Error for adapter compatibility.
impl From<FsError> for io::Error {
    fn from(e: FsError) -> Self {
        match e {
            FsError::EscapesRoot => {
                io::Error::new(io::ErrorKind::PermissionDenied, "path escapes root")
            }
            FsError::NotFound(msg) => io::Error::new(io::ErrorKind::NotFound, msg),
            FsError::Ambiguous(msg) => io::Error::new(io::ErrorKind::InvalidData, msg),
            FsError::NotADirectory(msg) => io::Error::new(io::ErrorKind::NotADirectory, msg),
            FsError::NotAFile(msg) => io::Error::new(io::ErrorKind::IsADirectory, msg),
            FsError::NotASymlink(msg) => io::Error::new(io::ErrorKind::InvalidInput, msg),
            FsError::ReadOnly => {
                io::Error::new(io::ErrorKind::PermissionDenied, "filesystem is read-only")
            }
            FsError::InvalidHandle(id) => {
                io::Error::new(io::ErrorKind::InvalidInput, format!("invalid handle: {id}"))
            }
            FsError::Backend(msg) => io::Error::other(msg),
            FsError::Malformed(msg) => io::Error::new(io::ErrorKind::InvalidData, msg),
        }
    }
}

/// Result type for filesystem operations.
pub type FsResult<T> = Result<T, FsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_kinds() {
        let err: io::Error = FsError::not_found("a/b").into();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);

        let err: io::Error = FsError::ReadOnly.into();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);

        let err: io::Error = FsError::EscapesRoot.into();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
    }
}
