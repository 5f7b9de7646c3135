//! File attributes as reported to protocol adapters.

use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// Permission bits forced onto every directory. The revision store keeps no
/// permission bits for trees, so directories always read as read+traverse.
pub const DIR_PERM: u32 = 0o555;

/// File kind enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileKind {
    /// Regular file.
    File,
    /// Directory.
    Directory,
    /// Symbolic link.
    Symlink,
}

impl FileKind {
    /// Returns true if this is a regular file.
    pub fn is_file(&self) -> bool {
        matches!(self, FileKind::File)
    }

    /// Returns true if this is a directory.
    pub fn is_dir(&self) -> bool {
        matches!(self, FileKind::Directory)
    }

    /// Returns true if this is a symbolic link.
    pub fn is_symlink(&self) -> bool {
        matches!(self, FileKind::Symlink)
    }
}

/// File attributes (metadata).
///
/// The modification time is always the Unix epoch: the revision store keeps
/// no per-entry timestamps at this layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileAttr {
    /// File kind.
    pub kind: FileKind,
    /// Unix permission bits (e.g. 0o644).
    pub perm: u32,
    /// Size in bytes. Zero for directories.
    pub size: u64,
    /// Modification time.
    pub mtime: SystemTime,
}

impl FileAttr {
    /// Attributes for a regular file.
    pub fn file(size: u64, perm: u32) -> Self {
        Self {
            kind: FileKind::File,
            perm,
            size,
            mtime: SystemTime::UNIX_EPOCH,
        }
    }

    /// Attributes for a directory. Permission bits are fixed.
    pub fn directory() -> Self {
        Self {
            kind: FileKind::Directory,
            perm: DIR_PERM,
            size: 0,
            mtime: SystemTime::UNIX_EPOCH,
        }
    }

    /// Attributes for a symlink. Permission bits are not meaningful.
    pub fn symlink(size: u64) -> Self {
        Self {
            kind: FileKind::Symlink,
            perm: 0,
            size,
            mtime: SystemTime::UNIX_EPOCH,
        }
    }

    /// Returns true if this is a regular file.
    pub fn is_file(&self) -> bool {
        self.kind.is_file()
    }

    /// Returns true if this is a directory.
    pub fn is_dir(&self) -> bool {
        self.kind.is_dir()
    }

    /// Returns true if this is a symbolic link.
    pub fn is_symlink(&self) -> bool {
        self.kind.is_symlink()
    }
}

/// Directory entry: a base name plus the attributes of the named child.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirEntry {
    /// Entry name (not a full path).
    pub name: String,
    /// Attributes of the entry.
    pub attr: FileAttr,
}

impl DirEntry {
    /// Create a new directory entry.
    pub fn new(name: impl Into<String>, attr: FileAttr) -> Self {
        Self {
            name: name.into(),
            attr,
        }
    }
}

/// Capabilities a filesystem view advertises to generic callers.
///
/// A caller can detect read-only-ness here without attempting a mutating
/// operation first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capability {
    /// Byte reads are supported.
    pub read: bool,
    /// Seeking within an open handle is supported.
    pub seek: bool,
    /// Writes are supported.
    pub write: bool,
    /// Truncation is supported.
    pub truncate: bool,
    /// File locking is supported.
    pub lock: bool,
}

impl Capability {
    /// Read + seek only; everything mutating is off.
    pub fn read_only() -> Self {
        Self {
            read: true,
            seek: true,
            write: false,
            truncate: false,
            lock: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_kind_predicates() {
        assert!(FileKind::File.is_file());
        assert!(!FileKind::File.is_dir());
        assert!(FileKind::Directory.is_dir());
        assert!(FileKind::Symlink.is_symlink());
    }

    #[test]
    fn directory_perm_is_fixed() {
        let dir = FileAttr::directory();
        assert_eq!(dir.perm, 0o555);
        assert_eq!(dir.size, 0);
        assert_eq!(dir.mtime, SystemTime::UNIX_EPOCH);
    }

    #[test]
    fn symlink_perm_is_zero() {
        let link = FileAttr::symlink(8);
        assert!(link.is_symlink());
        assert_eq!(link.perm, 0);
        assert_eq!(link.size, 8);
    }

    #[test]
    fn read_only_capability() {
        let caps = Capability::read_only();
        assert!(caps.read && caps.seek);
        assert!(!caps.write && !caps.truncate && !caps.lock);
    }
}
