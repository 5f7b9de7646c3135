//! Git file-mode decoding.

use refmount_types::{DIR_PERM, FileKind};

// Git mode bit layout (the same octal convention ls-tree prints):
// low 9 bits are Unix permissions, the high bits select the object kind.
const PERM_MASK: u32 = 0o000777;
const DIR_MASK: u32 = 0o040000;
const SYMLINK_MASK: u32 = 0o120000;
const GITLINK_MASK: u32 = 0o160000;

/// A decoded git file mode: object kind plus Unix permission bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GitFileMode {
    /// File kind.
    pub kind: FileKind,
    /// Unix permission bits.
    pub perm: u32,
}

impl GitFileMode {
    /// Decode a raw git mode into kind and permission bits.
    ///
    /// Symlinks (and gitlinks, which we treat as symlink-equivalent) are
    /// checked first and carry no permission bits. Directories come next:
    /// git stores no permissions for trees, so a fixed read+traverse value
    /// is substituted; the raw bits of a tree entry are meaningless if
    /// read literally. Everything else is a regular file with its stored
    /// bits kept verbatim.
    pub fn decode(raw: u32) -> Self {
        if raw & SYMLINK_MASK == SYMLINK_MASK || raw & GITLINK_MASK == GITLINK_MASK {
            Self {
                kind: FileKind::Symlink,
                perm: 0,
            }
        } else if raw & DIR_MASK == DIR_MASK {
            Self {
                kind: FileKind::Directory,
                perm: DIR_PERM,
            }
        } else {
            Self {
                kind: FileKind::File,
                perm: raw & PERM_MASK,
            }
        }
    }
}
