//! Shared types for refmount.
//!
//! Everything here is a plain value type: the root-relative path model
//! ([`TreePath`]), file attributes as reported to protocol adapters
//! ([`FileAttr`]), and the error vocabulary ([`FsError`]). Higher layers
//! (the git plumbing facade, the filesystem view, the inode table) all
//! speak in these types.

mod attr;
mod error;
mod path;

pub use attr::{Capability, DIR_PERM, DirEntry, FileAttr, FileKind};
pub use error::{FsError, FsResult};
pub use path::{SEPARATOR, TreePath};
