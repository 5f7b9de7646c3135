//! Read-only virtual filesystem over a pinned git reference.
//!
//! [`RefFilesystem`] implements the path-based [`Filesystem`] trait on top
//! of a [`refmount_git::GitStore`]; [`InodeTable`] materializes such a view
//! into the flat, id-addressed structure a kernel protocol adapter needs.
//! Everything is read-only: mutating calls fail without touching the
//! backend.

mod file;
mod inode;
mod ops;
mod reffs;

#[cfg(test)]
pub(crate) mod testutil;

pub use file::BlobFile;
pub use inode::{InodeId, InodeRecord, InodeTable, ROOT_INODE};
pub use ops::Filesystem;
pub use reffs::RefFilesystem;
