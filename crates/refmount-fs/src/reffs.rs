//! The read-only filesystem view over a pinned reference.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use refmount_git::{GitReference, GitStore, TreeEntry};
use refmount_types::{DirEntry, FileAttr, FileKind, FsError, FsResult, TreePath};

use crate::file::BlobFile;
use crate::ops::Filesystem;

/// A filesystem view over one reference of one repository.
///
/// Holds a shared backend handle, the selected reference, and the view's
/// root within the tree. `chroot` produces a deeper view over the same
/// backend; nothing is copied. All request paths are resolved relative to
/// the view's root, so `..` at the root fails with
/// [`FsError::EscapesRoot`] even when the root is a subtree.
pub struct RefFilesystem {
    git: Arc<dyn GitStore>,
    reference: GitReference,
    root: TreePath,
}

impl RefFilesystem {
    pub fn new(git: Arc<dyn GitStore>, reference: GitReference) -> Self {
        Self {
            git,
            reference,
            root: TreePath::root(),
        }
    }

    /// The reference this view is pinned to.
    pub fn reference(&self) -> &GitReference {
        &self.reference
    }

    /// The view's root within the full tree.
    pub fn root(&self) -> &TreePath {
        &self.root
    }

    /// Resolve a request into a view-relative path.
    fn relative(&self, request: &str) -> FsResult<TreePath> {
        TreePath::root().resolve(request)
    }

    /// Describe the entry at a full tree path by listing its parent and
    /// scanning for the final segment. Backend failures propagate; an empty
    /// match is NotFound and more than one match is Ambiguous.
    async fn entry_at(&self, full: &TreePath) -> FsResult<TreeEntry> {
        let Some(name) = full.file_name() else {
            // The root has no backing tree entry.
            return Err(FsError::not_found(full.render()));
        };
        let listing = self
            .git
            .list_tree(&self.reference, &full.parent(), true)
            .await?;
        let mut matched = listing.into_iter().filter(|e| e.name() == name);
        let Some(entry) = matched.next() else {
            return Err(FsError::not_found(full.render()));
        };
        if matched.next().is_some() {
            return Err(FsError::Ambiguous(full.render().to_string()));
        }
        Ok(entry)
    }

    fn attr_of(entry: &TreeEntry) -> FileAttr {
        match entry.mode.kind {
            FileKind::File => FileAttr::file(entry.size.unwrap_or(0), entry.mode.perm),
            FileKind::Directory => FileAttr::directory(),
            FileKind::Symlink => FileAttr::symlink(entry.size.unwrap_or(0)),
        }
    }
}

#[async_trait]
impl Filesystem for RefFilesystem {
    async fn stat(&self, path: &str) -> FsResult<FileAttr> {
        debug!(path, root = %self.root, "stat");
        let rel = self.relative(path)?;
        if rel.is_root() {
            // The plumbing model has no entry for the root itself; it is
            // always a directory.
            return Ok(FileAttr::directory());
        }
        let entry = self.entry_at(&self.root.join(&rel)).await?;
        Ok(Self::attr_of(&entry))
    }

    async fn read_dir(&self, path: &str) -> FsResult<Vec<DirEntry>> {
        debug!(path, root = %self.root, "read_dir");
        let rel = self.relative(path)?;
        let full = self.root.join(&rel);
        if !rel.is_root() {
            let entry = self.entry_at(&full).await?;
            if !entry.mode.kind.is_dir() {
                return Err(FsError::not_a_directory(path));
            }
        }
        let listing = self.git.list_tree(&self.reference, &full, true).await?;
        Ok(listing
            .iter()
            .map(|e| DirEntry::new(e.name(), Self::attr_of(e)))
            .collect())
    }

    async fn open(&self, path: &str) -> FsResult<BlobFile> {
        debug!(path, root = %self.root, "open");
        let rel = self.relative(path)?;
        if rel.is_root() {
            return Err(FsError::not_a_file(path));
        }
        let entry = self.entry_at(&self.root.join(&rel)).await?;
        if entry.mode.kind.is_dir() {
            return Err(FsError::not_a_file(path));
        }
        let contents = self.git.read_blob(&entry.hash).await?;
        Ok(BlobFile::new(
            entry.name(),
            Self::attr_of(&entry),
            contents,
        ))
    }

    async fn read_link(&self, path: &str) -> FsResult<String> {
        debug!(path, root = %self.root, "read_link");
        let rel = self.relative(path)?;
        if rel.is_root() {
            return Err(FsError::not_a_symlink(path));
        }
        let entry = self.entry_at(&self.root.join(&rel)).await?;
        if !entry.mode.kind.is_symlink() {
            return Err(FsError::not_a_symlink(path));
        }
        let target = self.git.read_blob(&entry.hash).await?;
        // The stored target comes back verbatim. A target that rises above
        // the view's root only fails if the caller resolves it through
        // this view.
        String::from_utf8(target)
            .map_err(|_| FsError::malformed(format!("non-UTF-8 symlink target at {path}")))
    }

    async fn chroot(&self, path: &str) -> FsResult<Arc<dyn Filesystem>> {
        debug!(path, root = %self.root, "chroot");
        // Existence and kind are not checked here; the first operation
        // through the new view surfaces any problem.
        let rel = self.relative(path)?;
        Ok(Arc::new(RefFilesystem {
            git: Arc::clone(&self.git),
            reference: self.reference.clone(),
            root: self.root.join(&rel),
        }))
    }
}
