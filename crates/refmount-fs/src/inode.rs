//! Flat, id-addressed materialization of a filesystem view.
//!
//! A kernel protocol addresses files by integer handle, not by path. The
//! table is built once at mount time by walking the view breadth-first and
//! is immutable afterward; a moved reference requires a fresh mount. Reads
//! after construction never lock and never touch the backend except for
//! file content.

use std::collections::VecDeque;
use std::sync::Arc;

use tracing::debug;

use refmount_types::{FileAttr, FsError, FsResult};

use crate::ops::Filesystem;

/// Numeric inode id. Id 1 is the root; 0 is reserved invalid.
pub type InodeId = u64;

/// The root's inode id.
pub const ROOT_INODE: InodeId = 1;

/// One materialized entry.
///
/// Stores only the base name; full paths are reconstructed by walking
/// parent ids, which bounds memory on deep trees.
#[derive(Debug, Clone)]
pub struct InodeRecord {
    /// This entry's id.
    pub id: InodeId,
    /// Parent id. The root is its own parent.
    pub parent: InodeId,
    /// Base name. Empty for the root.
    pub name: String,
    /// Attributes cached at build time.
    pub attr: FileAttr,
    /// Child ids in the order the backend listed them. Fixed at build
    /// time; resumable listing offsets index into this order.
    pub children: Vec<InodeId>,
}

/// The id-addressed table over a filesystem view.
///
/// Ids are assigned monotonically during a breadth-first walk, so the
/// arena index of id `n` is always `n - 1`.
pub struct InodeTable {
    fs: Arc<dyn Filesystem>,
    records: Vec<InodeRecord>,
}

impl InodeTable {
    /// Walk the view breadth-first and materialize every reachable entry.
    ///
    /// Single-threaded; the table is only shared after this returns.
    pub async fn build(fs: Arc<dyn Filesystem>) -> FsResult<Self> {
        let root_attr = fs.stat(".").await?;
        let mut records = vec![InodeRecord {
            id: ROOT_INODE,
            parent: ROOT_INODE,
            name: String::new(),
            attr: root_attr,
            children: Vec::new(),
        }];

        // Only directory ids are ever enqueued.
        let mut queue = VecDeque::from([ROOT_INODE]);
        while let Some(id) = queue.pop_front() {
            let path = render_path(&records, id);
            let entries = fs.read_dir(&path).await?;
            let mut children = Vec::with_capacity(entries.len());
            for entry in entries {
                let child = (records.len() + 1) as InodeId;
                if entry.attr.is_dir() {
                    queue.push_back(child);
                }
                records.push(InodeRecord {
                    id: child,
                    parent: id,
                    name: entry.name,
                    attr: entry.attr,
                    children: Vec::new(),
                });
                children.push(child);
            }
            records[(id - 1) as usize].children = children;
        }

        debug!(inodes = records.len(), "inode table built");
        Ok(Self { fs, records })
    }

    /// Number of materialized entries, root included.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The record for `id`, or [`FsError::InvalidHandle`].
    pub fn record(&self, id: InodeId) -> FsResult<&InodeRecord> {
        if id == 0 || id as usize > self.records.len() {
            return Err(FsError::InvalidHandle(id));
        }
        Ok(&self.records[(id - 1) as usize])
    }

    /// Cached attributes for `id`. Never calls the backend.
    pub fn attributes(&self, id: InodeId) -> FsResult<&FileAttr> {
        Ok(&self.record(id)?.attr)
    }

    /// Find the child of `parent` named `name`.
    pub fn lookup(&self, parent: InodeId, name: &str) -> FsResult<&InodeRecord> {
        let rec = self.record(parent)?;
        if !rec.attr.is_dir() {
            return Err(FsError::not_a_directory(self.path(parent)?));
        }
        rec.children
            .iter()
            .map(|&child| &self.records[(child - 1) as usize])
            .find(|child| child.name == name)
            .ok_or_else(|| FsError::not_found(name))
    }

    /// Full path of `id`, rebuilt by walking parent ids. The root renders
    /// as `.`.
    pub fn path(&self, id: InodeId) -> FsResult<String> {
        self.record(id)?;
        Ok(render_path(&self.records, id))
    }

    /// Page through the children of `id` starting at `offset`.
    ///
    /// The sink receives each child's resume offset (the offset to pass to
    /// continue after that child) and its record; it returns `true` when
    /// its destination buffer is full, which stops the listing without
    /// counting that child. Returns the number of children delivered.
    /// Offsets index into the child order fixed at build time.
    pub fn list_children<F>(&self, id: InodeId, offset: usize, mut sink: F) -> FsResult<usize>
    where
        F: FnMut(usize, &InodeRecord) -> bool,
    {
        let rec = self.record(id)?;
        if !rec.attr.is_dir() {
            return Err(FsError::not_a_directory(self.path(id)?));
        }
        let mut delivered = 0;
        for (idx, &child) in rec.children.iter().enumerate().skip(offset) {
            let child = &self.records[(child - 1) as usize];
            if sink(idx + 1, child) {
                break;
            }
            delivered += 1;
        }
        Ok(delivered)
    }

    /// Read file bytes by id and offset into `buf`.
    ///
    /// End of file shows up as a short (possibly zero) count, not an
    /// error.
    pub async fn read_file(&self, id: InodeId, buf: &mut [u8], offset: u64) -> FsResult<usize> {
        let path = self.path(id)?;
        let file = self.fs.open(&path).await?;
        Ok(file.read_at(buf, offset))
    }

    /// Read a symlink target by id.
    pub async fn read_link(&self, id: InodeId) -> FsResult<String> {
        let path = self.path(id)?;
        self.fs.read_link(&path).await
    }
}

fn render_path(records: &[InodeRecord], id: InodeId) -> String {
    let mut names = Vec::new();
    let mut current = id;
    while current != ROOT_INODE {
        let rec = &records[(current - 1) as usize];
        names.push(rec.name.as_str());
        current = rec.parent;
    }
    if names.is_empty() {
        return ".".to_string();
    }
    names.reverse();
    names.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reffs::RefFilesystem;
    use crate::testutil::FakeGit;
    use refmount_git::GitReference;

    async fn fixture_table() -> InodeTable {
        let fs = RefFilesystem::new(FakeGit::fixture(), GitReference::Branch("main".into()));
        InodeTable::build(Arc::new(fs)).await.unwrap()
    }

    #[tokio::test]
    async fn build_materializes_every_entry() {
        let table = fixture_table().await;
        // Root + 4 top-level entries + 2 nested.
        assert_eq!(table.len(), 7);

        let root = table.record(ROOT_INODE).unwrap();
        assert!(root.attr.is_dir());
        assert_eq!(root.parent, ROOT_INODE);
        assert_eq!(root.children.len(), 4);
    }

    #[tokio::test]
    async fn lookup_walks_names() {
        let table = fixture_table().await;

        let test = table.lookup(ROOT_INODE, "test").unwrap();
        assert!(test.attr.is_dir());

        let nested = table.lookup(test.id, "nested.txt").unwrap();
        assert!(nested.attr.is_file());
        assert_eq!(nested.parent, test.id);

        assert!(matches!(
            table.lookup(ROOT_INODE, "missing"),
            Err(FsError::NotFound(_))
        ));

        let file = table.lookup(ROOT_INODE, "real.txt").unwrap();
        assert!(matches!(
            table.lookup(file.id, "anything"),
            Err(FsError::NotADirectory(_))
        ));
    }

    #[tokio::test]
    async fn attributes_come_from_the_cache() {
        let table = fixture_table().await;
        let exec = table.lookup(ROOT_INODE, "executable.sh").unwrap();
        let attr = table.attributes(exec.id).unwrap();
        assert!(attr.is_file());
        assert_eq!(attr.perm, 0o755);

        let link = table.lookup(ROOT_INODE, "symlink.txt").unwrap();
        assert!(table.attributes(link.id).unwrap().is_symlink());
    }

    #[tokio::test]
    async fn path_round_trips_with_lookup() {
        let table = fixture_table().await;
        assert_eq!(table.path(ROOT_INODE).unwrap(), ".");

        let test = table.lookup(ROOT_INODE, "test").unwrap();
        let nested = table.lookup(test.id, "nested.txt").unwrap();
        assert_eq!(table.path(test.id).unwrap(), "test");
        assert_eq!(table.path(nested.id).unwrap(), "test/nested.txt");
    }

    #[tokio::test]
    async fn unknown_ids_are_invalid_handles() {
        let table = fixture_table().await;
        assert!(matches!(table.record(0), Err(FsError::InvalidHandle(0))));
        assert!(matches!(
            table.record(999),
            Err(FsError::InvalidHandle(999))
        ));
        assert!(matches!(
            table.attributes(999),
            Err(FsError::InvalidHandle(999))
        ));
        assert!(matches!(
            table.lookup(999, "x"),
            Err(FsError::InvalidHandle(999))
        ));
    }

    #[tokio::test]
    async fn paged_listing_matches_a_single_pass() {
        let table = fixture_table().await;

        let mut single = Vec::new();
        table
            .list_children(ROOT_INODE, 0, |_, child| {
                single.push(child.id);
                false
            })
            .unwrap();
        assert_eq!(single.len(), 4);

        // Page through two at a time; concatenation must match exactly.
        let mut paged = Vec::new();
        let mut offset = 0;
        loop {
            let mut in_page = 0;
            let delivered = table
                .list_children(ROOT_INODE, offset, |next, child| {
                    if in_page == 2 {
                        return true;
                    }
                    in_page += 1;
                    offset = next;
                    paged.push(child.id);
                    false
                })
                .unwrap();
            if delivered == 0 {
                break;
            }
        }
        assert_eq!(paged, single);
    }

    #[tokio::test]
    async fn read_file_by_id_reports_eof_as_short_count() {
        let table = fixture_table().await;
        let file = table.lookup(ROOT_INODE, "real.txt").unwrap();

        let mut buf = [0u8; 64];
        let n = table.read_file(file.id, &mut buf, 0).await.unwrap();
        assert_eq!(&buf[..n], b"Hello World\n");

        let n = table.read_file(file.id, &mut buf, 6).await.unwrap();
        assert_eq!(&buf[..n], b"World\n");

        let n = table.read_file(file.id, &mut buf, 100).await.unwrap();
        assert_eq!(n, 0);
    }

    #[tokio::test]
    async fn read_link_by_id() {
        let table = fixture_table().await;
        let test = table.lookup(ROOT_INODE, "test").unwrap();
        let link = table.lookup(test.id, "escaping.txt").unwrap();
        assert_eq!(table.read_link(link.id).await.unwrap(), "../real.txt");
    }
}
