//! In-memory revision-store doubles shared by the view and inode tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use refmount_git::{GitError, GitFileMode, GitReference, GitResult, GitStore, RefKind, TreeEntry};
use refmount_types::TreePath;

/// A revision store over a fixed list of (path, mode, object, hash, size)
/// rows, mirroring what `ls-tree --long` would print for each entry.
pub struct FakeGit {
    entries: Vec<(String, u32, &'static str, String, Option<u64>)>,
    blobs: HashMap<String, Vec<u8>>,
}

impl FakeGit {
    /// An empty store; populate with [`add_blob`](Self::add_blob) and
    /// [`add_tree`](Self::add_tree).
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            blobs: HashMap::new(),
        }
    }

    /// The standard fixture tree:
    ///
    /// ```text
    /// executable.sh        (0755 file)
    /// real.txt             (0644 file, "Hello World\n")
    /// symlink.txt          (symlink -> real.txt)
    /// test/                (directory)
    /// test/nested.txt      (0644 file, "nested file\n")
    /// test/escaping.txt    (symlink -> ../real.txt)
    /// ```
    pub fn fixture() -> Arc<Self> {
        let mut fake = Self::new();
        fake.add_blob("executable.sh", 0o100755, "e1", b"#!/bin/sh\necho hi\n");
        fake.add_blob("real.txt", 0o100644, "b1", b"Hello World\n");
        fake.add_blob("symlink.txt", 0o120000, "s1", b"real.txt");
        fake.add_tree("test", "t1");
        fake.add_blob("test/nested.txt", 0o100644, "b2", b"nested file\n");
        fake.add_blob("test/escaping.txt", 0o120000, "s2", b"../real.txt");
        Arc::new(fake)
    }

    pub fn add_blob(&mut self, path: &str, mode: u32, hash: &str, content: &[u8]) {
        self.entries.push((
            path.to_string(),
            mode,
            "blob",
            hash.to_string(),
            Some(content.len() as u64),
        ));
        self.blobs.insert(hash.to_string(), content.to_vec());
    }

    pub fn add_tree(&mut self, path: &str, hash: &str) {
        self.entries
            .push((path.to_string(), 0o040000, "tree", hash.to_string(), None));
    }

    fn parent_of(path: &str) -> &str {
        match path.rsplit_once('/') {
            Some((parent, _)) => parent,
            None => ".",
        }
    }

    fn to_entry(row: &(String, u32, &'static str, String, Option<u64>)) -> TreeEntry {
        TreeEntry {
            mode: GitFileMode::decode(row.1),
            object: row.2.to_string(),
            hash: row.3.clone(),
            size: row.4,
            path: row.0.clone(),
        }
    }
}

#[async_trait]
impl GitStore for FakeGit {
    async fn list_tree(
        &self,
        _reference: &GitReference,
        path: &TreePath,
        children: bool,
    ) -> GitResult<Vec<TreeEntry>> {
        let rendered = path.render();
        Ok(self
            .entries
            .iter()
            .filter(|row| {
                if children {
                    Self::parent_of(&row.0) == rendered
                } else {
                    row.0 == rendered
                }
            })
            .map(Self::to_entry)
            .collect())
    }

    async fn read_blob(&self, hash: &str) -> GitResult<Vec<u8>> {
        self.blobs
            .get(hash)
            .cloned()
            .ok_or_else(|| GitError::not_found(hash.to_string()))
    }

    async fn list_refs(&self, kind: RefKind) -> GitResult<Vec<String>> {
        Ok(match kind {
            RefKind::Branch => vec!["main".to_string()],
            RefKind::Tag => vec![],
        })
    }

    async fn list_commits(&self, _reference: &GitReference) -> GitResult<Vec<String>> {
        Ok(vec!["abc1234".to_string()])
    }
}

/// A revision store whose every call fails, for error-propagation tests.
pub struct FailingGit;

#[async_trait]
impl GitStore for FailingGit {
    async fn list_tree(
        &self,
        _reference: &GitReference,
        _path: &TreePath,
        _children: bool,
    ) -> GitResult<Vec<TreeEntry>> {
        Err(GitError::unavailable("subprocess failed"))
    }

    async fn read_blob(&self, _hash: &str) -> GitResult<Vec<u8>> {
        Err(GitError::unavailable("subprocess failed"))
    }

    async fn list_refs(&self, _kind: RefKind) -> GitResult<Vec<String>> {
        Err(GitError::unavailable("subprocess failed"))
    }

    async fn list_commits(&self, _reference: &GitReference) -> GitResult<Vec<String>> {
        Err(GitError::unavailable("subprocess failed"))
    }
}
