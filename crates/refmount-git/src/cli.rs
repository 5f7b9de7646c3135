//! Subprocess-backed [`GitStore`] implementation.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use refmount_types::TreePath;
use tokio::process::Command;
use tracing::debug;

use crate::reference::{GitReference, RefKind};
use crate::store::{GitError, GitResult, GitStore};
use crate::tree::{TreeEntry, parse_ls_tree};

/// Talks to a repository through the `git` binary's plumbing commands.
///
/// Every query spawns a fresh `git --git-dir <dir> ...` subprocess and waits
/// for it to exit, so concurrent queries never interleave. Failures to spawn
/// or non-zero exits surface as [`GitError::Unavailable`]; they are reported,
/// never retried.
#[derive(Debug, Clone)]
pub struct CliGit {
    git_dir: PathBuf,
}

impl CliGit {
    /// Open a repository at `path`.
    ///
    /// Accepts either a work tree containing a `.git` directory or a bare
    /// repository directory.
    pub fn open(path: impl Into<PathBuf>) -> GitResult<Self> {
        let path: PathBuf = path.into();
        let path = path
            .canonicalize()
            .map_err(|e| GitError::unavailable(format!("cannot open {}: {e}", path.display())))?;
        let dotgit = path.join(".git");
        let git_dir = if dotgit.is_dir() { dotgit } else { path };
        Ok(Self { git_dir })
    }

    /// The resolved `--git-dir` this store queries.
    pub fn git_dir(&self) -> &Path {
        &self.git_dir
    }

    async fn run(&self, args: &[&str]) -> GitResult<std::process::Output> {
        debug!(git_dir = %self.git_dir.display(), ?args, "git");
        Command::new("git")
            .arg("--git-dir")
            .arg(&self.git_dir)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| GitError::unavailable(format!("git {}: {e}", args.join(" "))))
    }

    /// Run a command and return its stdout as UTF-8 lines; a non-zero exit
    /// is an Unavailable error carrying stderr.
    async fn run_lines(&self, args: &[&str]) -> GitResult<Vec<String>> {
        let output = self.run(args).await?;
        if !output.status.success() {
            return Err(GitError::unavailable(format!(
                "git {} failed: {}",
                args.join(" "),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        let text = String::from_utf8(output.stdout)
            .map_err(|_| GitError::malformed(format!("git {}: non-UTF-8 output", args.join(" "))))?;
        Ok(text.lines().map(str::to_string).collect())
    }
}

#[async_trait]
impl GitStore for CliGit {
    async fn list_tree(
        &self,
        reference: &GitReference,
        path: &TreePath,
        children: bool,
    ) -> GitResult<Vec<TreeEntry>> {
        // A trailing separator asks ls-tree for the contents of the tree;
        // without it the entry's own metadata is printed instead.
        let mut pathspec = path.render().to_string();
        if children {
            pathspec.push('/');
        }

        // "--" keeps a leading dash in the pathspec from reading as a flag.
        let output = self
            .run(&["ls-tree", "--long", reference.rev(), "--", &pathspec])
            .await?;
        if !output.status.success() {
            return Err(GitError::unavailable(format!(
                "ls-tree {} {pathspec} failed: {}",
                reference.rev(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        let text = String::from_utf8(output.stdout)
            .map_err(|_| GitError::malformed("ls-tree: non-UTF-8 output"))?;
        parse_ls_tree(&text)
    }

    async fn read_blob(&self, hash: &str) -> GitResult<Vec<u8>> {
        let output = self.run(&["cat-file", "blob", hash]).await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            // A repository-level failure is not a missing hash.
            if stderr.to_lowercase().contains("not a git repository") {
                return Err(GitError::unavailable(format!(
                    "cat-file {hash}: {}",
                    stderr.trim()
                )));
            }
            // Otherwise cat-file exited non-zero for an unknown or
            // non-blob object.
            return Err(GitError::not_found(hash.to_string()));
        }
        Ok(output.stdout)
    }

    async fn list_refs(&self, kind: RefKind) -> GitResult<Vec<String>> {
        let lines = match kind {
            RefKind::Branch => self.run_lines(&["branch", "--all"]).await?,
            RefKind::Tag => self.run_lines(&["tag", "--list"]).await?,
        };
        Ok(lines
            .into_iter()
            .map(|line| {
                // The checked-out branch is printed as "* main".
                let line = match line.find('*') {
                    Some(idx) => &line[idx + 1..],
                    None => &line,
                };
                line.trim().to_string()
            })
            .filter(|line| !line.is_empty())
            .collect())
    }

    async fn list_commits(&self, reference: &GitReference) -> GitResult<Vec<String>> {
        if reference.is_commit() {
            return Err(GitError::BadReference(
                "cannot list history of a bare commit id".to_string(),
            ));
        }
        // The trailing "--" pins the argument to a revision, never a path.
        let lines = self
            .run_lines(&["log", "--pretty=format:%h", reference.rev(), "--"])
            .await?;
        Ok(lines
            .into_iter()
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty())
            .collect())
    }
}
