//! Git plumbing facade.
//!
//! The rest of refmount never talks to git directly; it goes through the
//! [`GitStore`] trait. The one production implementation, [`CliGit`], shells
//! out to the `git` binary's plumbing commands (`ls-tree`, `cat-file`) and
//! parses their line-oriented output. Each call spawns an independent
//! subprocess, so concurrent callers never share process state.

mod cli;
mod mode;
mod reference;
mod store;
mod tree;

pub use cli::CliGit;
pub use mode::GitFileMode;
pub use reference::{GitReference, RefKind};
pub use store::{GitError, GitResult, GitStore};
pub use tree::{parse_ls_tree, parse_ls_tree_line, TreeEntry};
