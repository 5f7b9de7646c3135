//! Reference selection: which point in history a view is pinned to.

/// A named or content-addressed pointer into revision history.
///
/// Exactly one of branch, tag, or commit; the enum makes "multiple refs
/// specified" unrepresentable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitReference {
    /// A branch name, e.g. `main`.
    Branch(String),
    /// A tag name, e.g. `v1.2.0`.
    Tag(String),
    /// A commit id (full or abbreviated).
    Commit(String),
}

impl GitReference {
    /// The tree-like revision string handed to git plumbing commands.
    pub fn rev(&self) -> &str {
        match self {
            GitReference::Branch(s) | GitReference::Tag(s) | GitReference::Commit(s) => s,
        }
    }

    /// True if this reference is a bare commit id.
    pub fn is_commit(&self) -> bool {
        matches!(self, GitReference::Commit(_))
    }
}

impl std::fmt::Display for GitReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.rev())
    }
}

/// Which kind of reference to enumerate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefKind {
    /// Local and remote branches.
    Branch,
    /// Tags.
    Tag,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rev_strings() {
        assert_eq!(GitReference::Branch("main".into()).rev(), "main");
        assert_eq!(GitReference::Tag("v1".into()).rev(), "v1");
        assert_eq!(GitReference::Commit("abc123".into()).rev(), "abc123");
        assert!(GitReference::Commit("abc123".into()).is_commit());
        assert!(!GitReference::Branch("main".into()).is_commit());
    }
}
