//! Root-relative path model.
//!
//! A [`TreePath`] is an ordered sequence of non-empty segments; the empty
//! sequence is the logical root. Requests are resolved segment by segment
//! against the combined base+request list, never by joining strings and
//! prefix-checking the result (`/root-extra` shares the string prefix of
//! `/root` but is a sibling, not a child).

use std::sync::OnceLock;

use crate::error::{FsError, FsResult};

/// Path separator used in request strings and rendered paths.
pub const SEPARATOR: char = '/';

/// A normalized path relative to a logical root.
///
/// Invariants: segments are non-empty, contain no separator, and are never
/// `.` or `..`. The canonical string rendering is computed lazily and
/// memoized per instance.
#[derive(Debug, Default)]
pub struct TreePath {
    segments: Vec<String>,
    rendered: OnceLock<String>,
}

impl TreePath {
    /// The logical root (empty segment sequence).
    pub fn root() -> Self {
        Self::default()
    }

    fn from_segments(segments: Vec<String>) -> Self {
        Self {
            segments,
            rendered: OnceLock::new(),
        }
    }

    /// Resolve a request string against this path.
    ///
    /// `.` and empty components are no-ops, `..` pops one segment and fails
    /// with [`FsError::EscapesRoot`] when there is nothing left to pop.
    /// Symlink targets are never inspected here; resolution is purely
    /// lexical.
    pub fn resolve(&self, request: &str) -> FsResult<TreePath> {
        let mut segments = self.segments.clone();
        for component in request.split(SEPARATOR) {
            match component {
                "" | "." => {}
                ".." => {
                    if segments.pop().is_none() {
                        return Err(FsError::EscapesRoot);
                    }
                }
                other => segments.push(other.to_string()),
            }
        }
        Ok(TreePath::from_segments(segments))
    }

    /// Append an already-resolved path beneath this one.
    ///
    /// Used to compose a view root with a view-relative path. Unlike
    /// [`resolve`](Self::resolve) this never fails: both operands already
    /// uphold the segment invariants.
    pub fn join(&self, below: &TreePath) -> TreePath {
        let mut segments = self.segments.clone();
        segments.extend(below.segments.iter().cloned());
        TreePath::from_segments(segments)
    }

    /// Parent path. The parent of the root is the root.
    pub fn parent(&self) -> TreePath {
        if self.is_root() {
            return TreePath::root();
        }
        TreePath::from_segments(self.segments[..self.segments.len() - 1].to_vec())
    }

    /// True if this is the logical root.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Number of segments.
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Final segment, if any.
    pub fn file_name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Path segments.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Canonical rendering: `.` for the root, segments joined by `/`
    /// otherwise. Memoized after the first call.
    pub fn render(&self) -> &str {
        self.rendered.get_or_init(|| {
            if self.segments.is_empty() {
                ".".to_string()
            } else {
                self.segments.join("/")
            }
        })
    }
}

impl Clone for TreePath {
    fn clone(&self) -> Self {
        // The memoized rendering is per-instance; the clone recomputes it
        // on demand.
        Self::from_segments(self.segments.clone())
    }
}

impl PartialEq for TreePath {
    fn eq(&self, other: &Self) -> bool {
        self.segments == other.segments
    }
}

impl Eq for TreePath {}

impl std::fmt::Display for TreePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_simple() {
        let root = TreePath::root();
        let path = root.resolve("./foo/bar.cc").unwrap();
        assert_eq!(path.render(), "foo/bar.cc");
        assert_eq!(path.depth(), 2);
    }

    #[test]
    fn resolve_parent_components() {
        let root = TreePath::root();
        let path = root.resolve("foo/bar.cc").unwrap();
        let up = path.resolve("..").unwrap();
        assert_eq!(up.render(), "foo");
        let up = up.resolve("..").unwrap();
        assert!(up.is_root());
        assert_eq!(up.render(), ".");
    }

    #[test]
    fn resolve_escape_is_error() {
        let root = TreePath::root();
        assert!(matches!(root.resolve(".."), Err(FsError::EscapesRoot)));

        let one = root.resolve("a").unwrap();
        assert!(matches!(one.resolve("../.."), Err(FsError::EscapesRoot)));
    }

    #[test]
    fn resolve_mixed_components() {
        let base = TreePath::root().resolve("a/b").unwrap();
        let path = base.resolve("../c/./d").unwrap();
        assert_eq!(path.render(), "a/c/d");
    }

    #[test]
    fn resolve_skips_empty_components() {
        let root = TreePath::root();
        let path = root.resolve("a//b/").unwrap();
        assert_eq!(path.render(), "a/b");
    }

    #[test]
    fn sibling_prefix_is_not_a_child() {
        // "root-extra" must not be confused with a path under "root".
        let base = TreePath::root().resolve("root").unwrap();
        let sibling = TreePath::root().resolve("root-extra").unwrap();
        assert_ne!(base, sibling);
        assert!(matches!(
            base.resolve("../root-extra/../.."),
            Err(FsError::EscapesRoot)
        ));
    }

    #[test]
    fn join_composes_root_and_relative() {
        let base = TreePath::root().resolve("test").unwrap();
        let rel = TreePath::root().resolve("nested.txt").unwrap();
        assert_eq!(base.join(&rel).render(), "test/nested.txt");
        assert_eq!(TreePath::root().join(&rel).render(), "nested.txt");
        assert_eq!(base.join(&TreePath::root()).render(), "test");
    }

    #[test]
    fn parent_of_root_is_root() {
        // Distinct boundary behavior from resolve: parent() never fails.
        let root = TreePath::root();
        assert!(root.parent().is_root());
    }

    #[test]
    fn render_is_memoized_and_stable() {
        let path = TreePath::root().resolve("x/y").unwrap();
        let first = path.render() as *const str;
        let second = path.render() as *const str;
        assert_eq!(first, second);
        assert_eq!(path.render(), "x/y");
    }

    #[test]
    fn deep_pop_yields_prefix() {
        let path = TreePath::root().resolve("a/b/c/d").unwrap();
        for (ups, expect) in [
            ("..", "a/b/c"),
            ("../..", "a/b"),
            ("../../..", "a"),
            ("../../../..", "."),
        ] {
            assert_eq!(path.resolve(ups).unwrap().render(), expect);
        }
        assert!(path.resolve("../../../../..").is_err());
    }
}
