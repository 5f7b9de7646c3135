//! Parsing of `git ls-tree --long` output.
//!
//! One line per entry:
//!
//! ```text
//! 100644 blob c64211fac0a777ffada0af11bd64ca20e6289d7c    3500\tREADME.md
//! 040000 tree 9a357a03c7e6f621a1d9f32e2d04b6a397e1a969       -\tsrc
//! ```
//!
//! Fields are space-separated up to the hash; size and path are separated
//! by a tab, with `-` as the size placeholder for non-blob entries. This is
//! isolated here so it can be unit-tested against captured output strings
//! rather than a live git process.

use crate::mode::GitFileMode;
use crate::store::{GitError, GitResult};

/// One entry of a tree listing, as printed by `ls-tree --long`.
#[derive(Debug, Clone)]
pub struct TreeEntry {
    /// Decoded file mode.
    pub mode: GitFileMode,
    /// Object kind field as printed (`blob`, `tree`, `commit`).
    pub object: String,
    /// Content hash. Opaque; keyed into `cat-file`.
    pub hash: String,
    /// Byte size. `None` for non-blob entries (`-` placeholder).
    pub size: Option<u64>,
    /// Path relative to the listed tree.
    pub path: String,
}

impl TreeEntry {
    /// Base name of the entry (final path component).
    pub fn name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

/// Parse a single `ls-tree --long` line.
pub fn parse_ls_tree_line(line: &str) -> GitResult<TreeEntry> {
    let (mode_text, rest) = line
        .split_once(' ')
        .ok_or_else(|| GitError::malformed(format!("mode not found in: {line}")))?;
    let (object_text, rest) = rest
        .split_once(' ')
        .ok_or_else(|| GitError::malformed(format!("object type not found in: {line}")))?;
    let (hash_text, rest) = rest
        .split_once(' ')
        .ok_or_else(|| GitError::malformed(format!("hash not found in: {line}")))?;
    // ls-tree right-pads the size column; the tab separates size from path.
    let (size_text, path_text) = rest
        .split_once('\t')
        .ok_or_else(|| GitError::malformed(format!("size not found in: {line}")))?;

    let raw_mode = u32::from_str_radix(mode_text, 8)
        .map_err(|_| GitError::malformed(format!("bad mode octal in: {line}")))?;

    let size_text = size_text.trim();
    let size = if size_text == "-" {
        None
    } else {
        Some(
            size_text
                .parse::<u64>()
                .map_err(|_| GitError::malformed(format!("bad size in: {line}")))?,
        )
    };

    Ok(TreeEntry {
        mode: GitFileMode::decode(raw_mode),
        object: object_text.trim().to_string(),
        hash: hash_text.trim().to_string(),
        size,
        path: path_text.trim().to_string(),
    })
}

/// Parse a full `ls-tree --long` listing. A single malformed line fails the
/// whole call.
pub fn parse_ls_tree(output: &str) -> GitResult<Vec<TreeEntry>> {
    output
        .lines()
        .filter(|line| !line.is_empty())
        .map(parse_ls_tree_line)
        .collect()
}
