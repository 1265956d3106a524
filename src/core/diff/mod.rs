//! core::diff
//!
//! Line-level text diffing.
//!
//! # Modules
//!
//! - [`myers`] - Shortest edit script over arbitrary sequences
//! - [`whitespace`] - Line splitting and whitespace comparison modes
//!
//! [`TextDiff`] ties them together: split both sides into lines, compare the
//! lines through the chosen [`WhitespaceMode`] key, then group the resulting
//! edit script into hunks.
//!
//! # Hunk numbering
//!
//! Line numbers are 1-based. When one side of a hunk is empty, its start is
//! the line *before* the change, so an insertion at the top of a file has
//! `old_start == 0`.
//!
//! # Example
//!
//! ```
//! use repolens::core::diff::{DiffHunk, TextDiff, WhitespaceMode};
//!
//! let diff = TextDiff::compute(b"first line\n", b"first line\nsecond line", WhitespaceMode::Exact);
//! assert_eq!(
//!     diff.hunks(0),
//!     vec![DiffHunk { old_start: 1, old_lines: 0, new_start: 2, new_lines: 1 }]
//! );
//! assert_eq!(diff.stats().added, 1);
//! ```

mod hunks;
pub mod myers;
pub mod whitespace;

use serde::{Deserialize, Serialize};

pub use myers::Edit;
pub use whitespace::{split_lines, WhitespaceMode};

/// Bytes inspected when sniffing for binary content.
pub const BINARY_SNIFF_LEN: usize = 8000;

/// Default number of context lines around a change.
pub const DEFAULT_CONTEXT_LINES: u32 = 3;

/// A contiguous region of change between two texts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffHunk {
    pub old_start: u32,
    pub old_lines: u32,
    pub new_start: u32,
    pub new_lines: u32,
}

impl DiffHunk {
    /// The `@@ -a,b +c,d @@` header line.
    pub fn header(&self) -> String {
        format!(
            "@@ -{},{} +{},{} @@",
            self.old_start, self.old_lines, self.new_start, self.new_lines
        )
    }
}

/// Where a diff line comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineOrigin {
    Context,
    Addition,
    Deletion,
}

impl LineOrigin {
    /// The unified-diff prefix character.
    pub fn prefix(self) -> char {
        match self {
            LineOrigin::Context => ' ',
            LineOrigin::Addition => '+',
            LineOrigin::Deletion => '-',
        }
    }
}

/// One line of a hunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffLine {
    /// Index into the hunk list this line belongs to
    pub hunk: usize,
    /// 1-based line in the old text, absent for additions
    pub old_lineno: Option<u32>,
    /// 1-based line in the new text, absent for deletions
    pub new_lineno: Option<u32>,
    pub origin: LineOrigin,
    /// Raw line text, including its terminator if it had one
    pub content: String,
}

/// Added and deleted line counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffStats {
    pub added: usize,
    pub deleted: usize,
}

impl DiffStats {
    pub fn is_empty(&self) -> bool {
        self.added == 0 && self.deleted == 0
    }
}

/// Which stored object a buffer diff compares against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlobSource {
    /// The path in the HEAD commit's tree
    #[default]
    Head,
    /// The path's entry in the index
    Index,
}

/// Options for a blob-to-buffer diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffOptions {
    pub context_lines: u32,
    pub whitespace: WhitespaceMode,
    pub source: BlobSource,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            context_lines: DEFAULT_CONTEXT_LINES,
            whitespace: WhitespaceMode::default(),
            source: BlobSource::default(),
        }
    }
}

impl DiffOptions {
    pub fn context_lines(mut self, lines: u32) -> Self {
        self.context_lines = lines;
        self
    }

    pub fn whitespace(mut self, mode: WhitespaceMode) -> Self {
        self.whitespace = mode;
        self
    }

    pub fn source(mut self, source: BlobSource) -> Self {
        self.source = source;
        self
    }
}

/// True when a NUL byte appears in the first [`BINARY_SNIFF_LEN`] bytes.
pub fn is_binary(content: &[u8]) -> bool {
    content.iter().take(BINARY_SNIFF_LEN).any(|b| *b == 0)
}

/// A computed line diff between two texts.
#[derive(Debug, Clone)]
pub struct TextDiff<'a> {
    old: Vec<&'a [u8]>,
    new: Vec<&'a [u8]>,
    script: Vec<Edit>,
    binary: bool,
}

impl<'a> TextDiff<'a> {
    /// Diff `old` against `new`.
    ///
    /// Binary input on either side yields an empty diff.
    pub fn compute(old: &'a [u8], new: &'a [u8], mode: WhitespaceMode) -> Self {
        if is_binary(old) || is_binary(new) {
            return Self {
                old: Vec::new(),
                new: Vec::new(),
                script: Vec::new(),
                binary: true,
            };
        }

        let old = split_lines(old);
        let new = split_lines(new);
        let old_keys: Vec<_> = old.iter().map(|l| mode.key(l)).collect();
        let new_keys: Vec<_> = new.iter().map(|l| mode.key(l)).collect();
        let script = myers::diff(&old_keys, &new_keys);

        Self {
            old,
            new,
            script,
            binary: false,
        }
    }

    pub fn is_binary(&self) -> bool {
        self.binary
    }

    /// The edit script, as indices into the old and new lines.
    pub fn edits(&self) -> &[Edit] {
        &self.script
    }

    /// Added and deleted line counts.
    pub fn stats(&self) -> DiffStats {
        self.script
            .iter()
            .fold(DiffStats::default(), |mut stats, edit| {
                match edit {
                    Edit::Insert { .. } => stats.added += 1,
                    Edit::Delete { .. } => stats.deleted += 1,
                    Edit::Equal { .. } => {}
                }
                stats
            })
    }

    /// Hunks with `context` lines of context.
    pub fn hunks(&self, context: u32) -> Vec<DiffHunk> {
        self.hunks_and_lines(context).0
    }

    /// Hunks and every line belonging to them, context lines included.
    pub fn hunks_and_lines(&self, context: u32) -> (Vec<DiffHunk>, Vec<DiffLine>) {
        hunks::build(&self.script, &self.old, &self.new, context as usize)
    }
}
