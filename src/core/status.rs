//! core::status
//!
//! Status classification types.
//!
//! [`StatusFlags`] uses the same bit values as libgit2's `git_status_t`, so a
//! flag set produced here can be compared directly against values reported by
//! other libgit2 consumers.
//!
//! # Example
//!
//! ```
//! use repolens::core::status::StatusFlags;
//!
//! let flags = StatusFlags::INDEX_NEW | StatusFlags::WT_MODIFIED;
//! assert!(flags.is_new());
//! assert!(flags.is_modified());
//! assert!(flags.is_staged());
//! assert_eq!(flags.bits(), (1 << 0) | (1 << 8));
//! ```

use std::collections::BTreeMap;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Per-path status bits.
    ///
    /// The empty set means the path is unmodified, or unknown to the store.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct StatusFlags: u32 {
        const INDEX_NEW = 1 << 0;
        const INDEX_MODIFIED = 1 << 1;
        const INDEX_DELETED = 1 << 2;
        const INDEX_RENAMED = 1 << 3;
        const INDEX_TYPECHANGE = 1 << 4;

        const WT_NEW = 1 << 7;
        const WT_MODIFIED = 1 << 8;
        const WT_DELETED = 1 << 9;
        const WT_TYPECHANGE = 1 << 10;
        const WT_RENAMED = 1 << 11;
        const WT_UNREADABLE = 1 << 12;

        const IGNORED = 1 << 14;
        const CONFLICTED = 1 << 15;

        const INDEX_ANY = Self::INDEX_NEW.bits()
            | Self::INDEX_MODIFIED.bits()
            | Self::INDEX_DELETED.bits()
            | Self::INDEX_RENAMED.bits()
            | Self::INDEX_TYPECHANGE.bits();
        const WT_CHANGED = Self::WT_MODIFIED.bits()
            | Self::WT_DELETED.bits()
            | Self::WT_TYPECHANGE.bits()
            | Self::WT_RENAMED.bits();
    }
}

impl StatusFlags {
    /// Modified in the index or the working tree.
    pub fn is_modified(&self) -> bool {
        self.intersects(Self::WT_MODIFIED | Self::INDEX_MODIFIED)
    }

    /// New in the index or the working tree.
    pub fn is_new(&self) -> bool {
        self.intersects(Self::WT_NEW | Self::INDEX_NEW)
    }

    /// Deleted in the index or the working tree.
    pub fn is_deleted(&self) -> bool {
        self.intersects(Self::WT_DELETED | Self::INDEX_DELETED)
    }

    pub fn is_ignored(&self) -> bool {
        self.contains(Self::IGNORED)
    }

    /// Any index-side change is present.
    pub fn is_staged(&self) -> bool {
        self.intersects(Self::INDEX_ANY)
    }

    pub fn is_conflicted(&self) -> bool {
        self.contains(Self::CONFLICTED)
    }

    /// No status bits at all.
    pub fn is_clean(&self) -> bool {
        self.is_empty()
    }

    /// Two-column short code in the style of `git status --short`.
    ///
    /// # Example
    ///
    /// ```
    /// use repolens::core::status::StatusFlags;
    ///
    /// assert_eq!(StatusFlags::WT_NEW.short_code(), "??");
    /// assert_eq!((StatusFlags::INDEX_NEW | StatusFlags::WT_MODIFIED).short_code(), "AM");
    /// assert_eq!(StatusFlags::WT_DELETED.short_code(), " D");
    /// ```
    pub fn short_code(&self) -> String {
        if self.is_conflicted() {
            return "UU".to_string();
        }
        if self.is_ignored() {
            return "!!".to_string();
        }
        if self.contains(Self::WT_NEW) && !self.is_staged() {
            return "??".to_string();
        }

        let index = if self.contains(Self::INDEX_NEW) {
            'A'
        } else if self.contains(Self::INDEX_MODIFIED) {
            'M'
        } else if self.contains(Self::INDEX_DELETED) {
            'D'
        } else if self.contains(Self::INDEX_RENAMED) {
            'R'
        } else if self.contains(Self::INDEX_TYPECHANGE) {
            'T'
        } else {
            ' '
        };
        let worktree = if self.contains(Self::WT_MODIFIED) {
            'M'
        } else if self.contains(Self::WT_DELETED) {
            'D'
        } else if self.contains(Self::WT_RENAMED) {
            'R'
        } else if self.contains(Self::WT_TYPECHANGE) {
            'T'
        } else {
            ' '
        };
        format!("{index}{worktree}")
    }
}

/// Status results keyed by repository-relative path, in ascending path order.
pub type StatusMap = BTreeMap<String, StatusFlags>;

/// Options for a whole-tree status run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusOptions {
    /// Report untracked files.
    pub include_untracked: bool,
    /// Descend into untracked directories and report their files.
    pub recurse_untracked_dirs: bool,
    /// Report ignored files.
    pub include_ignored: bool,
    /// Restrict to these pathspecs. Empty means the whole tree.
    pub pathspecs: Vec<String>,
}

impl Default for StatusOptions {
    fn default() -> Self {
        Self {
            include_untracked: true,
            recurse_untracked_dirs: true,
            include_ignored: false,
            pathspecs: Vec::new(),
        }
    }
}

impl StatusOptions {
    /// Set the pathspecs.
    pub fn with_pathspecs<I, S>(mut self, specs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.pathspecs = specs.into_iter().map(Into::into).collect();
        self
    }
}

/// Counts derived from a [`StatusMap`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusSummary {
    /// Paths with index-side changes
    pub staged: usize,
    /// Tracked paths with working-tree changes
    pub unstaged: usize,
    /// Untracked paths
    pub untracked: usize,
    /// Paths with unresolved conflicts
    pub conflicted: usize,
}

impl StatusSummary {
    /// Tally a status map.
    pub fn from_map(map: &StatusMap) -> Self {
        let mut summary = Self::default();
        for flags in map.values() {
            if flags.is_conflicted() {
                summary.conflicted += 1;
            }
            if flags.is_staged() {
                summary.staged += 1;
            }
            if flags.intersects(StatusFlags::WT_CHANGED) {
                summary.unstaged += 1;
            }
            if flags.contains(StatusFlags::WT_NEW) {
                summary.untracked += 1;
            }
        }
        summary
    }

    /// No staged, unstaged or conflicted paths. Untracked files do not count.
    pub fn is_clean(&self) -> bool {
        self.staged == 0 && self.unstaged == 0 && self.conflicted == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod flags {
        use super::*;

        #[test]
        fn bit_values_match_libgit2() {
            assert_eq!(StatusFlags::INDEX_NEW.bits(), 1);
            assert_eq!(StatusFlags::WT_NEW.bits(), 128);
            assert_eq!(StatusFlags::WT_MODIFIED.bits(), 256);
            assert_eq!(StatusFlags::WT_DELETED.bits(), 512);
            assert_eq!(StatusFlags::IGNORED.bits(), 1 << 14);
            assert_eq!(StatusFlags::CONFLICTED.bits(), 1 << 15);
        }

        #[test]
        fn predicates() {
            assert!(StatusFlags::INDEX_MODIFIED.is_modified());
            assert!(StatusFlags::WT_MODIFIED.is_modified());
            assert!(!StatusFlags::WT_NEW.is_modified());

            assert!(StatusFlags::WT_DELETED.is_deleted());
            assert!(StatusFlags::INDEX_DELETED.is_staged());
            assert!(!StatusFlags::WT_DELETED.is_staged());

            assert!(StatusFlags::IGNORED.is_ignored());
            assert!(StatusFlags::empty().is_clean());
            assert!(!StatusFlags::WT_NEW.is_clean());
        }

        #[test]
        fn unknown_bits_are_dropped() {
            let flags = StatusFlags::from_bits_truncate((1 << 7) | (1 << 30));
            assert_eq!(flags, StatusFlags::WT_NEW);
        }

        #[test]
        fn short_codes() {
            assert_eq!(StatusFlags::INDEX_MODIFIED.short_code(), "M ");
            assert_eq!(StatusFlags::WT_MODIFIED.short_code(), " M");
            assert_eq!(StatusFlags::IGNORED.short_code(), "!!");
            assert_eq!(StatusFlags::CONFLICTED.short_code(), "UU");
        }
    }

    mod summary {
        use super::*;

        #[test]
        fn empty_map_is_clean() {
            let summary = StatusSummary::from_map(&StatusMap::new());
            assert!(summary.is_clean());
        }

        #[test]
        fn counts_each_category() {
            let mut map = StatusMap::new();
            map.insert("a.txt".into(), StatusFlags::WT_DELETED);
            map.insert("b.txt".into(), StatusFlags::WT_NEW);
            map.insert(
                "c.txt".into(),
                StatusFlags::INDEX_NEW | StatusFlags::WT_MODIFIED,
            );
            map.insert("d.txt".into(), StatusFlags::CONFLICTED);

            let summary = StatusSummary::from_map(&map);
            assert_eq!(
                summary,
                StatusSummary {
                    staged: 1,
                    unstaged: 2,
                    untracked: 1,
                    conflicted: 1,
                }
            );
            assert!(!summary.is_clean());
        }

        #[test]
        fn untracked_only_is_clean() {
            let mut map = StatusMap::new();
            map.insert("new.txt".into(), StatusFlags::WT_NEW);
            assert!(StatusFlags::WT_NEW.is_new());
            assert!(StatusSummary::from_map(&map).is_clean());
        }
    }

    #[test]
    fn default_options() {
        let opts = StatusOptions::default();
        assert!(opts.include_untracked);
        assert!(opts.recurse_untracked_dirs);
        assert!(!opts.include_ignored);
        assert!(opts.pathspecs.is_empty());
    }
}
