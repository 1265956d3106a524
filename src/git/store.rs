//! git::store
//!
//! The object-store trait the engines are written against, and the plain
//! data types that cross it.

use std::path::Path;

use crate::core::diff::DiffStats;
use crate::core::revwalk::CommitGraph;
use crate::core::status::{StatusFlags, StatusOptions};
use crate::core::types::{BranchName, ObjectId, RefName};

use super::StoreError;

/// What HEAD points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeadState {
    /// HEAD names a local branch
    Branch(RefName),
    /// HEAD points directly at a commit
    Detached(ObjectId),
}

impl HeadState {
    /// Full ref name for a branch, or the commit sha when detached.
    pub fn describe(&self) -> String {
        match self {
            HeadState::Branch(name) => name.to_string(),
            HeadState::Detached(id) => id.to_string(),
        }
    }

    /// Branch short name, or a 7-character sha when detached.
    pub fn short(&self) -> String {
        match self {
            HeadState::Branch(name) => name
                .branch_name()
                .map(|b| b.to_string())
                .unwrap_or_else(|_| name.to_string()),
            HeadState::Detached(id) => id.short(7),
        }
    }
}

/// Mode of a tree or index entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileMode {
    Tree,
    Blob,
    BlobExecutable,
    Link,
    /// A gitlink, i.e. a submodule commit
    Commit,
    Unknown,
}

impl FileMode {
    /// Classify a raw git file mode.
    pub fn from_raw(mode: u32) -> Self {
        match mode & 0o170000 {
            0o040000 => FileMode::Tree,
            0o120000 => FileMode::Link,
            0o160000 => FileMode::Commit,
            0o100000 if mode & 0o111 != 0 => FileMode::BlobExecutable,
            0o100000 => FileMode::Blob,
            _ => FileMode::Unknown,
        }
    }

    /// Regular or executable file.
    pub fn is_blob(self) -> bool {
        matches!(self, FileMode::Blob | FileMode::BlobExecutable)
    }
}

/// An entry looked up by path in a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeEntry {
    pub id: ObjectId,
    pub mode: FileMode,
}

/// An entry looked up by path in the index (stage 0).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub path: String,
    pub id: ObjectId,
    pub mode: FileMode,
}

/// How a tracked path differs between a tree and the working directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Deleted,
    Modified,
    Renamed,
    TypeChange,
    Other,
}

/// One tracked path that differs between a tree and the working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkdirChange {
    /// Repository-relative path
    pub path: String,
    pub kind: ChangeKind,
    /// Blob id on the tree side, absent for additions
    pub old: Option<ObjectId>,
}

/// Checkout conflict handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutStrategy {
    /// Overwrite local modifications
    Force,
    /// Refuse when local modifications would be lost
    Safe,
}

/// Everything the engines need from a repository.
///
/// `Git` is the production implementation. Paths are repository-relative and
/// `/`-separated unless stated otherwise.
pub trait ObjectStore: CommitGraph<Error = StoreError> {
    // Paths

    /// Working directory, absent for bare repositories.
    fn work_dir(&self) -> Option<&Path>;

    /// The `.git` directory.
    fn git_dir(&self) -> &Path;

    // HEAD and refs

    /// HEAD state, or `None` when HEAD is unborn.
    fn head(&self) -> Result<Option<HeadState>, StoreError>;

    /// Commit HEAD resolves to, or `None` when HEAD is unborn.
    fn head_commit(&self) -> Result<Option<ObjectId>, StoreError>;

    /// Resolve a ref name (or `HEAD`) to a commit, peeling tags.
    fn resolve_ref(&self, refname: &str) -> Result<Option<ObjectId>, StoreError>;

    /// The id a ref points at after following symbolic refs, without peeling.
    fn reference_target(&self, refname: &str) -> Result<Option<ObjectId>, StoreError>;

    /// All reference names.
    fn reference_names(&self) -> Result<Vec<String>, StoreError>;

    /// Create a local branch at `target`. Fails if it already exists.
    fn create_branch(&self, name: &BranchName, target: &ObjectId) -> Result<RefName, StoreError>;

    /// Point HEAD at a ref.
    fn set_head(&self, refname: &RefName) -> Result<(), StoreError>;

    /// Upstream ref configured for a local branch ref.
    fn upstream_of(&self, refname: &RefName) -> Result<Option<RefName>, StoreError>;

    // Objects

    /// Tree a ref peels to.
    fn peel_to_tree(&self, refname: &RefName) -> Result<ObjectId, StoreError>;

    /// Entry at `path` within a tree, if any.
    fn tree_entry(&self, tree: &ObjectId, path: &str) -> Result<Option<TreeEntry>, StoreError>;

    /// Raw blob content.
    fn blob(&self, id: &ObjectId) -> Result<Vec<u8>, StoreError>;

    // Index

    /// Stage-0 index entry at `path`, read fresh from disk.
    fn index_entry(&self, path: &str) -> Result<Option<IndexEntry>, StoreError>;

    /// Stage a working-tree file and write the index.
    fn add_to_index(&self, path: &str) -> Result<(), StoreError>;

    /// Re-read the index from disk.
    fn refresh_index(&self) -> Result<(), StoreError>;

    // Status

    fn is_ignored(&self, path: &str) -> Result<bool, StoreError>;

    /// Whole-tree status.
    fn statuses(&self, options: &StatusOptions) -> Result<Vec<(String, StatusFlags)>, StoreError>;

    /// Status of one path.
    fn status_file(&self, path: &str) -> Result<StatusFlags, StoreError>;

    // Working directory

    /// Tracked paths that differ between `tree` and the working directory.
    fn workdir_changes(&self, tree: &ObjectId) -> Result<Vec<WorkdirChange>, StoreError>;

    /// Added and deleted lines between `path` in `tree` and the working
    /// directory, after the store's content filters (line endings, attributes)
    /// are applied. Symlinks compare by link text. Binary content and an
    /// unchanged path give `{0, 0}`.
    fn workdir_line_stats(&self, tree: &ObjectId, path: &str) -> Result<DiffStats, StoreError>;

    // Checkout

    /// Check out the HEAD tree, optionally restricted to one literal path.
    fn checkout_head(&self, path: Option<&str>, strategy: CheckoutStrategy) -> Result<(), StoreError>;

    /// Check out a tree into the index and working directory.
    fn checkout_tree(&self, tree: &ObjectId, strategy: CheckoutStrategy) -> Result<(), StoreError>;

    // Config

    fn config_string(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set_config_string(&self, key: &str, value: &str) -> Result<(), StoreError>;
}
