//! git::interface
//!
//! Object-store implementation using git2.
//!
//! This module is the **single doorway** to libgit2. Every read and write
//! the engines perform lands here, which normalizes libgit2 errors into
//! typed failure categories and converts raw ids into strong types.
//!
//! # Error Handling
//!
//! Git errors are categorized into typed variants:
//! - [`StoreError::NotARepo`]: No repository at or above the path
//! - [`StoreError::RefNotFound`], [`StoreError::ObjectNotFound`],
//!   [`StoreError::PathNotFound`]: Lookup misses
//! - [`StoreError::InvalidOid`], [`StoreError::InvalidRefName`]: Malformed input
//! - [`StoreError::Conflict`]: A checkout or ref update would lose data
//!
//! # Example
//!
//! ```ignore
//! use repolens::git::{Git, ObjectStore};
//! use std::path::Path;
//!
//! let git = Git::open(Path::new("."))?;
//! if let Some(head) = git.head()? {
//!     println!("on {}", head.short());
//! }
//! ```

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use thiserror::Error;

use super::store::{
    ChangeKind, CheckoutStrategy, FileMode, HeadState, IndexEntry, ObjectStore, TreeEntry,
    WorkdirChange,
};
use crate::core::diff::DiffStats;
use crate::core::revwalk::{CommitGraph, CommitNode};
use crate::core::status::{StatusFlags, StatusOptions};
use crate::core::types::{BranchName, ObjectId, RefName, TypeError};

/// Errors from object-store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Not inside a Git repository.
    #[error("not a git repository: {path}")]
    NotARepo {
        /// The path that was searched
        path: PathBuf,
    },

    /// The operation needs a working directory.
    #[error("bare repository has no working directory")]
    BareRepo,

    /// Requested ref does not exist.
    #[error("ref not found: {refname}")]
    RefNotFound {
        /// The ref that was not found
        refname: String,
    },

    /// Object not found in repository.
    #[error("object not found: {oid}")]
    ObjectNotFound {
        /// The id that was not found
        oid: String,
    },

    /// Path not present in the tree, index or working directory.
    #[error("path not found: {path}")]
    PathNotFound {
        /// The missing path
        path: String,
    },

    /// Invalid object id format.
    #[error("invalid object id: {oid}")]
    InvalidOid {
        /// The invalid id string
        oid: String,
    },

    /// Invalid ref name format.
    #[error("invalid ref name: {message}")]
    InvalidRefName {
        /// Description of the problem
        message: String,
    },

    /// The operation would overwrite local changes, or the target exists.
    #[error("conflict: {message}")]
    Conflict {
        /// What conflicted
        message: String,
    },

    /// A lock file is held by someone else.
    #[error("repository is locked: {message}")]
    Locked {
        /// Description of the lock
        message: String,
    },

    /// Permission or filesystem error.
    #[error("repository access error: {message}")]
    AccessError {
        /// Description of the error
        message: String,
    },

    /// Internal git2 error.
    #[error("git error: {message}")]
    Internal {
        /// The error message
        message: String,
    },
}

/// Coarse error taxonomy used by callers that only care about the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    NotFound,
    InvalidInput,
    StoreFailure,
}

impl StoreError {
    /// Which broad category this error belongs to.
    pub fn category(&self) -> ErrorCategory {
        match self {
            StoreError::NotARepo { .. }
            | StoreError::RefNotFound { .. }
            | StoreError::ObjectNotFound { .. }
            | StoreError::PathNotFound { .. } => ErrorCategory::NotFound,
            StoreError::InvalidOid { .. } | StoreError::InvalidRefName { .. } => {
                ErrorCategory::InvalidInput
            }
            StoreError::BareRepo
            | StoreError::Conflict { .. }
            | StoreError::Locked { .. }
            | StoreError::AccessError { .. }
            | StoreError::Internal { .. } => ErrorCategory::StoreFailure,
        }
    }

    /// Classify a git2 error by what was being looked at.
    fn from_git2(err: git2::Error, subject: Subject<'_>) -> Self {
        use git2::ErrorCode as Code;

        match (err.code(), subject) {
            (Code::NotFound | Code::UnbornBranch, Subject::Ref(name)) => StoreError::RefNotFound {
                refname: name.to_string(),
            },
            (Code::NotFound, Subject::Object(id)) => StoreError::ObjectNotFound {
                oid: id.to_string(),
            },
            (Code::NotFound, Subject::Path(path)) => StoreError::PathNotFound {
                path: path.to_string(),
            },
            (Code::InvalidSpec, Subject::Ref(_)) => StoreError::InvalidRefName {
                message: err.message().to_string(),
            },
            (Code::InvalidSpec, Subject::Object(id)) => StoreError::InvalidOid {
                oid: id.to_string(),
            },
            (Code::Exists | Code::Conflict | Code::MergeConflict | Code::Uncommitted, _) => {
                StoreError::Conflict {
                    message: format!("{}: {}", subject, err.message()),
                }
            }
            (Code::Locked, _) => StoreError::Locked {
                message: err.message().to_string(),
            },
            (Code::BareRepo, _) => StoreError::BareRepo,
            _ if matches!(err.class(), git2::ErrorClass::Os | git2::ErrorClass::Filesystem) => {
                StoreError::AccessError {
                    message: format!("{}: {}", subject, err.message()),
                }
            }
            _ => StoreError::Internal {
                message: format!("{}: {}", subject, err.message()),
            },
        }
    }
}

impl From<git2::Error> for StoreError {
    fn from(err: git2::Error) -> Self {
        StoreError::from_git2(err, Subject::Op("git"))
    }
}

impl From<TypeError> for StoreError {
    fn from(err: TypeError) -> Self {
        match err {
            TypeError::InvalidOid(msg) => StoreError::InvalidOid { oid: msg },
            TypeError::InvalidRefName(msg) | TypeError::InvalidBranchName(msg) => {
                StoreError::InvalidRefName { message: msg }
            }
        }
    }
}

/// What an operation was acting on, for error classification.
#[derive(Debug, Clone, Copy)]
enum Subject<'a> {
    Ref(&'a str),
    Object(&'a str),
    Path(&'a str),
    Op(&'a str),
}

impl std::fmt::Display for Subject<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Subject::Ref(s) | Subject::Object(s) | Subject::Path(s) | Subject::Op(s) => {
                f.write_str(s)
            }
        }
    }
}

fn is_missing(err: &git2::Error) -> bool {
    matches!(
        err.code(),
        git2::ErrorCode::NotFound | git2::ErrorCode::UnbornBranch
    )
}

fn to_object_id(oid: git2::Oid) -> Result<ObjectId, StoreError> {
    Ok(ObjectId::from_bytes(oid.as_bytes())?)
}

fn to_git_oid(id: &ObjectId) -> Result<git2::Oid, StoreError> {
    git2::Oid::from_bytes(id.as_bytes()).map_err(|e| StoreError::from_git2(e, Subject::Object(&id.to_hex())))
}

/// Apply process-wide libgit2 options. Runs once, from [`crate::init`].
pub(crate) fn configure_global_options() {
    git2::opts::enable_caching(true);
    git2::opts::strict_object_creation(true);

    let (major, minor, rev) = git2::Version::get().libgit2_version();
    tracing::debug!(libgit2 = %format!("{major}.{minor}.{rev}"), "libgit2 configured");
}

/// The git2-backed object store.
///
/// One `Git` wraps one open `git2::Repository`. It is `Send` but not `Sync`,
/// so concurrent callers must serialize access themselves.
pub struct Git {
    repo: git2::Repository,
}

impl std::fmt::Debug for Git {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Git")
            .field("path", &self.repo.path())
            .finish()
    }
}

impl Git {
    // =========================================================================
    // Repository Opening
    // =========================================================================

    /// Open the repository containing `path`, searching upward.
    ///
    /// # Errors
    ///
    /// - [`StoreError::NotARepo`] if no repository is found
    ///
    /// # Example
    ///
    /// ```ignore
    /// let git = Git::open(Path::new("./src"))?;  // Works from subdirectory
    /// ```
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let repo = git2::Repository::discover(path).map_err(|_| StoreError::NotARepo {
            path: path.to_path_buf(),
        })?;
        tracing::debug!(git_dir = %repo.path().display(), "opened repository");
        Ok(Self { repo })
    }

    /// Open the repository at exactly `path`, without searching upward.
    pub fn open_exact(path: &Path) -> Result<Self, StoreError> {
        let repo = git2::Repository::open_ext(
            path,
            git2::RepositoryOpenFlags::NO_SEARCH,
            std::iter::empty::<&std::ffi::OsStr>(),
        )
        .map_err(|_| StoreError::NotARepo {
            path: path.to_path_buf(),
        })?;
        tracing::debug!(git_dir = %repo.path().display(), "opened repository (no search)");
        Ok(Self { repo })
    }

    fn require_work_dir(&self) -> Result<&Path, StoreError> {
        self.repo.workdir().ok_or(StoreError::BareRepo)
    }

    fn find_reference(&self, refname: &str) -> Result<Option<git2::Reference<'_>>, StoreError> {
        match self.repo.find_reference(refname) {
            Ok(r) => Ok(Some(r)),
            Err(e) if is_missing(&e) => Ok(None),
            Err(e) => Err(StoreError::from_git2(e, Subject::Ref(refname))),
        }
    }

    fn open_index(&self) -> Result<git2::Index, StoreError> {
        let mut index = self
            .repo
            .index()
            .map_err(|e| StoreError::from_git2(e, Subject::Op("open index")))?;
        index
            .read(false)
            .map_err(|e| StoreError::from_git2(e, Subject::Op("read index")))?;
        Ok(index)
    }

    fn checkout_builder(strategy: CheckoutStrategy) -> git2::build::CheckoutBuilder<'static> {
        let mut builder = git2::build::CheckoutBuilder::new();
        match strategy {
            CheckoutStrategy::Force => builder.force(),
            CheckoutStrategy::Safe => builder.safe(),
        };
        builder
    }
}

impl CommitGraph for Git {
    type Error = StoreError;

    fn commit(&self, id: &ObjectId) -> Result<CommitNode, StoreError> {
        let hex = id.to_hex();
        let commit = self
            .repo
            .find_commit(to_git_oid(id)?)
            .map_err(|e| StoreError::from_git2(e, Subject::Object(&hex)))?;

        let parents = commit
            .parent_ids()
            .map(to_object_id)
            .collect::<Result<Vec<_>, _>>()?;
        let seconds = commit.time().seconds();
        let time = DateTime::<Utc>::from_timestamp(seconds, 0).ok_or_else(|| {
            StoreError::Internal {
                message: format!("commit {hex} has an out-of-range timestamp {seconds}"),
            }
        })?;

        Ok(CommitNode {
            id: *id,
            parents,
            tree: to_object_id(commit.tree_id())?,
            time,
        })
    }
}

impl ObjectStore for Git {
    // =========================================================================
    // Paths
    // =========================================================================

    fn work_dir(&self) -> Option<&Path> {
        self.repo.workdir()
    }

    fn git_dir(&self) -> &Path {
        self.repo.path()
    }

    // =========================================================================
    // HEAD and Refs
    // =========================================================================

    fn head(&self) -> Result<Option<HeadState>, StoreError> {
        let head = match self.repo.head() {
            Ok(h) => h,
            Err(e) if is_missing(&e) => return Ok(None),
            Err(e) => return Err(StoreError::from_git2(e, Subject::Ref("HEAD"))),
        };

        if head.is_branch() {
            if let Some(name) = head.name() {
                return Ok(Some(HeadState::Branch(RefName::new(name)?)));
            }
        }

        match head.target() {
            Some(oid) => Ok(Some(HeadState::Detached(to_object_id(oid)?))),
            None => Ok(None),
        }
    }

    fn head_commit(&self) -> Result<Option<ObjectId>, StoreError> {
        self.resolve_ref("HEAD")
    }

    fn resolve_ref(&self, refname: &str) -> Result<Option<ObjectId>, StoreError> {
        let Some(reference) = self.find_reference(refname)? else {
            return Ok(None);
        };
        match reference.peel_to_commit() {
            Ok(commit) => Ok(Some(to_object_id(commit.id())?)),
            Err(e) if is_missing(&e) => Ok(None),
            Err(e) => Err(StoreError::from_git2(e, Subject::Ref(refname))),
        }
    }

    fn reference_target(&self, refname: &str) -> Result<Option<ObjectId>, StoreError> {
        match self.repo.refname_to_id(refname) {
            Ok(oid) => Ok(Some(to_object_id(oid)?)),
            Err(e) if is_missing(&e) => Ok(None),
            Err(e) => Err(StoreError::from_git2(e, Subject::Ref(refname))),
        }
    }

    fn reference_names(&self) -> Result<Vec<String>, StoreError> {
        let mut references = self
            .repo
            .references()
            .map_err(|e| StoreError::from_git2(e, Subject::Op("list references")))?;

        let mut names = Vec::new();
        for name in references.names() {
            match name {
                Ok(name) => names.push(name.to_string()),
                // Non-UTF-8 ref names cannot be represented; skip them.
                Err(e) => tracing::debug!(error = %e.message(), "skipping unreadable ref name"),
            }
        }
        Ok(names)
    }

    fn create_branch(&self, name: &BranchName, target: &ObjectId) -> Result<RefName, StoreError> {
        let hex = target.to_hex();
        let commit = self
            .repo
            .find_commit(to_git_oid(target)?)
            .map_err(|e| StoreError::from_git2(e, Subject::Object(&hex)))?;
        let branch = self
            .repo
            .branch(name.as_str(), &commit, false)
            .map_err(|e| StoreError::from_git2(e, Subject::Ref(name.as_str())))?;

        let refname = branch.get().name().ok_or_else(|| StoreError::InvalidRefName {
            message: format!("branch '{name}' has a non-UTF-8 ref name"),
        })?;
        tracing::debug!(branch = %name, target = %target.short(7), "created branch");
        Ok(RefName::new(refname)?)
    }

    fn set_head(&self, refname: &RefName) -> Result<(), StoreError> {
        self.repo
            .set_head(refname.as_str())
            .map_err(|e| StoreError::from_git2(e, Subject::Ref(refname.as_str())))
    }

    fn upstream_of(&self, refname: &RefName) -> Result<Option<RefName>, StoreError> {
        match self.repo.branch_upstream_name(refname.as_str()) {
            Ok(buf) => match buf.as_str() {
                Some(name) => Ok(Some(RefName::new(name)?)),
                None => Ok(None),
            },
            Err(e) if is_missing(&e) => Ok(None),
            Err(e) => Err(StoreError::from_git2(e, Subject::Ref(refname.as_str()))),
        }
    }

    // =========================================================================
    // Objects
    // =========================================================================

    fn peel_to_tree(&self, refname: &RefName) -> Result<ObjectId, StoreError> {
        let reference = self
            .find_reference(refname.as_str())?
            .ok_or_else(|| StoreError::RefNotFound {
                refname: refname.to_string(),
            })?;
        let tree = reference
            .peel_to_tree()
            .map_err(|e| StoreError::from_git2(e, Subject::Ref(refname.as_str())))?;
        to_object_id(tree.id())
    }

    fn tree_entry(&self, tree: &ObjectId, path: &str) -> Result<Option<TreeEntry>, StoreError> {
        let hex = tree.to_hex();
        let tree = self
            .repo
            .find_tree(to_git_oid(tree)?)
            .map_err(|e| StoreError::from_git2(e, Subject::Object(&hex)))?;

        match tree.get_path(Path::new(path)) {
            Ok(entry) => Ok(Some(TreeEntry {
                id: to_object_id(entry.id())?,
                mode: FileMode::from_raw(entry.filemode() as u32),
            })),
            Err(e) if is_missing(&e) => Ok(None),
            Err(e) => Err(StoreError::from_git2(e, Subject::Path(path))),
        }
    }

    fn blob(&self, id: &ObjectId) -> Result<Vec<u8>, StoreError> {
        let hex = id.to_hex();
        let blob = self
            .repo
            .find_blob(to_git_oid(id)?)
            .map_err(|e| StoreError::from_git2(e, Subject::Object(&hex)))?;
        Ok(blob.content().to_vec())
    }

    // =========================================================================
    // Index
    // =========================================================================

    fn index_entry(&self, path: &str) -> Result<Option<IndexEntry>, StoreError> {
        let index = self.open_index()?;
        match index.get_path(Path::new(path), 0) {
            Some(entry) => Ok(Some(IndexEntry {
                path: path.to_string(),
                id: to_object_id(entry.id)?,
                mode: FileMode::from_raw(entry.mode),
            })),
            None => Ok(None),
        }
    }

    fn add_to_index(&self, path: &str) -> Result<(), StoreError> {
        self.require_work_dir()?;
        let mut index = self.open_index()?;
        index
            .add_path(Path::new(path))
            .map_err(|e| StoreError::from_git2(e, Subject::Path(path)))?;
        index
            .write()
            .map_err(|e| StoreError::from_git2(e, Subject::Op("write index")))?;
        tracing::debug!(path, "staged path");
        Ok(())
    }

    fn refresh_index(&self) -> Result<(), StoreError> {
        self.open_index().map(|_| ())
    }

    // =========================================================================
    // Status
    // =========================================================================

    fn is_ignored(&self, path: &str) -> Result<bool, StoreError> {
        self.repo
            .is_path_ignored(Path::new(path))
            .map_err(|e| StoreError::from_git2(e, Subject::Path(path)))
    }

    fn statuses(&self, options: &StatusOptions) -> Result<Vec<(String, StatusFlags)>, StoreError> {
        let mut opts = git2::StatusOptions::new();
        opts.include_untracked(options.include_untracked)
            .recurse_untracked_dirs(options.recurse_untracked_dirs)
            .include_ignored(options.include_ignored);
        for spec in &options.pathspecs {
            opts.pathspec(spec);
        }

        let statuses = self
            .repo
            .statuses(Some(&mut opts))
            .map_err(|e| StoreError::from_git2(e, Subject::Op("status")))?;

        Ok(statuses
            .iter()
            .filter_map(|entry| {
                let flags = StatusFlags::from_bits_truncate(entry.status().bits());
                entry.path().map(|p| (p.to_string(), flags))
            })
            .collect())
    }

    fn status_file(&self, path: &str) -> Result<StatusFlags, StoreError> {
        let status = self
            .repo
            .status_file(Path::new(path))
            .map_err(|e| StoreError::from_git2(e, Subject::Path(path)))?;
        Ok(StatusFlags::from_bits_truncate(status.bits()))
    }

    // =========================================================================
    // Working Directory
    // =========================================================================

    fn workdir_changes(&self, tree: &ObjectId) -> Result<Vec<WorkdirChange>, StoreError> {
        self.require_work_dir()?;
        let hex = tree.to_hex();
        let tree = self
            .repo
            .find_tree(to_git_oid(tree)?)
            .map_err(|e| StoreError::from_git2(e, Subject::Object(&hex)))?;

        let mut opts = git2::DiffOptions::new();
        opts.include_untracked(false).context_lines(0);
        let diff = self
            .repo
            .diff_tree_to_workdir(Some(&tree), Some(&mut opts))
            .map_err(|e| StoreError::from_git2(e, Subject::Op("diff tree to workdir")))?;

        let mut changes = Vec::new();
        for delta in diff.deltas() {
            let kind = match delta.status() {
                git2::Delta::Added => ChangeKind::Added,
                git2::Delta::Deleted => ChangeKind::Deleted,
                git2::Delta::Modified => ChangeKind::Modified,
                git2::Delta::Renamed => ChangeKind::Renamed,
                git2::Delta::Typechange => ChangeKind::TypeChange,
                git2::Delta::Untracked | git2::Delta::Ignored | git2::Delta::Unmodified => {
                    continue
                }
                _ => ChangeKind::Other,
            };
            let path = delta
                .new_file()
                .path()
                .or_else(|| delta.old_file().path())
                .and_then(Path::to_str);
            let Some(path) = path else {
                continue;
            };
            let old = match kind {
                ChangeKind::Added => None,
                _ => Some(to_object_id(delta.old_file().id())?).filter(|id| !id.is_zero()),
            };
            changes.push(WorkdirChange {
                path: path.to_string(),
                kind,
                old,
            });
        }
        Ok(changes)
    }

    fn workdir_line_stats(&self, tree: &ObjectId, path: &str) -> Result<DiffStats, StoreError> {
        self.require_work_dir()?;
        let hex = tree.to_hex();
        let tree = self
            .repo
            .find_tree(to_git_oid(tree)?)
            .map_err(|e| StoreError::from_git2(e, Subject::Object(&hex)))?;

        let mut opts = git2::DiffOptions::new();
        opts.include_untracked(false)
            .context_lines(0)
            .pathspec(path)
            .disable_pathspec_match(true);
        let diff = self
            .repo
            .diff_tree_to_workdir(Some(&tree), Some(&mut opts))
            .map_err(|e| StoreError::from_git2(e, Subject::Path(path)))?;

        if diff.deltas().len() == 0 {
            return Ok(DiffStats::default());
        }
        let patch = git2::Patch::from_diff(&diff, 0)
            .map_err(|e| StoreError::from_git2(e, Subject::Path(path)))?;
        let Some(patch) = patch else {
            // binary
            return Ok(DiffStats::default());
        };
        let (_, added, deleted) = patch
            .line_stats()
            .map_err(|e| StoreError::from_git2(e, Subject::Path(path)))?;
        Ok(DiffStats { added, deleted })
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    fn checkout_head(&self, path: Option<&str>, strategy: CheckoutStrategy) -> Result<(), StoreError> {
        self.require_work_dir()?;
        let mut builder = Self::checkout_builder(strategy);
        if let Some(path) = path {
            builder.path(path).disable_pathspec_match(true);
        }
        self.repo
            .checkout_head(Some(&mut builder))
            .map_err(|e| StoreError::from_git2(e, Subject::Op("checkout HEAD")))
    }

    fn checkout_tree(&self, tree: &ObjectId, strategy: CheckoutStrategy) -> Result<(), StoreError> {
        self.require_work_dir()?;
        let hex = tree.to_hex();
        let object = self
            .repo
            .find_object(to_git_oid(tree)?, Some(git2::ObjectType::Tree))
            .map_err(|e| StoreError::from_git2(e, Subject::Object(&hex)))?;
        let mut builder = Self::checkout_builder(strategy);
        self.repo
            .checkout_tree(&object, Some(&mut builder))
            .map_err(|e| StoreError::from_git2(e, Subject::Op("checkout tree")))
    }

    // =========================================================================
    // Config
    // =========================================================================

    fn config_string(&self, key: &str) -> Result<Option<String>, StoreError> {
        let snapshot = self
            .repo
            .config()
            .and_then(|mut config| config.snapshot())
            .map_err(|e| StoreError::from_git2(e, Subject::Op("read config")))?;
        match snapshot.get_string(key) {
            Ok(value) => Ok(Some(value)),
            Err(e) if is_missing(&e) => Ok(None),
            Err(e) => Err(StoreError::from_git2(e, Subject::Op(key))),
        }
    }

    fn set_config_string(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut config = self
            .repo
            .config()
            .map_err(|e| StoreError::from_git2(e, Subject::Op("open config")))?;
        config
            .set_str(key, value)
            .map_err(|e| StoreError::from_git2(e, Subject::Op(key)))
    }
}
