//! git
//!
//! Single interface to the object store.
//!
//! # Architecture
//!
//! This module is the **ONLY doorway** to libgit2. All repository reads and
//! writes flow through the [`ObjectStore`] trait, implemented here by [`Git`].
//! No other module imports `git2`.
//!
//! # Responsibilities
//!
//! - Repository discovery and opening
//! - HEAD, ref and branch lookups; branch creation and HEAD updates
//! - Commit, tree and blob reads
//! - Index reads and staging
//! - Status, ignore rules, tree-to-workdir change lists
//! - Checkout and git config pass-through
//!
//! # Invariants
//!
//! - libgit2 handles never outlive a single call
//! - The index is re-read from disk by every operation that uses it
//! - All operations return strong types (ObjectId, RefName, BranchName)
//!
//! # Example
//!
//! ```ignore
//! use repolens::git::{Git, ObjectStore};
//! use std::path::Path;
//!
//! let git = Git::open(Path::new("."))?;
//! let head = git.head_commit()?;
//! let names = git.reference_names()?;
//! ```

mod interface;
mod store;

pub(crate) use interface::configure_global_options;
pub use interface::{ErrorCategory, Git, StoreError};
pub use store::{
    ChangeKind, CheckoutStrategy, FileMode, HeadState, IndexEntry, ObjectStore, TreeEntry,
    WorkdirChange,
};
