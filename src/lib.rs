//! repolens - status, diff and revision queries over a git repository
//!
//! repolens wraps a repository's object store and working tree behind a small
//! set of query and mutation operations: working-tree status, blob-to-buffer
//! and tree-to-workdir diffs, commit counts and merge bases, reference
//! listing, and checkout with optional branch creation.
//!
//! # Architecture
//!
//! The codebase follows a strict layered architecture:
//!
//! - [`cli`] - Command-line interface for the `rlens` binary
//! - [`repository`] - Public façade taking primitive arguments
//! - [`engine`] - Status, diff, revision and checkout operations
//! - [`core`] - Domain types, configuration and the pure algorithms
//! - [`git`] - Single interface to the object store (libgit2)
//! - [`ui`] - Output formatting
//! - [`logging`] - Tracing subscriber setup for the binary
//!
//! # Invariants
//!
//! 1. Only [`git`] talks to libgit2
//! 2. Read operations on [`Repository`] never fail; they degrade to defaults
//! 3. Diff, status and ancestry results are deterministic for the same inputs

use std::sync::OnceLock;

pub mod cli;
pub mod core;
pub mod engine;
pub mod git;
pub mod logging;
pub mod repository;
pub mod ui;

pub use repository::{References, Repository};

static INIT: OnceLock<()> = OnceLock::new();

/// Process-wide one-time setup of the object-store library.
///
/// Idempotent and thread-safe. [`Repository::open`] calls it, so explicit
/// calls are only needed when using [`git::Git`] directly.
pub fn init() {
    INIT.get_or_init(git::configure_global_options);
}
