//! repository
//!
//! The public façade: primitive arguments in, plain results out.
//!
//! # Failure policy
//!
//! Read operations never fail. A store error, a malformed id or a missing
//! object turns into the empty/zero/`None`/`false` result for that operation
//! and is logged at debug level. The two exceptions are [`Repository::add`],
//! which surfaces the store's message, and [`Repository::checkout_reference`],
//! which reports the compound checkout's intermediate state.
//!
//! # Paths
//!
//! Path arguments may be repository-relative or absolute inside the working
//! directory; absolute ones are relativized first.
//!
//! # Example
//!
//! ```no_run
//! use repolens::Repository;
//!
//! let repo = Repository::open(".").unwrap();
//! println!("{:?}", repo.short_head());
//! for (path, flags) in repo.status() {
//!     println!("{} {path}", flags.short_code());
//! }
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::core::diff::{BlobSource, DiffHunk, DiffLine, DiffOptions, DiffStats};
use crate::core::status::{StatusFlags, StatusMap, StatusOptions};
use crate::core::types::{HEADS_PREFIX, REMOTES_PREFIX, TAGS_PREFIX};
use crate::engine::{self, AheadBehind, CheckoutError, CheckoutOutcome};
use crate::git::{FileMode, Git, HeadState, ObjectStore, StoreError};

/// Reference names grouped by namespace, each sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct References {
    pub heads: Vec<String>,
    pub remotes: Vec<String>,
    pub tags: Vec<String>,
}

impl References {
    /// Sort full ref names into namespaces. Other namespaces are dropped.
    pub fn from_names<I: IntoIterator<Item = String>>(names: I) -> Self {
        let mut refs = Self::default();
        for name in names {
            if name.starts_with(HEADS_PREFIX) {
                refs.heads.push(name);
            } else if name.starts_with(REMOTES_PREFIX) {
                refs.remotes.push(name);
            } else if name.starts_with(TAGS_PREFIX) {
                refs.tags.push(name);
            }
        }
        refs.heads.sort();
        refs.remotes.sort();
        refs.tags.sort();
        refs
    }
}

fn degrade<T: Default, E: fmt::Display>(op: &'static str, result: Result<T, E>) -> T {
    result.unwrap_or_else(|err| {
        tracing::debug!(op, error = %err, "operation degraded to default");
        T::default()
    })
}

fn trim_slash(path: &str) -> &str {
    match path.trim_end_matches('/') {
        "" if path.starts_with('/') => "/",
        trimmed => trimmed,
    }
}

/// A repository opened for queries.
///
/// Generic over the store so the façade can run against any
/// [`ObjectStore`]; [`Git`] is the default.
pub struct Repository<S: ObjectStore = Git> {
    store: S,
    /// Working-directory spellings paths are relativized against
    roots: Vec<String>,
}

impl<S: ObjectStore> fmt::Debug for Repository<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repository")
            .field("git_dir", &self.store.git_dir())
            .field("roots", &self.roots)
            .finish()
    }
}

impl Repository<Git> {
    /// Open the repository containing `path`, searching upward.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotARepo`] if no repository is found.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        crate::init();
        let path = path.as_ref();
        Ok(Self::with_opened_path(Git::open(path)?, Some(path)))
    }

    /// Open the repository at exactly `path`, without searching upward.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotARepo`] if `path` is not a repository.
    pub fn open_exact(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        crate::init();
        let path = path.as_ref();
        Ok(Self::with_opened_path(Git::open_exact(path)?, Some(path)))
    }
}

impl<S: ObjectStore> Repository<S> {
    /// Wrap an already-open store.
    pub fn from_store(store: S) -> Self {
        Self::with_opened_path(store, None)
    }

    fn with_opened_path(store: S, opened: Option<&Path>) -> Self {
        let mut roots = Vec::new();
        if let Some(work_dir) = store.work_dir() {
            let real = std::fs::canonicalize(work_dir).ok();
            let mut candidates: Vec<PathBuf> = vec![work_dir.to_path_buf()];
            candidates.extend(real.clone());
            if let Some(opened) = opened {
                if opened.is_absolute() && std::fs::canonicalize(opened).ok() == real {
                    candidates.push(opened.to_path_buf());
                }
            }
            for candidate in candidates {
                if let Some(s) = candidate.to_str() {
                    let root = trim_slash(s).to_string();
                    if !roots.contains(&root) {
                        roots.push(root);
                    }
                }
            }
        }
        Self { store, roots }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    // =========================================================================
    // Paths
    // =========================================================================

    /// Path of the `.git` directory, with a trailing `/`.
    pub fn path(&self) -> String {
        let path = self.store.git_dir().to_string_lossy();
        if path.ends_with('/') {
            path.into_owned()
        } else {
            format!("{path}/")
        }
    }

    /// Working directory, without a trailing `/`. `None` for bare
    /// repositories.
    pub fn working_directory(&self) -> Option<String> {
        self.store
            .work_dir()
            .map(|p| trim_slash(&p.to_string_lossy()).to_string())
    }

    /// Strip the working directory from an absolute path inside it.
    ///
    /// Relative paths and paths outside the working directory come back
    /// unchanged; the working directory itself becomes `""`.
    pub fn relativize(&self, path: &str) -> String {
        if path.is_empty() || !Path::new(path).is_absolute() {
            return path.to_string();
        }
        let candidate = trim_slash(path);
        for root in &self.roots {
            if candidate == root {
                return String::new();
            }
            let prefix = if root.ends_with('/') {
                root.clone()
            } else {
                format!("{root}/")
            };
            if let Some(rest) = path.strip_prefix(&prefix) {
                return rest.to_string();
            }
        }
        path.to_string()
    }

    /// True when `path` names the working directory itself.
    pub fn is_working_directory(&self, path: &str) -> bool {
        !path.is_empty() && self.roots.iter().any(|root| root == trim_slash(path))
    }

    // =========================================================================
    // HEAD and References
    // =========================================================================

    /// Full ref name HEAD points at, or the commit sha when detached.
    pub fn head(&self) -> Option<String> {
        degrade("head", self.store.head()).map(|h| h.describe())
    }

    /// Branch short name, or a 7-character sha when detached.
    pub fn short_head(&self) -> Option<String> {
        degrade("short_head", self.store.head()).map(|h| h.short())
    }

    /// All heads, remotes and tags.
    pub fn references(&self) -> References {
        References::from_names(degrade("references", self.store.reference_names()))
    }

    /// Hex id a ref points at.
    pub fn reference_target(&self, refname: &str) -> Option<String> {
        degrade("reference_target", self.store.reference_target(refname)).map(|id| id.to_hex())
    }

    /// Upstream ref of the branch HEAD is on.
    pub fn upstream_branch(&self) -> Option<String> {
        match degrade("upstream_branch", self.store.head())? {
            HeadState::Branch(name) => {
                degrade("upstream_branch", self.store.upstream_of(&name)).map(|u| u.to_string())
            }
            HeadState::Detached(_) => None,
        }
    }

    // =========================================================================
    // Paths and Config
    // =========================================================================

    pub fn is_ignored(&self, path: &str) -> bool {
        let path = self.relativize(path);
        if path.is_empty() {
            return false;
        }
        degrade("is_ignored", self.store.is_ignored(&path))
    }

    /// True when the index records `path` as a gitlink.
    pub fn is_submodule(&self, path: &str) -> bool {
        let path = self.relativize(path);
        degrade("is_submodule", self.store.index_entry(&path))
            .is_some_and(|entry| entry.mode == FileMode::Commit)
    }

    pub fn config_value(&self, key: &str) -> Option<String> {
        degrade("config_value", self.store.config_string(key))
    }

    pub fn set_config_value(&self, key: &str, value: &str) -> bool {
        self.store
            .set_config_string(key, value)
            .map_err(|err| {
                tracing::debug!(key, error = %err, "config write failed");
            })
            .is_ok()
    }

    // =========================================================================
    // Status
    // =========================================================================

    /// Whole-tree status with the default options.
    pub fn status(&self) -> StatusMap {
        self.status_with(&StatusOptions::default())
    }

    /// Whole-tree status with explicit options.
    pub fn status_with(&self, options: &StatusOptions) -> StatusMap {
        degrade("status", engine::status::classify(&self.store, options))
    }

    pub fn status_for_path(&self, path: &str) -> StatusFlags {
        engine::status::classify_path(&self.store, &self.relativize(path))
    }

    /// Status restricted to git pathspecs. `[""]` matches everything.
    pub fn status_for_paths(&self, pathspecs: &[String]) -> StatusMap {
        let specs: Vec<String> = pathspecs.iter().map(|p| self.relativize(p)).collect();
        degrade("status_for_paths", engine::status::classify_paths(&self.store, &specs))
    }

    // =========================================================================
    // Index
    // =========================================================================

    /// Stage a working-tree file.
    ///
    /// # Errors
    ///
    /// Returns the store error, e.g. [`StoreError::PathNotFound`] for a
    /// missing file.
    pub fn add(&self, path: &str) -> Result<(), StoreError> {
        self.store.add_to_index(&self.relativize(path))
    }

    /// Re-read the index from disk.
    pub fn refresh_index(&self) {
        degrade("refresh_index", self.store.refresh_index());
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Restore HEAD's version of `path`, or of everything when `None`.
    pub fn checkout_head(&self, path: Option<&str>) -> bool {
        let path = path.map(|p| self.relativize(p));
        engine::checkout::checkout_head(&self.store, path.as_deref())
            .map_err(|err| {
                tracing::debug!(error = %err, "checkout head failed");
            })
            .is_ok()
    }

    /// Check out a reference, optionally creating it as a branch at HEAD.
    ///
    /// # Errors
    ///
    /// See [`engine::checkout::checkout_reference`].
    pub fn checkout_reference(
        &self,
        name: &str,
        create_if_missing: bool,
    ) -> Result<CheckoutOutcome, CheckoutError> {
        engine::checkout::checkout_reference(&self.store, name, create_if_missing)
    }

    /// [`Self::checkout_reference`] reduced to success or failure.
    pub fn checkout_reference_ok(&self, name: &str, create_if_missing: bool) -> bool {
        self.checkout_reference(name, create_if_missing)
            .map_err(|err| {
                tracing::debug!(error = %err, "checkout reference failed");
            })
            .is_ok()
    }

    // =========================================================================
    // Blobs and Diffs
    // =========================================================================

    fn blob_text(&self, path: &str, source: BlobSource) -> Option<String> {
        let path = self.relativize(path);
        degrade("blob", engine::diff::stored_blob(&self.store, &path, source))
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Content of `path` in HEAD's tree.
    pub fn head_blob(&self, path: &str) -> Option<String> {
        self.blob_text(path, BlobSource::Head)
    }

    /// Content of `path` in the index.
    pub fn index_blob(&self, path: &str) -> Option<String> {
        self.blob_text(path, BlobSource::Index)
    }

    /// Added/deleted lines between HEAD and the working directory for one
    /// changed path.
    pub fn diff_stats(&self, path: &str) -> DiffStats {
        degrade("diff_stats", engine::diff::diff_stats(&self.store, &self.relativize(path)))
    }

    /// Hunks between the stored blob at `path` and `text`.
    pub fn line_diffs(&self, path: &str, text: &str, options: &DiffOptions) -> Option<Vec<DiffHunk>> {
        let path = self.relativize(path);
        degrade(
            "line_diffs",
            engine::diff::diff_blob_to_text(&self.store, &path, text.as_bytes(), options),
        )
    }

    /// Hunk lines between the stored blob at `path` and `text`.
    pub fn line_diff_details(
        &self,
        path: &str,
        text: &str,
        options: &DiffOptions,
    ) -> Option<Vec<DiffLine>> {
        self.line_diff_hunks_and_lines(path, text, options)
            .map(|(_, lines)| lines)
    }

    /// Hunks and their lines from a single diff of `path` against `text`.
    pub fn line_diff_hunks_and_lines(
        &self,
        path: &str,
        text: &str,
        options: &DiffOptions,
    ) -> Option<(Vec<DiffHunk>, Vec<DiffLine>)> {
        let path = self.relativize(path);
        degrade(
            "line_diff_details",
            engine::diff::diff_blob_to_text_lines(&self.store, &path, text.as_bytes(), options),
        )
    }

    // =========================================================================
    // Revisions
    // =========================================================================

    /// Commits reachable from `from` but not from `exclude` (hex ids).
    pub fn commit_count(&self, from: &str, exclude: &str) -> usize {
        engine::revision::commit_count(&self.store, from, exclude)
    }

    /// Hex id of the best common ancestor.
    pub fn merge_base(&self, a: &str, b: &str) -> Option<String> {
        engine::revision::merge_base(&self.store, a, b).map(|id| id.to_hex())
    }

    /// Ahead/behind counts against the configured upstream. `None` means
    /// HEAD's branch.
    pub fn ahead_behind_count(&self, branch: Option<&str>) -> AheadBehind {
        engine::revision::ahead_behind(&self.store, branch)
    }
}
