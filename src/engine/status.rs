//! engine::status
//!
//! Working-tree status classification.
//!
//! Whole-tree runs go through [`classify`]; a single path goes through
//! [`classify_path`], which never fails and reports the empty set instead.

use crate::core::status::{StatusFlags, StatusMap, StatusOptions};
use crate::git::{ObjectStore, StoreError};

/// Classify every path in the working tree.
///
/// Ignored files are reported only when `options.include_ignored` is set.
///
/// # Errors
///
/// Returns the store error if the status run itself fails.
#[tracing::instrument(level = "debug", skip(store))]
pub fn classify<S: ObjectStore + ?Sized>(
    store: &S,
    options: &StatusOptions,
) -> Result<StatusMap, StoreError> {
    if store.work_dir().is_none() {
        return Err(StoreError::BareRepo);
    }

    let map: StatusMap = store
        .statuses(options)?
        .into_iter()
        .filter(|(_, flags)| options.include_ignored || !flags.contains(StatusFlags::IGNORED))
        .collect();

    tracing::debug!(entries = map.len(), "classified working tree");
    Ok(map)
}

/// Status of a single repository-relative path.
///
/// Any failure, including a path outside the working tree, yields the empty
/// set.
#[tracing::instrument(level = "debug", skip(store))]
pub fn classify_path<S: ObjectStore + ?Sized>(store: &S, path: &str) -> StatusFlags {
    if store.work_dir().is_none() || path.is_empty() || is_outside(path) {
        return StatusFlags::empty();
    }

    match store.status_file(path) {
        Ok(flags) => flags,
        Err(err) => {
            tracing::debug!(path, error = %err, "status lookup failed");
            StatusFlags::empty()
        }
    }
}

/// Whole-tree classification restricted to git pathspec patterns.
///
/// An empty list yields an empty map without consulting the store. A list
/// containing `""` matches every path.
///
/// # Errors
///
/// Returns the store error if the status run fails.
#[tracing::instrument(level = "debug", skip(store))]
pub fn classify_paths<S: ObjectStore + ?Sized>(
    store: &S,
    pathspecs: &[String],
) -> Result<StatusMap, StoreError> {
    if pathspecs.is_empty() {
        return Ok(StatusMap::new());
    }

    let options = if pathspecs.iter().any(String::is_empty) {
        StatusOptions::default()
    } else {
        StatusOptions::default().with_pathspecs(pathspecs.iter().cloned())
    };
    classify(store, &options)
}

/// Absolute paths and `..` escapes are not repository-relative.
fn is_outside(path: &str) -> bool {
    path.starts_with('/') || path.split('/').any(|component| component == "..")
}
