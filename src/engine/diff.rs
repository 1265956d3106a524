//! engine::diff
//!
//! Resolves the stored side of a diff and hands both texts to
//! [`crate::core::diff`].
//!
//! # Sources
//!
//! - Buffer diffs compare an in-memory text against a path's blob in HEAD's
//!   tree, or in the index when [`BlobSource::Index`] is requested.
//! - Tree-to-workdir stats come from the store's own tree-to-workdir patch,
//!   so line-ending and attribute filters apply to the working-tree side.

use crate::core::diff::{
    BlobSource, DiffHunk, DiffLine, DiffOptions, DiffStats, TextDiff,
};
use crate::core::types::ObjectId;
use crate::git::{FileMode, ObjectStore, StoreError};

/// Content of `path` in the chosen source, or `None` if it has no blob there.
///
/// # Errors
///
/// Returns the store error if HEAD, the tree or the blob cannot be read.
pub fn stored_blob<S: ObjectStore + ?Sized>(
    store: &S,
    path: &str,
    source: BlobSource,
) -> Result<Option<Vec<u8>>, StoreError> {
    let entry = match source {
        BlobSource::Head => {
            let Some(head) = store.head_commit()? else {
                return Ok(None);
            };
            let tree = store.commit(&head)?.tree;
            store.tree_entry(&tree, path)?.map(|e| (e.id, e.mode))
        }
        BlobSource::Index => store.index_entry(path)?.map(|e| (e.id, e.mode)),
    };

    match entry {
        Some((id, mode)) if has_content(mode) => Ok(Some(store.blob(&id)?)),
        _ => Ok(None),
    }
}

fn has_content(mode: FileMode) -> bool {
    mode.is_blob() || mode == FileMode::Link
}

/// Hunks between the stored blob at `path` and `text`.
///
/// Returns `None` when the path has no stored blob. Binary content on either
/// side gives an empty hunk list.
///
/// # Errors
///
/// Returns the store error if the stored blob cannot be read.
#[tracing::instrument(level = "debug", skip(store, text), fields(text_len = text.len()))]
pub fn diff_blob_to_text<S: ObjectStore + ?Sized>(
    store: &S,
    path: &str,
    text: &[u8],
    options: &DiffOptions,
) -> Result<Option<Vec<DiffHunk>>, StoreError> {
    let Some(old) = stored_blob(store, path, options.source)? else {
        tracing::debug!(path, source = ?options.source, "no stored blob");
        return Ok(None);
    };
    let diff = TextDiff::compute(&old, text, options.whitespace);
    Ok(Some(diff.hunks(options.context_lines)))
}

/// Like [`diff_blob_to_text`], but also returns every line belonging to a
/// hunk, context lines included. Both come from one diff.
///
/// # Errors
///
/// Returns the store error if the stored blob cannot be read.
#[tracing::instrument(level = "debug", skip(store, text), fields(text_len = text.len()))]
pub fn diff_blob_to_text_lines<S: ObjectStore + ?Sized>(
    store: &S,
    path: &str,
    text: &[u8],
    options: &DiffOptions,
) -> Result<Option<(Vec<DiffHunk>, Vec<DiffLine>)>, StoreError> {
    let Some(old) = stored_blob(store, path, options.source)? else {
        tracing::debug!(path, source = ?options.source, "no stored blob");
        return Ok(None);
    };
    let diff = TextDiff::compute(&old, text, options.whitespace);
    Ok(Some(diff.hunks_and_lines(options.context_lines)))
}

/// True when `path` is selected by a literal filter: the same path, or a
/// path under the filter directory. An empty filter selects everything.
fn filter_matches(filter: &str, path: &str) -> bool {
    let filter = filter.trim_end_matches('/');
    if filter.is_empty() {
        return true;
    }
    match path.strip_prefix(filter) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Added and deleted line counts between `tree` and the working directory.
///
/// Only tracked paths count. When the filter does not select exactly one
/// changed path, the result is `{0, 0}`.
///
/// # Errors
///
/// Returns the store error if the change list or the patch for the selected
/// path cannot be built.
#[tracing::instrument(level = "debug", skip(store))]
pub fn diff_tree_to_workdir<S: ObjectStore + ?Sized>(
    store: &S,
    tree: &ObjectId,
    path_filter: &str,
) -> Result<DiffStats, StoreError> {
    let changes: Vec<_> = store
        .workdir_changes(tree)?
        .into_iter()
        .filter(|change| filter_matches(path_filter, &change.path))
        .collect();

    let [change] = changes.as_slice() else {
        tracing::debug!(matched = changes.len(), "filter did not select exactly one change");
        return Ok(DiffStats::default());
    };

    store.workdir_line_stats(tree, &change.path)
}

/// [`diff_tree_to_workdir`] against HEAD's tree. No HEAD gives `{0, 0}`.
///
/// # Errors
///
/// Returns the store error if HEAD's commit or the change list cannot be
/// read.
#[tracing::instrument(level = "debug", skip(store))]
pub fn diff_stats<S: ObjectStore + ?Sized>(store: &S, path: &str) -> Result<DiffStats, StoreError> {
    let Some(head) = store.head_commit()? else {
        return Ok(DiffStats::default());
    };
    let tree = store.commit(&head)?.tree;
    diff_tree_to_workdir(store, &tree, path)
}
