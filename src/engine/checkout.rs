//! engine::checkout
//!
//! Checkout of HEAD paths and of references, with optional branch creation.
//!
//! # Reference checkout
//!
//! ```text
//! lookup ref -> peel to tree -> safe checkout -> set HEAD
//!      | failed, create requested
//!      v
//! resolve HEAD commit -> create branch -> (same four steps again)
//! ```
//!
//! If the branch gets created but the second attempt fails, the branch is
//! left in place and HEAD does not move. That state is reported as
//! [`CheckoutError::BranchCreatedCheckoutFailed`] rather than rolled back.

use thiserror::Error;

use crate::core::types::{ObjectId, RefName};
use crate::git::{CheckoutStrategy, ObjectStore, StoreError};

/// A successful reference checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutOutcome {
    /// An existing ref was checked out.
    CheckedOut,
    /// The branch did not exist; it was created at HEAD and checked out.
    CreatedAndCheckedOut {
        /// Full ref name of the new branch
        branch: String,
    },
}

/// Errors from checkout operations.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Checkout failed and nothing was created.
    #[error("checkout of '{refname}' failed: {reason}")]
    Failed {
        /// The ref that was being checked out
        refname: String,
        /// Why it failed
        reason: String,
    },

    /// The branch to create has a malformed name. Nothing was created.
    #[error("invalid branch name: {0}")]
    InvalidBranchName(String),

    /// The branch was created but checking it out failed. HEAD did not move.
    #[error("created branch '{branch}' but could not check it out: {reason}")]
    BranchCreatedCheckoutFailed {
        /// Full ref name of the created branch
        branch: String,
        /// Why the checkout failed
        reason: String,
    },
}

/// Restore HEAD's version of one path, or of the whole tree when `None`.
///
/// Local modifications are overwritten. The path is matched literally.
///
/// # Errors
///
/// Returns [`CheckoutError::Failed`] if the store rejects the checkout.
#[tracing::instrument(level = "debug", skip(store))]
pub fn checkout_head<S: ObjectStore + ?Sized>(
    store: &S,
    path: Option<&str>,
) -> Result<(), CheckoutError> {
    store
        .checkout_head(path, CheckoutStrategy::Force)
        .map_err(|err| CheckoutError::Failed {
            refname: "HEAD".to_string(),
            reason: err.to_string(),
        })
}

/// Look up, peel, safely check out and move HEAD to `refname`.
fn switch_to<S: ObjectStore + ?Sized>(store: &S, refname: &RefName) -> Result<(), StoreError> {
    let tree = store.peel_to_tree(refname)?;
    store.checkout_tree(&tree, CheckoutStrategy::Safe)?;
    store.set_head(refname)
}

fn head_commit<S: ObjectStore + ?Sized>(store: &S) -> Result<ObjectId, String> {
    match store.head_commit() {
        Ok(Some(id)) => Ok(id),
        Ok(None) => Err("HEAD does not point at a commit".to_string()),
        Err(err) => Err(err.to_string()),
    }
}

/// Check out a reference, creating it as a branch at HEAD if requested.
///
/// Short names are normalized to `refs/heads/<name>`. A safe checkout is
/// used, so local modifications that would be overwritten abort the switch.
///
/// # Errors
///
/// - [`CheckoutError::InvalidBranchName`] if creation was requested for a
///   malformed name
/// - [`CheckoutError::Failed`] if the checkout failed and nothing was created
/// - [`CheckoutError::BranchCreatedCheckoutFailed`] if the new branch exists
///   but could not be checked out
#[tracing::instrument(level = "debug", skip(store))]
pub fn checkout_reference<S: ObjectStore + ?Sized>(
    store: &S,
    name: &str,
    create_if_missing: bool,
) -> Result<CheckoutOutcome, CheckoutError> {
    let refname = match RefName::normalize_branch(name) {
        Ok(refname) => refname,
        Err(err) if create_if_missing => {
            return Err(CheckoutError::InvalidBranchName(err.to_string()))
        }
        Err(err) => {
            return Err(CheckoutError::Failed {
                refname: name.to_string(),
                reason: err.to_string(),
            })
        }
    };

    let first_error = match switch_to(store, &refname) {
        Ok(()) => return Ok(CheckoutOutcome::CheckedOut),
        Err(err) => err,
    };

    if !create_if_missing {
        return Err(CheckoutError::Failed {
            refname: refname.to_string(),
            reason: first_error.to_string(),
        });
    }
    tracing::debug!(%refname, error = %first_error, "checkout failed, creating branch");

    let branch = refname
        .branch_name()
        .map_err(|err| CheckoutError::InvalidBranchName(err.to_string()))?;
    let target = head_commit(store).map_err(|reason| CheckoutError::Failed {
        refname: refname.to_string(),
        reason,
    })?;
    let created = store
        .create_branch(&branch, &target)
        .map_err(|err| CheckoutError::Failed {
            refname: refname.to_string(),
            reason: format!("{first_error}; creating branch failed: {err}"),
        })?;

    match switch_to(store, &created) {
        Ok(()) => Ok(CheckoutOutcome::CreatedAndCheckedOut {
            branch: created.to_string(),
        }),
        Err(err) => {
            tracing::debug!(branch = %created, error = %err, "created branch but checkout failed");
            Err(CheckoutError::BranchCreatedCheckoutFailed {
                branch: created.to_string(),
                reason: err.to_string(),
            })
        }
    }
}
