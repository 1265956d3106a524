//! engine
//!
//! The status, diff, revision and checkout operations, written against the
//! [`ObjectStore`](crate::git::ObjectStore) trait.
//!
//! # Architecture
//!
//! The pure algorithms live in [`crate::core`]. The engine resolves store
//! objects, feeds them to those algorithms and shapes the results:
//!
//! - [`status`] - Working-tree classification
//! - [`diff`] - Blob-to-buffer hunks and tree-to-workdir stats
//! - [`revision`] - Commit counts, merge base, ahead/behind
//! - [`checkout`] - HEAD restore and reference checkout with branch creation
//!
//! # Invariants
//!
//! - The engine never imports `git2`; everything goes through the trait
//! - Nothing here holds store state between calls
//!
//! # Example
//!
//! ```ignore
//! use repolens::engine::{diff, status};
//! use repolens::git::Git;
//!
//! let git = Git::open(Path::new("."))?;
//! let map = status::classify(&git, &StatusOptions::default())?;
//! let stats = diff::diff_stats(&git, "README.md")?;
//! ```

pub mod checkout;
pub mod diff;
pub mod revision;
pub mod status;

#[cfg(test)]
pub(crate) mod mock;

pub use checkout::{CheckoutError, CheckoutOutcome};
pub use revision::AheadBehind;
