//! engine::revision
//!
//! Ancestry queries over hex ids and ref names.
//!
//! Every query here degrades instead of failing: a malformed id or a store
//! error gives zero or `None`, logged at debug level. Malformed ids never
//! reach the store.

use serde::Serialize;

use crate::core::revwalk;
use crate::core::types::{ObjectId, RefName};
use crate::git::{HeadState, ObjectStore};

/// Commits a branch has that its upstream lacks, and the reverse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AheadBehind {
    pub ahead: usize,
    pub behind: usize,
}

fn parse(hex: &str) -> Option<ObjectId> {
    match ObjectId::parse(hex) {
        Ok(id) => Some(id),
        Err(err) => {
            tracing::debug!(id = hex, error = %err, "malformed object id");
            None
        }
    }
}

/// Commits reachable from `from` but not from `exclude`.
#[tracing::instrument(level = "debug", skip(store))]
pub fn commit_count<S: ObjectStore + ?Sized>(store: &S, from: &str, exclude: &str) -> usize {
    let (Some(from), Some(exclude)) = (parse(from), parse(exclude)) else {
        return 0;
    };
    revwalk::count_reachable(store, &from, &exclude).unwrap_or_else(|err| {
        tracing::debug!(error = %err, "commit count failed");
        0
    })
}

/// Best common ancestor of two commits.
#[tracing::instrument(level = "debug", skip(store))]
pub fn merge_base<S: ObjectStore + ?Sized>(store: &S, a: &str, b: &str) -> Option<ObjectId> {
    let (a, b) = (parse(a)?, parse(b)?);
    revwalk::merge_base(store, &a, &b).unwrap_or_else(|err| {
        tracing::debug!(error = %err, "merge base failed");
        None
    })
}

/// Local branch ref for `branch`, or HEAD's branch when `None`.
fn branch_ref<S: ObjectStore + ?Sized>(store: &S, branch: Option<&str>) -> Option<RefName> {
    match branch {
        None => match store.head() {
            Ok(Some(HeadState::Branch(name))) => Some(name),
            Ok(_) => None,
            Err(err) => {
                tracing::debug!(error = %err, "cannot read HEAD");
                None
            }
        },
        Some("") => None,
        Some(name) => RefName::normalize_branch(name)
            .map_err(|err| {
                tracing::debug!(branch = name, error = %err, "invalid branch name");
            })
            .ok(),
    }
}

/// Ahead/behind counts of a branch relative to its configured upstream.
///
/// Short names are normalized to `refs/heads/<name>`. `None` means the
/// branch HEAD is on. Anything unresolvable gives `{0, 0}`.
#[tracing::instrument(level = "debug", skip(store))]
pub fn ahead_behind<S: ObjectStore + ?Sized>(store: &S, branch: Option<&str>) -> AheadBehind {
    let Some(local_ref) = branch_ref(store, branch) else {
        return AheadBehind::default();
    };

    let resolved = (|| {
        let local = store.resolve_ref(local_ref.as_str())?;
        let upstream_ref = store.upstream_of(&local_ref)?;
        let upstream = match &upstream_ref {
            Some(name) => store.resolve_ref(name.as_str())?,
            None => None,
        };
        Ok::<_, crate::git::StoreError>(local.zip(upstream))
    })();

    let (local, upstream) = match resolved {
        Ok(Some(pair)) => pair,
        Ok(None) => {
            tracing::debug!(branch = %local_ref, "branch or upstream does not resolve");
            return AheadBehind::default();
        }
        Err(err) => {
            tracing::debug!(branch = %local_ref, error = %err, "upstream lookup failed");
            return AheadBehind::default();
        }
    };

    let count = |from: &ObjectId, exclude: &ObjectId| {
        revwalk::count_reachable(store, from, exclude).unwrap_or_else(|err| {
            tracing::debug!(error = %err, "ahead/behind count failed");
            0
        })
    };

    AheadBehind {
        ahead: count(&local, &upstream),
        behind: count(&upstream, &local),
    }
}
