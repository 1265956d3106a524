//! Property-based tests for the line diff and the commit-graph algorithms.
//!
//! These tests use proptest to verify invariants hold across
//! randomly generated inputs.

use std::collections::{HashMap, HashSet};

use chrono::{TimeZone, Utc};
use proptest::prelude::*;

use repolens::core::diff::{split_lines, Edit, TextDiff, WhitespaceMode};
use repolens::core::revwalk::{count_reachable, merge_base, CommitGraph, CommitNode, RevWalk};
use repolens::core::types::ObjectId;

/// Strategy for short texts built from a small alphabet, so that lines repeat.
fn text() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(vec!["a", "b", "c", "dd", ""]), 0..20)
        .prop_map(|lines| lines.join("\n"))
}

fn apply(old: &[&[u8]], new: &[&[u8]], edits: &[Edit]) -> (Vec<Vec<u8>>, Vec<Vec<u8>>) {
    let mut kept_old = Vec::new();
    let mut rebuilt = Vec::new();
    for edit in edits {
        match *edit {
            Edit::Equal { old: o, new: n } => {
                kept_old.push(old[o].to_vec());
                rebuilt.push(new[n].to_vec());
            }
            Edit::Delete { old: o } => kept_old.push(old[o].to_vec()),
            Edit::Insert { new: n } => rebuilt.push(new[n].to_vec()),
        }
    }
    (kept_old, rebuilt)
}

/// Length of the longest common subsequence, by dynamic programming.
fn lcs_len(a: &[&[u8]], b: &[&[u8]]) -> usize {
    let mut row = vec![0usize; b.len() + 1];
    for x in a {
        let mut diagonal = 0;
        for (j, y) in b.iter().enumerate() {
            let above = row[j + 1];
            row[j + 1] = if x == y { diagonal + 1 } else { above.max(row[j]) };
            diagonal = above;
        }
    }
    row[b.len()]
}

proptest! {
    /// The edit script has as few changes as any edit script can.
    #[test]
    fn edit_script_is_minimal(old in text(), new in text()) {
        let diff = TextDiff::compute(old.as_bytes(), new.as_bytes(), WhitespaceMode::Exact);
        let old_lines = split_lines(old.as_bytes());
        let new_lines = split_lines(new.as_bytes());
        let changes = diff.edits().iter().filter(|e| e.is_change()).count();

        prop_assert_eq!(
            changes,
            old_lines.len() + new_lines.len() - 2 * lcs_len(&old_lines, &new_lines)
        );
    }

    /// Walking the edit script visits every old line and rebuilds the new text.
    #[test]
    fn edit_script_rebuilds_new_text(old in text(), new in text()) {
        let diff = TextDiff::compute(old.as_bytes(), new.as_bytes(), WhitespaceMode::Exact);
        let old_lines = split_lines(old.as_bytes());
        let new_lines = split_lines(new.as_bytes());

        let (kept_old, rebuilt) = apply(&old_lines, &new_lines, diff.edits());
        prop_assert_eq!(kept_old.concat(), old.as_bytes().to_vec());
        prop_assert_eq!(rebuilt.concat(), new.as_bytes().to_vec());

        for edit in diff.edits() {
            if let Edit::Equal { old: o, new: n } = *edit {
                prop_assert_eq!(old_lines[o], new_lines[n]);
            }
        }
    }

    /// Zero-context hunks account for exactly the added and deleted lines.
    #[test]
    fn hunks_cover_stats(old in text(), new in text()) {
        let diff = TextDiff::compute(old.as_bytes(), new.as_bytes(), WhitespaceMode::Exact);
        let stats = diff.stats();
        let hunks = diff.hunks(0);

        let old_total: u32 = hunks.iter().map(|h| h.old_lines).sum();
        let new_total: u32 = hunks.iter().map(|h| h.new_lines).sum();
        prop_assert_eq!(old_total as usize, stats.deleted);
        prop_assert_eq!(new_total as usize, stats.added);
        prop_assert_eq!(
            split_lines(new.as_bytes()).len() as isize - split_lines(old.as_bytes()).len() as isize,
            stats.added as isize - stats.deleted as isize
        );
    }

    /// A text never differs from itself, in any whitespace mode.
    #[test]
    fn identical_texts_have_no_hunks(old in text()) {
        for mode in [
            WhitespaceMode::Exact,
            WhitespaceMode::IgnoreEol,
            WhitespaceMode::IgnoreChange,
            WhitespaceMode::IgnoreAll,
        ] {
            let diff = TextDiff::compute(old.as_bytes(), old.as_bytes(), mode);
            prop_assert!(diff.hunks(3).is_empty());
        }
    }

    /// Trailing whitespace and CRLF endings vanish under IgnoreEol.
    #[test]
    fn trailing_whitespace_is_ignored(old in text(), pad in prop::sample::select(vec![" ", "\t", " \t", "\r"])) {
        let padded = old.replace('\n', &format!("{pad}\n"));
        let diff = TextDiff::compute(old.as_bytes(), padded.as_bytes(), WhitespaceMode::IgnoreEol);
        prop_assert!(diff.stats().is_empty());
    }
}

// =============================================================================
// Commit graphs
// =============================================================================

#[derive(Debug)]
struct Missing;

/// A random DAG where commit `i` only has parents below `i`.
#[derive(Debug, Clone)]
struct Dag {
    nodes: HashMap<ObjectId, CommitNode>,
    ids: Vec<ObjectId>,
}

fn id(n: usize) -> ObjectId {
    let mut bytes = [0u8; 20];
    bytes[12..].copy_from_slice(&(n as u64 + 1).to_be_bytes());
    ObjectId::from_bytes(&bytes).unwrap()
}

impl Dag {
    fn new(parents: Vec<Vec<usize>>) -> Self {
        let ids: Vec<_> = (0..parents.len()).map(id).collect();
        let nodes = parents
            .into_iter()
            .enumerate()
            .map(|(i, ps)| {
                let node = CommitNode {
                    id: ids[i],
                    parents: ps.into_iter().map(|p| ids[p]).collect(),
                    tree: ObjectId::zero(),
                    // A few equal timestamps exercise the tie-break.
                    time: Utc.timestamp_opt(1_000 + (i / 2) as i64, 0).unwrap(),
                };
                (ids[i], node)
            })
            .collect();
        Self { nodes, ids }
    }

    fn ancestors(&self, root: &ObjectId) -> HashSet<ObjectId> {
        let mut seen = HashSet::new();
        let mut stack = vec![*root];
        while let Some(id) = stack.pop() {
            if seen.insert(id) {
                stack.extend(self.nodes[&id].parents.iter().copied());
            }
        }
        seen
    }
}

impl CommitGraph for Dag {
    type Error = Missing;

    fn commit(&self, id: &ObjectId) -> Result<CommitNode, Missing> {
        self.nodes.get(id).cloned().ok_or(Missing)
    }
}

/// Strategy for a DAG plus two commit indices in it.
fn dag_and_pair() -> impl Strategy<Value = (Dag, usize, usize)> {
    prop::collection::vec((any::<u8>(), any::<u8>(), any::<bool>(), any::<bool>()), 1..16)
        .prop_map(|specs| {
            let parents = specs
                .iter()
                .enumerate()
                .map(|(i, &(a, b, root, merge))| {
                    if i == 0 || (root && i % 5 == 0) {
                        return Vec::new();
                    }
                    let first = a as usize % i;
                    let second = b as usize % i;
                    if merge && second != first {
                        vec![first, second]
                    } else {
                        vec![first]
                    }
                })
                .collect();
            Dag::new(parents)
        })
        .prop_flat_map(|dag| {
            let n = dag.ids.len();
            (Just(dag), 0..n, 0..n)
        })
}

proptest! {
    /// Counting matches set difference of ancestor sets.
    #[test]
    fn count_is_ancestor_difference((dag, a, b) in dag_and_pair()) {
        let (a, b) = (dag.ids[a], dag.ids[b]);
        let expected = dag.ancestors(&a).difference(&dag.ancestors(&b)).count();

        prop_assert_eq!(count_reachable(&dag, &a, &b).unwrap(), expected);
        prop_assert_eq!(count_reachable(&dag, &a, &a).unwrap(), 0);
    }

    /// The merge base is symmetric, common and not an ancestor of another
    /// common ancestor.
    #[test]
    fn merge_base_is_a_best_common_ancestor((dag, a, b) in dag_and_pair()) {
        let (a, b) = (dag.ids[a], dag.ids[b]);
        let forward = merge_base(&dag, &a, &b).unwrap();
        let backward = merge_base(&dag, &b, &a).unwrap();
        prop_assert_eq!(forward, backward);

        let common: HashSet<_> = dag
            .ancestors(&a)
            .intersection(&dag.ancestors(&b))
            .copied()
            .collect();
        match forward {
            None => prop_assert!(common.is_empty()),
            Some(base) => {
                prop_assert!(common.contains(&base));
                for other in common.iter().filter(|c| **c != base) {
                    prop_assert!(!dag.ancestors(other).contains(&base));
                }
            }
        }
        prop_assert_eq!(merge_base(&dag, &a, &a).unwrap(), Some(a));
    }

    /// A walk yields each visible commit once, children before parents.
    #[test]
    fn walk_is_topological((dag, a, b) in dag_and_pair()) {
        let (a, b) = (dag.ids[a], dag.ids[b]);
        let mut walk = RevWalk::new(&dag);
        walk.push(a).hide(b);
        let order: Vec<ObjectId> = walk.map(|node| node.unwrap().id).collect();

        let expected: HashSet<_> = dag
            .ancestors(&a)
            .difference(&dag.ancestors(&b))
            .copied()
            .collect();
        let yielded: HashSet<_> = order.iter().copied().collect();
        prop_assert_eq!(yielded.len(), order.len());
        prop_assert_eq!(yielded, expected);

        let position: HashMap<_, _> = order.iter().enumerate().map(|(i, id)| (*id, i)).collect();
        for id in &order {
            for parent in &dag.nodes[id].parents {
                if let Some(p) = position.get(parent) {
                    prop_assert!(position[id] < *p);
                }
            }
        }
    }
}
