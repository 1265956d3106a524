//! core::revwalk
//!
//! Commit-graph traversal: reachability counting, merge-base selection and a
//! topologically ordered walk.
//!
//! Everything here is written against the [`CommitGraph`] trait, so it can run
//! over the real object store or an in-memory graph in tests.
//!
//! # Merge base
//!
//! The set of common ancestors of `a` and `b` is closed under ancestry, so a
//! common ancestor is redundant exactly when it is the parent of another
//! common ancestor. The remaining best common ancestors are ranked by newest
//! commit time, then smallest id, which makes criss-cross histories resolve
//! the same way on every call.

use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap, HashSet, VecDeque};

use bitflags::bitflags;
use chrono::{DateTime, Utc};

use super::types::ObjectId;

/// A commit as seen by the graph algorithms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitNode {
    pub id: ObjectId,
    pub parents: Vec<ObjectId>,
    pub tree: ObjectId,
    pub time: DateTime<Utc>,
}

/// Read access to commits.
pub trait CommitGraph {
    type Error;

    /// Load a commit by id.
    fn commit(&self, id: &ObjectId) -> Result<CommitNode, Self::Error>;
}

/// Memoizing loader shared by the traversals.
struct NodeCache<'g, G: CommitGraph + ?Sized> {
    graph: &'g G,
    nodes: HashMap<ObjectId, CommitNode>,
}

impl<'g, G: CommitGraph + ?Sized> NodeCache<'g, G> {
    fn new(graph: &'g G) -> Self {
        Self {
            graph,
            nodes: HashMap::new(),
        }
    }

    fn get(&mut self, id: &ObjectId) -> Result<&CommitNode, G::Error> {
        if !self.nodes.contains_key(id) {
            let node = self.graph.commit(id)?;
            self.nodes.insert(*id, node);
        }
        // Inserted above if it was missing.
        Ok(&self.nodes[id])
    }

    /// `root` and everything reachable from it through parent links.
    fn ancestors(&mut self, root: &ObjectId) -> Result<HashSet<ObjectId>, G::Error> {
        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([*root]);
        while let Some(id) = queue.pop_front() {
            if !seen.insert(id) {
                continue;
            }
            let parents = self.get(&id)?.parents.clone();
            queue.extend(parents.into_iter().filter(|p| !seen.contains(p)));
        }
        Ok(seen)
    }
}

/// Number of commits reachable from `from` but not from `exclude`, counted
/// by walking `from` with `exclude` hidden.
///
/// `count_reachable(g, a, a)` is always zero.
pub fn count_reachable<G: CommitGraph + ?Sized>(
    graph: &G,
    from: &ObjectId,
    exclude: &ObjectId,
) -> Result<usize, G::Error> {
    if from == exclude {
        return Ok(0);
    }
    let mut walk = RevWalk::new(graph);
    walk.push(*from).hide(*exclude);

    let mut count = 0;
    for commit in walk {
        commit?;
        count += 1;
    }
    Ok(count)
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    struct Mark: u8 {
        const FROM_A = 0b001;
        const FROM_B = 0b010;
        const COMMON = Self::FROM_A.bits() | Self::FROM_B.bits();
        const REDUNDANT = 0b100;
    }
}

/// Best common ancestor of `a` and `b`, or `None` for unrelated histories.
///
/// Symmetric in its arguments, and `merge_base(g, a, a) == Some(a)`.
pub fn merge_base<G: CommitGraph + ?Sized>(
    graph: &G,
    a: &ObjectId,
    b: &ObjectId,
) -> Result<Option<ObjectId>, G::Error> {
    if a == b {
        graph.commit(a)?;
        return Ok(Some(*a));
    }

    let mut cache = NodeCache::new(graph);
    let mut marks: HashMap<ObjectId, Mark> = HashMap::new();
    for id in cache.ancestors(a)? {
        *marks.entry(id).or_default() |= Mark::FROM_A;
    }
    for id in cache.ancestors(b)? {
        *marks.entry(id).or_default() |= Mark::FROM_B;
    }

    let common: Vec<ObjectId> = marks
        .iter()
        .filter(|(_, m)| m.contains(Mark::COMMON))
        .map(|(id, _)| *id)
        .collect();
    for id in &common {
        let parents = cache.get(id)?.parents.clone();
        for parent in parents {
            if let Some(mark) = marks.get_mut(&parent) {
                *mark |= Mark::REDUNDANT;
            }
        }
    }

    let mut best: Option<(DateTime<Utc>, ObjectId)> = None;
    for id in common {
        if marks[&id].contains(Mark::REDUNDANT) {
            continue;
        }
        let time = cache.get(&id)?.time;
        tracing::trace!(candidate = %id, %time, "best common ancestor candidate");
        let better = match best {
            None => true,
            Some((best_time, best_id)) => {
                time.cmp(&best_time).then_with(|| best_id.cmp(&id)) == Ordering::Greater
            }
        };
        if better {
            best = Some((time, id));
        }
    }

    Ok(best.map(|(_, id)| id))
}

/// Heap key: newest time first, then ascending id.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
struct Ready {
    time: DateTime<Utc>,
    id: Reverse<ObjectId>,
}

/// A lazy, restartable walk over a commit graph.
///
/// Yields each commit reachable from a pushed root and not reachable from a
/// hidden root, exactly once. A commit is never yielded before one of its
/// yielded descendants; among commits that are ready at the same time the
/// newest comes first, then the smallest id.
///
/// # Example
///
/// ```ignore
/// let mut walk = RevWalk::new(&store);
/// walk.push(head);
/// walk.hide(upstream);
/// for commit in walk {
///     println!("{}", commit?.id.short(7));
/// }
/// ```
pub struct RevWalk<'g, G: CommitGraph + ?Sized> {
    cache: NodeCache<'g, G>,
    pushed: Vec<ObjectId>,
    hidden: Vec<ObjectId>,
    state: WalkState,
}

#[derive(Default)]
enum WalkState {
    #[default]
    Idle,
    Running {
        pending: HashMap<ObjectId, usize>,
        ready: BinaryHeap<Ready>,
    },
    Done,
}

impl<'g, G: CommitGraph + ?Sized> RevWalk<'g, G> {
    pub fn new(graph: &'g G) -> Self {
        Self {
            cache: NodeCache::new(graph),
            pushed: Vec::new(),
            hidden: Vec::new(),
            state: WalkState::Idle,
        }
    }

    /// Add a root to walk from.
    pub fn push(&mut self, id: ObjectId) -> &mut Self {
        self.pushed.push(id);
        self.state = WalkState::Idle;
        self
    }

    /// Exclude a root and all of its ancestors.
    pub fn hide(&mut self, id: ObjectId) -> &mut Self {
        self.hidden.push(id);
        self.state = WalkState::Idle;
        self
    }

    /// Clear all roots so the walk can be reused.
    pub fn reset(&mut self) {
        self.pushed.clear();
        self.hidden.clear();
        self.state = WalkState::Idle;
    }

    fn prepare(&mut self) -> Result<WalkState, G::Error> {
        let mut hidden = HashSet::new();
        for root in self.hidden.clone() {
            if !hidden.contains(&root) {
                hidden.extend(self.cache.ancestors(&root)?);
            }
        }

        // Visible commits, and how many visible children each one has.
        let mut pending: HashMap<ObjectId, usize> = HashMap::new();
        let mut queue: VecDeque<ObjectId> = self
            .pushed
            .iter()
            .filter(|id| !hidden.contains(*id))
            .copied()
            .collect();
        let mut visited = HashSet::new();
        while let Some(id) = queue.pop_front() {
            if !visited.insert(id) {
                continue;
            }
            pending.entry(id).or_insert(0);
            let parents = self.cache.get(&id)?.parents.clone();
            for parent in parents {
                if hidden.contains(&parent) {
                    continue;
                }
                *pending.entry(parent).or_insert(0) += 1;
                queue.push_back(parent);
            }
        }

        let mut ready = BinaryHeap::new();
        for (id, children) in &pending {
            if *children == 0 {
                ready.push(Ready {
                    time: self.cache.get(id)?.time,
                    id: Reverse(*id),
                });
            }
        }
        Ok(WalkState::Running { pending, ready })
    }
}

impl<G: CommitGraph + ?Sized> Iterator for RevWalk<'_, G> {
    type Item = Result<CommitNode, G::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if matches!(self.state, WalkState::Idle) {
            match self.prepare() {
                Ok(state) => self.state = state,
                Err(e) => {
                    self.state = WalkState::Done;
                    return Some(Err(e));
                }
            }
        }

        let WalkState::Running { pending, ready } = &mut self.state else {
            return None;
        };
        let Some(Ready { id: Reverse(id), .. }) = ready.pop() else {
            self.state = WalkState::Done;
            return None;
        };

        let node = match self.cache.get(&id) {
            Ok(node) => node.clone(),
            Err(e) => return Some(Err(e)),
        };
        tracing::trace!(commit = %id, "revwalk step");

        for parent in &node.parents {
            let Some(children) = pending.get_mut(parent) else {
                continue;
            };
            *children -= 1;
            if *children == 0 {
                match self.cache.get(parent) {
                    Ok(p) => ready.push(Ready {
                        time: p.time,
                        id: Reverse(*parent),
                    }),
                    Err(e) => return Some(Err(e)),
                }
            }
        }

        Some(Ok(node))
    }
}
