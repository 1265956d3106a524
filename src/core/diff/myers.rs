//! core::diff::myers
//!
//! Myers' O(ND) shortest edit script, in linear space.
//!
//! Each box of the edit graph is trimmed of its common prefix and suffix,
//! then split on the middle snake found by searching from both corners at
//! once. Only two frontier vectors are kept, so memory stays proportional to
//! the input size however many lines differ.

use std::ops::{Index, IndexMut, Range};

/// One step of an edit script, as indices into the old and new sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edit {
    /// `old[old] == new[new]`
    Equal { old: usize, new: usize },
    /// `old[old]` is removed
    Delete { old: usize },
    /// `new[new]` is inserted
    Insert { new: usize },
}

impl Edit {
    pub fn is_change(&self) -> bool {
        !matches!(self, Edit::Equal { .. })
    }
}

/// Compute a shortest edit script turning `old` into `new`.
///
/// Within each run of consecutive changes, deletions come before insertions.
///
/// # Example
///
/// ```
/// use repolens::core::diff::myers::{diff, Edit};
///
/// let script = diff(&["a", "b", "c"], &["a", "x", "c"]);
/// assert_eq!(
///     script,
///     vec![
///         Edit::Equal { old: 0, new: 0 },
///         Edit::Delete { old: 1 },
///         Edit::Insert { new: 1 },
///         Edit::Equal { old: 2, new: 2 },
///     ]
/// );
/// ```
pub fn diff<T: PartialEq>(old: &[T], new: &[T]) -> Vec<Edit> {
    let max = max_d(old.len(), new.len());
    let mut myers = Myers {
        old,
        new,
        forward: Frontier::new(max),
        backward: Frontier::new(max),
        script: Vec::with_capacity(old.len().max(new.len())),
    };
    myers.conquer(0..old.len(), 0..new.len());

    let mut script = myers.script;
    deletions_first(&mut script);
    script
}

/// Reorder each maximal run of changes so its deletions precede its insertions.
fn deletions_first(script: &mut [Edit]) {
    let mut start = 0;
    while start < script.len() {
        if !script[start].is_change() {
            start += 1;
            continue;
        }
        let end = script[start..]
            .iter()
            .position(|e| !e.is_change())
            .map_or(script.len(), |n| start + n);
        // Stable: relative order of deletes and of inserts is preserved.
        script[start..end].sort_by_key(|e| matches!(e, Edit::Insert { .. }));
        start = end;
    }
}

fn common_prefix<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

fn common_suffix<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    a.iter()
        .rev()
        .zip(b.iter().rev())
        .take_while(|(x, y)| x == y)
        .count()
}

/// Upper bound on the rounds needed to find the middle snake of an
/// `n` by `m` edit graph.
fn max_d(n: usize, m: usize) -> usize {
    (n + m + 1) / 2 + 1
}

/// Furthest-reaching x per diagonal `k`, for `k` in `-max - 1..=max + 1`.
struct Frontier {
    offset: isize,
    v: Vec<usize>,
}

impl Frontier {
    fn new(max: usize) -> Self {
        Self {
            offset: max as isize + 1,
            v: vec![0; 2 * max + 3],
        }
    }
}

impl Index<isize> for Frontier {
    type Output = usize;

    fn index(&self, k: isize) -> &usize {
        &self.v[(k + self.offset) as usize]
    }
}

impl IndexMut<isize> for Frontier {
    fn index_mut(&mut self, k: isize) -> &mut usize {
        &mut self.v[(k + self.offset) as usize]
    }
}

/// Linear-space Myers: split on the middle snake and recurse on both halves.
///
/// Memory is `O(N + M)` for the two frontiers plus the output script.
struct Myers<'d, T> {
    old: &'d [T],
    new: &'d [T],
    forward: Frontier,
    backward: Frontier,
    script: Vec<Edit>,
}

impl<T: PartialEq> Myers<'_, T> {
    fn equal(&mut self, old: usize, new: usize, len: usize) {
        self.script
            .extend((0..len).map(|i| Edit::Equal { old: old + i, new: new + i }));
    }

    fn replace(&mut self, old: Range<usize>, new: Range<usize>) {
        self.script.extend(old.map(|o| Edit::Delete { old: o }));
        self.script.extend(new.map(|n| Edit::Insert { new: n }));
    }

    fn conquer(&mut self, mut old: Range<usize>, mut new: Range<usize>) {
        let (old_seq, new_seq) = (self.old, self.new);

        let prefix = common_prefix(&old_seq[old.clone()], &new_seq[new.clone()]);
        self.equal(old.start, new.start, prefix);
        old.start += prefix;
        new.start += prefix;

        let suffix = common_suffix(&old_seq[old.clone()], &new_seq[new.clone()]);
        old.end -= suffix;
        new.end -= suffix;
        let tail = (old.end, new.end);

        if old.is_empty() || new.is_empty() {
            self.replace(old, new);
        } else {
            match self.middle_snake(old.clone(), new.clone()) {
                // A split at either corner would not shrink the problem.
                Some((x, y))
                    if (x, y) != (old.start, new.start) && (x, y) != (old.end, new.end) =>
                {
                    self.conquer(old.start..x, new.start..y);
                    self.conquer(x..old.end, y..new.end);
                }
                _ => self.replace(old, new),
            }
        }

        self.equal(tail.0, tail.1, suffix);
    }

    /// Start of the middle snake of an optimal path through the box, in
    /// absolute coordinates.
    ///
    /// Both ends of the box are known to differ.
    fn middle_snake(&mut self, old: Range<usize>, new: Range<usize>) -> Option<(usize, usize)> {
        let (old_seq, new_seq) = (self.old, self.new);
        let a = &old_seq[old.clone()];
        let b = &new_seq[new.clone()];
        let (n, m) = (a.len(), b.len());
        let delta = n as isize - m as isize;
        let odd = delta & 1 == 1;
        let (forward, backward) = (&mut self.forward, &mut self.backward);

        forward[1] = 0;
        backward[1] = 0;

        for d in 0..max_d(n, m) as isize {
            for k in (-d..=d).rev().step_by(2) {
                let mut x = if k == -d || (k != d && forward[k - 1] < forward[k + 1]) {
                    forward[k + 1]
                } else {
                    forward[k - 1] + 1
                };
                let y = (x as isize - k) as usize;
                let start = (x, y);
                if x < n && y < m {
                    x += common_prefix(&a[x..], &b[y..]);
                }
                forward[k] = x;

                if odd && (k - delta).abs() <= d - 1 && forward[k] + backward[delta - k] >= n {
                    let (x0, y0) = (start.0.min(n), start.1.min(m));
                    return Some((old.start + x0, new.start + y0));
                }
            }

            for k in (-d..=d).rev().step_by(2) {
                let mut x = if k == -d || (k != d && backward[k - 1] < backward[k + 1]) {
                    backward[k + 1]
                } else {
                    backward[k - 1] + 1
                };
                let mut y = (x as isize - k) as usize;
                if x < n && y < m {
                    let run = common_suffix(&a[..n - x], &b[..m - y]);
                    x += run;
                    y += run;
                }
                backward[k] = x;

                if !odd && (k - delta).abs() <= d && backward[k] + forward[delta - k] >= n {
                    return Some((old.start + n.saturating_sub(x), new.start + m.saturating_sub(y)));
                }
            }
        }

        None
    }
}
