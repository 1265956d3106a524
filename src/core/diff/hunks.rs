//! core::diff::hunks
//!
//! Grouping of an edit script into unified-diff hunks.

use std::ops::Range;

use super::myers::Edit;
use super::{DiffHunk, DiffLine, LineOrigin};

/// An edit together with the old/new cursor positions in front of it.
#[derive(Debug, Clone, Copy)]
struct Step {
    edit: Edit,
    old_pos: usize,
    new_pos: usize,
}

fn walk(script: &[Edit]) -> Vec<Step> {
    let (mut old_pos, mut new_pos) = (0, 0);
    script
        .iter()
        .map(|&edit| {
            let step = Step {
                edit,
                old_pos,
                new_pos,
            };
            match edit {
                Edit::Equal { .. } => {
                    old_pos += 1;
                    new_pos += 1;
                }
                Edit::Delete { .. } => old_pos += 1,
                Edit::Insert { .. } => new_pos += 1,
            }
            step
        })
        .collect()
}

/// Ranges of script indices covered by each hunk.
///
/// Change runs separated by at most `2 * context` unchanged lines share a
/// hunk; each hunk extends up to `context` unchanged lines on either side.
fn hunk_ranges(script: &[Edit], context: usize) -> Vec<Range<usize>> {
    let mut changes = script
        .iter()
        .enumerate()
        .filter(|(_, e)| e.is_change())
        .map(|(i, _)| i);

    let Some(first) = changes.next() else {
        return Vec::new();
    };

    let mut groups = Vec::new();
    let (mut start, mut end) = (first, first);
    for i in changes {
        if i - end - 1 <= 2 * context {
            end = i;
        } else {
            groups.push((start, end));
            start = i;
            end = i;
        }
    }
    groups.push((start, end));

    groups
        .into_iter()
        .map(|(s, e)| s.saturating_sub(context)..(e + context + 1).min(script.len()))
        .collect()
}

/// 1-based start for a hunk side, where a zero-length side points at the line
/// before the change.
fn side_start(pos: usize, len: usize) -> u32 {
    if len == 0 {
        pos as u32
    } else {
        pos as u32 + 1
    }
}

/// Build hunks and their lines from an edit script.
///
/// `old` and `new` are the raw lines the script indexes into. Context lines
/// carry the old side's text.
pub(crate) fn build(
    script: &[Edit],
    old: &[&[u8]],
    new: &[&[u8]],
    context: usize,
) -> (Vec<DiffHunk>, Vec<DiffLine>) {
    let steps = walk(script);
    let mut hunks = Vec::new();
    let mut lines = Vec::new();

    for range in hunk_ranges(script, context) {
        let steps = &steps[range];
        let Some(head) = steps.first() else {
            continue;
        };

        let old_lines = steps
            .iter()
            .filter(|s| !matches!(s.edit, Edit::Insert { .. }))
            .count();
        let new_lines = steps
            .iter()
            .filter(|s| !matches!(s.edit, Edit::Delete { .. }))
            .count();

        let hunk_index = hunks.len();
        hunks.push(DiffHunk {
            old_start: side_start(head.old_pos, old_lines),
            old_lines: old_lines as u32,
            new_start: side_start(head.new_pos, new_lines),
            new_lines: new_lines as u32,
        });

        for step in steps {
            let (origin, old_lineno, new_lineno, raw) = match step.edit {
                Edit::Equal { old: o, new: n } => {
                    (LineOrigin::Context, Some(o as u32 + 1), Some(n as u32 + 1), old[o])
                }
                Edit::Delete { old: o } => (LineOrigin::Deletion, Some(o as u32 + 1), None, old[o]),
                Edit::Insert { new: n } => (LineOrigin::Addition, None, Some(n as u32 + 1), new[n]),
            };
            lines.push(DiffLine {
                hunk: hunk_index,
                old_lineno,
                new_lineno,
                origin,
                content: String::from_utf8_lossy(raw).into_owned(),
            });
        }
    }

    (hunks, lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::diff::myers::diff;

    fn ranges(old: &[&str], new: &[&str], context: usize) -> Vec<Range<usize>> {
        hunk_ranges(&diff(old, new), context)
    }

    #[test]
    fn no_changes_no_hunks() {
        assert!(ranges(&["a", "b"], &["a", "b"], 3).is_empty());
    }

    #[test]
    fn nearby_changes_merge() {
        let old = ["1", "2", "3", "4", "5", "6", "7", "8"];
        let new = ["1", "X", "3", "4", "5", "6", "Y", "8"];
        // Four unchanged lines between the changes.
        assert_eq!(ranges(&old, &new, 2).len(), 1);
        assert_eq!(ranges(&old, &new, 1).len(), 2);
        assert_eq!(ranges(&old, &new, 0).len(), 2);
    }

    #[test]
    fn context_is_clipped_at_edges() {
        let old = ["a", "b", "c"];
        let new = ["z", "b", "c"];
        let r = ranges(&old, &new, 3);
        assert_eq!(r, vec![0..4]);
    }

    #[test]
    fn zero_length_side_points_before_change() {
        assert_eq!(side_start(0, 0), 0);
        assert_eq!(side_start(1, 0), 1);
        assert_eq!(side_start(1, 2), 2);
    }
}
