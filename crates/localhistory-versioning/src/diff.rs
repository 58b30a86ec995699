// Copyright (C) 2026  winnyboy5
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.
//! Minimal line diff
//!
//! Computes the longest common subsequence of two token sequences with the
//! Myers O(ND) algorithm and reports the gaps between matched tokens as a
//! chain of [`Hunk`]s.
//!
//! Before the search the common prefix and suffix are trimmed and tokens that
//! occur on one side only are set aside: they can never be part of the
//! common subsequence, so dropping them shortens the search without
//! changing its result. The search gives up with [`DiffError::TooLarge`]
//! once the edit distance exceeds the caller's bound.

use crate::error::{DiffError, DiffResult};
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use tracing::trace;

/// Default bound on the edit distance explored by [`diff`]
pub const DEFAULT_MAX_EDIT_COST: usize = 2048;

/// One maximal changed region
///
/// `deleted` tokens starting at `line0` in the first sequence are replaced by
/// `inserted` tokens starting at `line1` in the second. Hunks are chained in
/// increasing offset order.
pub struct Hunk {
    /// Start offset in the first sequence
    pub line0: usize,
    /// Tokens removed from the first sequence
    pub deleted: usize,
    /// Start offset in the second sequence
    pub line1: usize,
    /// Tokens added from the second sequence
    pub inserted: usize,
    /// Following hunk
    pub next: Option<Box<Hunk>>,
}

impl Hunk {
    /// Single hunk without successor
    pub fn new(line0: usize, deleted: usize, line1: usize, inserted: usize) -> Self {
        Hunk {
            line0,
            deleted,
            line1,
            inserted,
            next: None,
        }
    }

    /// Walk this hunk and its successors
    pub fn iter(&self) -> HunkIter<'_> {
        HunkIter { next: Some(self) }
    }

    /// Number of hunks in the chain starting here
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Always false: a chain holds at least this hunk
    pub fn is_empty(&self) -> bool {
        false
    }

    fn spans(&self) -> Vec<(usize, usize, usize, usize)> {
        self.iter()
            .map(|h| (h.line0, h.deleted, h.line1, h.inserted))
            .collect()
    }

    /// Link spans back to front into a chain
    fn chain(spans: &[(usize, usize, usize, usize)]) -> Option<Box<Hunk>> {
        let mut head = None;
        for &(line0, deleted, line1, inserted) in spans.iter().rev() {
            head = Some(Box::new(Hunk {
                next: head,
                ..Hunk::new(line0, deleted, line1, inserted)
            }));
        }
        head
    }
}

// Chains can be long; the derived impls would recurse once per hunk.
impl Drop for Hunk {
    fn drop(&mut self) {
        let mut next = self.next.take();
        while let Some(mut hunk) = next {
            next = hunk.next.take();
        }
    }
}

impl Clone for Hunk {
    fn clone(&self) -> Self {
        let spans = self.spans();
        let mut head = Hunk::new(self.line0, self.deleted, self.line1, self.inserted);
        head.next = Hunk::chain(&spans[1..]);
        head
    }
}

impl PartialEq for Hunk {
    fn eq(&self, other: &Self) -> bool {
        self.iter()
            .map(|h| (h.line0, h.deleted, h.line1, h.inserted))
            .eq(other.iter().map(|h| (h.line0, h.deleted, h.line1, h.inserted)))
    }
}

impl Eq for Hunk {}

impl fmt::Debug for Hunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter().map(HunkSpan)).finish()
    }
}

struct HunkSpan<'a>(&'a Hunk);

impl fmt::Debug for HunkSpan<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let h = self.0;
        write!(f, "-{},{} +{},{}", h.line0, h.deleted, h.line1, h.inserted)
    }
}

/// Iterator over a hunk chain
pub struct HunkIter<'a> {
    next: Option<&'a Hunk>,
}

impl<'a> Iterator for HunkIter<'a> {
    type Item = &'a Hunk;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.next.as_deref();
        Some(current)
    }
}

/// Compute the minimal edit script turning `before` into `after`
///
/// Returns `Ok(None)` when the sequences are equal.
pub fn diff<T: Eq + Hash>(
    before: &[T],
    after: &[T],
    max_edit_cost: usize,
) -> DiffResult<Option<Box<Hunk>>> {
    let prefix = before
        .iter()
        .zip(after)
        .take_while(|(a, b)| a == b)
        .count();
    let suffix = before[prefix..]
        .iter()
        .rev()
        .zip(after[prefix..].iter().rev())
        .take_while(|(a, b)| a == b)
        .count();
    let a = &before[prefix..before.len() - suffix];
    let b = &after[prefix..after.len() - suffix];

    if a.is_empty() && b.is_empty() {
        return Ok(None);
    }

    let matches = if a.is_empty() || b.is_empty() {
        Vec::new()
    } else {
        let (a_tokens, a_origin, b_tokens, b_origin) = reindex(a, b);
        myers(&a_tokens, &b_tokens, max_edit_cost)?
            .into_iter()
            .map(|(x, y)| (a_origin[x], b_origin[y]))
            .collect()
    };

    let spans = gaps(&matches, a.len(), b.len(), prefix);
    trace!(hunks = spans.len(), prefix, suffix, "Computed diff");
    Ok(Hunk::chain(&spans))
}

/// Rebuild the second sequence from the first and a hunk chain
pub fn apply_hunks<T: Clone>(before: &[T], after: &[T], hunks: Option<&Hunk>) -> Vec<T> {
    let mut out = Vec::with_capacity(after.len());
    let mut cursor = 0;
    for hunk in hunks.into_iter().flat_map(Hunk::iter) {
        out.extend_from_slice(&before[cursor..hunk.line0]);
        out.extend_from_slice(&after[hunk.line1..hunk.line1 + hunk.inserted]);
        cursor = hunk.line0 + hunk.deleted;
    }
    out.extend_from_slice(&before[cursor..]);
    out
}

type Reindexed = (Vec<u32>, Vec<usize>, Vec<u32>, Vec<usize>);

/// Map tokens to integers, keeping only tokens present on both sides
///
/// Returns the filtered token ids of each side with their original offsets.
fn reindex<T: Eq + Hash>(a: &[T], b: &[T]) -> Reindexed {
    let mut ids: HashMap<&T, u32> = HashMap::with_capacity(a.len());
    let a_ids: Vec<u32> = a
        .iter()
        .map(|token| {
            let next = ids.len() as u32;
            *ids.entry(token).or_insert(next)
        })
        .collect();

    let mut shared = vec![false; ids.len()];
    let b_ids: Vec<Option<u32>> = b.iter().map(|token| ids.get(token).copied()).collect();
    for id in b_ids.iter().flatten() {
        shared[*id as usize] = true;
    }

    let (a_tokens, a_origin) = a_ids
        .iter()
        .enumerate()
        .filter(|(_, id)| shared[**id as usize])
        .map(|(offset, id)| (*id, offset))
        .unzip();
    let (b_tokens, b_origin) = b_ids
        .iter()
        .enumerate()
        .filter_map(|(offset, id)| id.map(|id| (id, offset)))
        .unzip();
    (a_tokens, a_origin, b_tokens, b_origin)
}

/// Matched index pairs of a longest common subsequence, in increasing order
fn myers(a: &[u32], b: &[u32], max_edit_cost: usize) -> DiffResult<Vec<(usize, usize)>> {
    let n = a.len() as isize;
    let m = b.len() as isize;
    if n == 0 || m == 0 {
        return Ok(Vec::new());
    }
    let limit = max_edit_cost.min(a.len() + b.len()) as isize;
    let offset = limit + 1;
    let mut v = vec![0isize; 2 * limit as usize + 3];
    // One window of `v` per step: entries for diagonals -d..=d before step d.
    let mut trace: Vec<Vec<isize>> = Vec::new();

    for d in 0..=limit {
        trace.push(v[(offset - d) as usize..=(offset + d) as usize].to_vec());
        let mut k = -d;
        while k <= d {
            let at = (offset + k) as usize;
            let mut x = if k == -d || (k != d && v[at - 1] < v[at + 1]) {
                v[at + 1]
            } else {
                v[at - 1] + 1
            };
            let mut y = x - k;
            while x < n && y < m && a[x as usize] == b[y as usize] {
                x += 1;
                y += 1;
            }
            v[at] = x;
            if x >= n && y >= m {
                return Ok(backtrack(&trace, d, n, m));
            }
            k += 2;
        }
    }

    Err(DiffError::TooLarge {
        cost_limit: max_edit_cost,
    })
}

fn backtrack(trace: &[Vec<isize>], depth: isize, n: isize, m: isize) -> Vec<(usize, usize)> {
    let mut matches = Vec::new();
    let (mut x, mut y) = (n, m);
    for d in (0..=depth).rev() {
        let window = &trace[d as usize];
        let get = |k: isize| window[(k + d) as usize];
        let k = x - y;
        let prev_k = if k == -d || (k != d && get(k - 1) < get(k + 1)) {
            k + 1
        } else {
            k - 1
        };
        let prev_x = if d == 0 { 0 } else { get(prev_k) };
        let prev_y = if d == 0 { 0 } else { prev_x - prev_k };
        while x > prev_x && y > prev_y {
            x -= 1;
            y -= 1;
            matches.push((x as usize, y as usize));
        }
        x = prev_x;
        y = prev_y;
    }
    matches.reverse();
    matches
}

/// Turn matched pairs into the spans between them
fn gaps(
    matches: &[(usize, usize)],
    len_a: usize,
    len_b: usize,
    base: usize,
) -> Vec<(usize, usize, usize, usize)> {
    let mut spans = Vec::new();
    let (mut a, mut b) = (0, 0);
    for &(x, y) in matches.iter().chain(std::iter::once(&(len_a, len_b))) {
        if x > a || y > b {
            spans.push((base + a, x - a, base + b, y - b));
        }
        a = x + 1;
        b = y + 1;
    }
    spans
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn spans(a: &[&str], b: &[&str]) -> Vec<(usize, usize, usize, usize)> {
        diff(a, b, DEFAULT_MAX_EDIT_COST)
            .unwrap()
            .map(|h| h.spans())
            .unwrap_or_default()
    }

    #[test]
    fn test_two_replacements() {
        assert_eq!(
            spans(&["1", "2", "3"], &["a", "2", "b"]),
            vec![(0, 1, 0, 1), (2, 1, 2, 1)]
        );
    }

    #[test]
    fn test_ties_delete_before_inserting() {
        // Either token of a swapped pair can be kept; the kept one is the
        // one reached by deleting first.
        assert_eq!(
            spans(&["a", "b"], &["b", "a"]),
            vec![(0, 1, 0, 0), (2, 0, 1, 1)]
        );
        assert_eq!(
            spans(&["a", "b", "a", "b"], &["b", "a", "b", "a"]),
            vec![(0, 1, 0, 0), (4, 0, 3, 1)]
        );
        assert_eq!(
            spans(&["a", "a", "b"], &["a", "b", "a"]),
            vec![(1, 1, 1, 0), (3, 0, 2, 1)]
        );
    }

    #[test]
    fn test_ambiguous_replacement_aligns_on_deletion() {
        // "ab", "aX" and "aY" are all longest; deleting first keeps "aY".
        assert_eq!(
            spans(&["a", "X", "b", "Y"], &["a", "Y", "b", "X"]),
            vec![(1, 2, 1, 0), (4, 0, 2, 2)]
        );
    }

    #[test]
    fn test_empty_sides() {
        assert!(diff::<&str>(&[], &[], 10).unwrap().is_none());
        assert_eq!(spans(&["a", "b"], &[]), vec![(0, 2, 0, 0)]);
        assert_eq!(spans(&[], &["a", "b", "c"]), vec![(0, 0, 0, 3)]);
    }

    #[test]
    fn test_equal_sequences() {
        assert!(diff(&["x", "y"], &["x", "y"], 10).unwrap().is_none());
    }

    #[test]
    fn test_disjoint_sequences_form_one_hunk() {
        assert_eq!(spans(&["a", "b"], &["c", "d", "e"]), vec![(0, 2, 0, 3)]);
    }

    #[test]
    fn test_insert_in_middle() {
        assert_eq!(
            spans(&["a", "b", "c"], &["a", "b", "x", "y", "c"]),
            vec![(2, 0, 2, 2)]
        );
    }

    #[test]
    fn test_minimal_script_with_moves() {
        let a = ["a", "b", "c", "a", "b", "b", "a"];
        let b = ["c", "b", "a", "b", "a", "c"];
        let hunks = diff(&a, &b, 100).unwrap();
        let (deleted, inserted) = hunks
            .as_deref()
            .into_iter()
            .flat_map(Hunk::iter)
            .fold((0, 0), |(d, i), h| (d + h.deleted, i + h.inserted));
        // LCS has length 4, so 3 deletions and 2 insertions.
        assert_eq!((deleted, inserted), (3, 2));
        assert_eq!(apply_hunks(&a, &b, hunks.as_deref()), b.to_vec());
    }

    #[test]
    fn test_too_large() {
        let a: Vec<u32> = (0..50).collect();
        let b: Vec<u32> = (0..50).rev().collect();
        assert_eq!(
            diff(&a, &b, 4).unwrap_err(),
            DiffError::TooLarge { cost_limit: 4 }
        );
        assert!(diff(&a, &b, 1000).unwrap().is_some());
    }

    #[test]
    fn test_long_chain_clone_and_drop() {
        let a: Vec<u32> = (0..40_000).collect();
        let b: Vec<u32> = a.iter().map(|x| if x % 2 == 0 { *x } else { x + 100_000 }).collect();
        let hunks = diff(&a, &b, 100_000).unwrap().unwrap();
        assert_eq!(hunks.len(), 20_000);
        let copy = hunks.clone();
        assert_eq!(copy, hunks);
        drop(copy);
    }
}
