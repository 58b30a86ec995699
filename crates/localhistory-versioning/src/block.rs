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
//! Line ranges tracked across revisions

use crate::diff::diff;
use crate::error::DiffError;
use std::sync::Arc;
use tracing::{trace, warn};

/// Split text into lines the way blocks index them
pub fn tokenize(text: &str) -> Arc<[String]> {
    text.lines().map(str::to_string).collect()
}

/// Half-open line range `[start, end)` over tokenized text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    lines: Arc<[String]>,
    start: usize,
    end: usize,
}

impl Block {
    /// Block over `text`, with bounds clamped to its line count
    pub fn new(text: &str, start: usize, end: usize) -> Self {
        Self::from_lines(tokenize(text), start, end)
    }

    /// Block over already tokenized lines
    pub fn from_lines(lines: Arc<[String]>, start: usize, end: usize) -> Self {
        let len = lines.len();
        let start = start.min(len);
        let end = end.clamp(start, len);
        Block { lines, start, end }
    }

    /// First line of the range
    pub fn start(&self) -> usize {
        self.start
    }

    /// One past the last line of the range
    pub fn end(&self) -> usize {
        self.end
    }

    /// All lines of the underlying text
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Lines inside the range
    pub fn selected(&self) -> &[String] {
        &self.lines[self.start..self.end]
    }

    /// True when the range covers no line
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Selected lines joined back with `\n`
    pub fn text(&self) -> String {
        self.selected().join("\n")
    }

    /// Project this range onto an older version of the text
    ///
    /// Each hunk before the range shifts it by the hunk's length delta; a
    /// hunk overlapping an edge pins that edge to the hunk boundary. When the
    /// diff exceeds `max_edit_cost` the result is the empty block `[0, 0)`.
    pub fn create_previous_block(&self, previous: Arc<[String]>, max_edit_cost: usize) -> Block {
        let hunks = match diff(&previous[..], &self.lines[..], max_edit_cost) {
            Ok(hunks) => hunks,
            Err(DiffError::TooLarge { cost_limit }) => {
                warn!(cost_limit, lines = self.lines.len(), "Diff too large, dropping selection");
                return Block::from_lines(previous, 0, 0);
            }
        };

        let mut start = self.start as isize;
        let mut end = self.end as isize;
        for hunk in hunks.as_deref().into_iter().flat_map(|h| h.iter()) {
            let line0 = hunk.line0 as isize;
            let line1 = hunk.line1 as isize;
            let deleted = hunk.deleted as isize;
            let inserted = hunk.inserted as isize;
            let delta = deleted - inserted;
            // Offsets in the newer text are fixed; compare against the original bounds.
            let (orig_start, orig_end) = (self.start as isize, self.end as isize);

            if line1 + inserted <= orig_start {
                start += delta;
            } else if line1 < orig_start {
                start = line0;
            }

            if line1 + inserted <= orig_end && line1 < orig_end {
                end += delta;
            } else if line1 < orig_end && orig_end < line1 + inserted {
                end = line0 + deleted;
            }
            trace!(line0, line1, deleted, inserted, start, end, "Remapped block bounds");
        }

        let len = previous.len() as isize;
        if end > len {
            end = (len - 1).max(start);
        }
        let start = start.clamp(0, len) as usize;
        let end = end.max(0) as usize;
        Block::from_lines(previous, start, end)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const MAX: usize = 1000;

    #[test]
    fn test_bounds_clamped() {
        let block = Block::new("a\nb\nc", 2, 10);
        assert_eq!((block.start(), block.end()), (2, 3));
        let block = Block::new("a", 5, 1);
        assert_eq!((block.start(), block.end()), (1, 1));
        assert!(block.is_empty());
    }

    #[test]
    fn test_unchanged_text_keeps_range() {
        let block = Block::new("a\nb\nc\nd", 1, 3);
        let previous = block.create_previous_block(tokenize("a\nb\nc\nd"), MAX);
        assert_eq!(previous.text(), "b\nc");
    }

    #[test]
    fn test_insertion_above_shifts_range() {
        // Two lines were added above the selection.
        let block = Block::new("x\ny\na\nb\nc", 3, 5);
        let previous = block.create_previous_block(tokenize("a\nb\nc"), MAX);
        assert_eq!((previous.start(), previous.end()), (1, 3));
        assert_eq!(previous.text(), "b\nc");
    }

    #[test]
    fn test_change_below_does_not_move_range() {
        let block = Block::new("a\nb\nc\nd", 0, 2);
        let previous = block.create_previous_block(tokenize("a\nb\nX\nY\nZ"), MAX);
        assert_eq!(previous.text(), "a\nb");
    }

    #[test]
    fn test_change_inside_range_widens_with_hunk() {
        let block = Block::new("a\nb\nNEW\nd\ne", 1, 4);
        let previous = block.create_previous_block(tokenize("a\nb\nold1\nold2\nd\ne"), MAX);
        assert_eq!((previous.start(), previous.end()), (1, 5));
        assert_eq!(previous.text(), "b\nold1\nold2\nd");
    }

    #[test]
    fn test_hunk_over_start_pins_start() {
        let block = Block::new("a\nNEW1\nNEW2\nd", 2, 4);
        let previous = block.create_previous_block(tokenize("a\nold\nd"), MAX);
        assert_eq!((previous.start(), previous.end()), (1, 3));
    }

    #[test]
    fn test_hunk_over_end_pins_end() {
        let block = Block::new("a\nb\nNEW1\nNEW2", 0, 3);
        let previous = block.create_previous_block(tokenize("a\nb\nold"), MAX);
        assert_eq!((previous.start(), previous.end()), (0, 3));
    }

    #[test]
    fn test_too_large_falls_back_to_empty() {
        let current: String = (0..40).map(|i| format!("n{i}\n")).collect();
        let old: String = (0..40).rev().map(|i| format!("n{i}\n")).collect();
        let block = Block::new(&current, 0, 40);
        let previous = block.create_previous_block(tokenize(&old), 3);
        assert_eq!((previous.start(), previous.end()), (0, 0));
    }
}
