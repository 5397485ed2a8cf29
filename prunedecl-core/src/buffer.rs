//! Rewrite buffer over the original source text.
//!
//! Offsets given to the buffer are always byte offsets into the *original*
//! text, the same coordinates the program tree spans use. The text is kept as
//! raw bytes: reduced inputs are not guaranteed to be valid UTF-8. Deletions are recorded as
//! holes (sorted, merged, non-overlapping) instead of being spliced out
//! eagerly, so later spans never need re-indexing. The rewritten text is
//! materialized on demand.

use crate::error::{PruneError, PruneResult};
use crate::tree::Span;

/// Source bytes plus the set of original ranges already deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBuffer {
    original: Vec<u8>,
    holes: Vec<Span>,
}

impl TextBuffer {
    pub fn new(original: impl Into<Vec<u8>>) -> Self {
        Self {
            original: original.into(),
            holes: Vec::new(),
        }
    }

    pub fn original(&self) -> &[u8] {
        &self.original
    }

    /// Length of the original text.
    pub fn len(&self) -> usize {
        self.original.len()
    }

    pub fn is_empty(&self) -> bool {
        self.original.is_empty()
    }

    /// Whether any deletion has been made.
    pub fn is_modified(&self) -> bool {
        !self.holes.is_empty()
    }

    /// Deleted original ranges, sorted.
    pub fn holes(&self) -> &[Span] {
        &self.holes
    }

    /// Total number of original bytes deleted so far.
    pub fn removed_bytes(&self) -> usize {
        self.holes.iter().map(Span::len).sum()
    }

    /// Whether the byte at `offset` has been deleted.
    pub fn is_deleted(&self, offset: usize) -> bool {
        let idx = self.holes.partition_point(|h| h.end <= offset);
        self.holes.get(idx).is_some_and(|h| h.start <= offset)
    }

    /// Apparent size of an original range in the rewritten text.
    ///
    /// Returns `-1` when the range runs past the buffer or when its last byte
    /// has already been deleted. Measuring `0..offset` therefore answers
    /// "does the byte before `offset` still exist", which is how `apply`
    /// detects a span overlapping an earlier edit.
    pub fn measure(&self, start: usize, end: usize) -> isize {
        if end > self.len() || start > end {
            return -1;
        }
        if start == end {
            return 0;
        }
        if self.is_deleted(end - 1) {
            return -1;
        }

        let removed: usize = self
            .holes
            .iter()
            .map(|h| overlap(*h, start, end))
            .sum();
        (end - start - removed) as isize
    }

    /// Delete an original range.
    ///
    /// Fails if the range is empty or runs past the buffer. Removing bytes
    /// that are already gone is absorbed by merging.
    pub fn remove(&mut self, span: Span) -> PruneResult<()> {
        if !span.is_valid() {
            return Err(PruneError::internal(format!("cannot remove empty range {}", span)));
        }
        if span.end > self.len() {
            return Err(PruneError::internal(format!(
                "range {} outside buffer of {} bytes",
                span,
                self.len()
            )));
        }

        let mut merged = span;
        let first = self.holes.partition_point(|h| h.end < span.start);
        let mut last = first;
        while last < self.holes.len() && self.holes[last].start <= span.end {
            merged.start = merged.start.min(self.holes[last].start);
            merged.end = merged.end.max(self.holes[last].end);
            last += 1;
        }
        self.holes.splice(first..last, std::iter::once(merged));
        Ok(())
    }

    /// The bytes with every hole removed.
    pub fn rewritten(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.len() - self.removed_bytes());
        let mut cursor = 0;
        for hole in &self.holes {
            out.extend_from_slice(&self.original[cursor..hole.start]);
            cursor = hole.end;
        }
        out.extend_from_slice(&self.original[cursor..]);
        out
    }
}

fn overlap(hole: Span, start: usize, end: usize) -> usize {
    let lo = hole.start.max(start);
    let hi = hole.end.min(end);
    hi.saturating_sub(lo)
}
