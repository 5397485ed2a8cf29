//! Instance selection and application.
//!
//! The outer reducer drives every pass through the same protocol: ask how
//! many instances exist, then ask for instance `N` (or `N..=M`) to be applied.
//! Ordinals are 1-based and index the list of candidates that are valid at
//! the moment of the call.
//!
//! Ranges are applied from the highest ordinal down to the lowest, each
//! candidate re-validated immediately before its edit.

use serde::Serialize;
use tracing::{debug, info};

use crate::buffer::TextBuffer;
use crate::candidate::{ApplyReport, Candidate, CandidateContext};
use crate::error::{PruneError, PruneResult};
use crate::tree::{DeclKind, Span};

/// Which instance(s) to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Selection {
    /// Exactly the N-th valid candidate
    Single(usize),
    /// Candidates `from..=to`, applied `to` first
    Range { from: usize, to: usize },
}

impl Selection {
    /// Build from driver counters; a missing or zero to-counter means single.
    pub fn from_counters(counter: usize, to_counter: Option<usize>) -> Self {
        match to_counter {
            Some(to) if to > 0 => Selection::Range { from: counter, to },
            _ => Selection::Single(counter),
        }
    }

    /// Check the selection against the number of valid instances.
    pub fn validate(&self, available: usize) -> PruneResult<()> {
        let (from, to) = match *self {
            Selection::Single(n) => (n, n),
            Selection::Range { from, to } => (from, to),
        };

        if from == 0 {
            return Err(PruneError::InvalidCounter { counter: from });
        }
        if to < from {
            return Err(PruneError::InvalidRange { from, to });
        }
        if from > available {
            return Err(PruneError::MaxInstance {
                requested: from,
                available,
            });
        }
        if to > available {
            return Err(PruneError::ToCounterTooBig { to, available });
        }
        Ok(())
    }

    /// Ordinals in application order.
    fn ordinals(&self) -> Vec<usize> {
        match *self {
            Selection::Single(n) => vec![n],
            Selection::Range { from, to } => (from..=to).rev().collect(),
        }
    }
}

/// One row of a candidate listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateInfo {
    pub ordinal: usize,
    pub name: String,
    pub kind: String,
    pub span: Option<Span>,
    /// Number of declarations the candidate removes
    pub declarations: usize,
}

/// Owns the text buffer for one analysis-and-apply cycle.
pub struct Transformation<'a> {
    ctx: CandidateContext<'a>,
    candidates: Vec<Candidate>,
    buffer: TextBuffer,
}

impl<'a> Transformation<'a> {
    pub fn new(ctx: CandidateContext<'a>, candidates: Vec<Candidate>, buffer: TextBuffer) -> Self {
        Self {
            ctx,
            candidates,
            buffer,
        }
    }

    /// Candidates passing `check` right now, in ordinal order.
    fn valid_candidates(&self) -> Vec<Candidate> {
        self.candidates
            .iter()
            .cloned()
            .filter_map(|mut c| c.check(&self.ctx, &self.buffer).then_some(c))
            .collect()
    }

    /// Number of valid instances. Never mutates the buffer.
    pub fn query_count(&self) -> usize {
        self.valid_candidates().len()
    }

    /// Apply the selected instance(s).
    ///
    /// A selection outside the valid range leaves the buffer untouched. A
    /// rewrite failure aborts the attempt without undoing earlier edits.
    pub fn select_and_apply(&mut self, selection: Selection) -> PruneResult<ApplyReport> {
        let mut valid = self.valid_candidates();
        selection.validate(valid.len())?;

        let mut report = ApplyReport::default();
        for ordinal in selection.ordinals() {
            let candidate = &mut valid[ordinal - 1];
            if !candidate.check(&self.ctx, &self.buffer) {
                debug!(ordinal, "candidate invalid at apply time");
                report.skipped += candidate.leaves().len();
                continue;
            }
            report.merge(candidate.apply(&self.ctx, &mut self.buffer)?);
        }

        info!(
            selection = ?selection,
            removed = report.removed,
            skipped = report.skipped,
            bytes = report.bytes,
            "selection applied"
        );
        Ok(report)
    }

    /// Listing of the valid candidates with their 1-based ordinals.
    pub fn describe(&self) -> Vec<CandidateInfo> {
        self.valid_candidates()
            .iter()
            .enumerate()
            .map(|(i, c)| self.info(i + 1, c))
            .collect()
    }

    fn info(&self, ordinal: usize, candidate: &Candidate) -> CandidateInfo {
        match candidate {
            Candidate::Leaf(id) => {
                let node = self.ctx.tree.node(*id);
                CandidateInfo {
                    ordinal,
                    name: node.map(|n| n.name.clone()).unwrap_or_default(),
                    kind: node
                        .map_or(DeclKind::Other, |n| n.kind)
                        .display_name()
                        .to_string(),
                    span: self.ctx.resolver.full_span(self.ctx.tree, self.buffer.original(), *id),
                    declarations: 1,
                }
            }
            Candidate::Group(_) => {
                let count = candidate.leaves().len();
                CandidateInfo {
                    ordinal,
                    name: format!("{} unreferenced declarations", count),
                    kind: "group".to_string(),
                    span: None,
                    declarations: count,
                }
            }
        }
    }

    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    pub fn into_buffer(self) -> TextBuffer {
        self.buffer
    }

    /// Current rewritten bytes.
    pub fn rewritten(&self) -> Vec<u8> {
        self.buffer.rewritten()
    }
}
