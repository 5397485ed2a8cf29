//! Removal candidates.
//!
//! A candidate is either a single declaration or an ordered group of
//! candidates applied as one reduction step. Candidates are built once after
//! the fixpoint settles, re-validated with [`Candidate::check`] right before
//! [`Candidate::apply`], and thrown away after one attempt.

use regex::RegexSet;
use serde::Serialize;
use tracing::debug;

use crate::buffer::TextBuffer;
use crate::error::PruneResult;
use crate::model::LivenessState;
use crate::span::SpanResolver;
use crate::tree::{NodeId, ProgramTree, Span};

/// Which source material may never be edited.
///
/// Declarations from included files are always protected; configured
/// patterns additionally protect files whose name matches.
#[derive(Debug, Clone, Default)]
pub struct SourcePolicy {
    protected: Option<RegexSet>,
}

impl SourcePolicy {
    /// Compile protected-file patterns.
    pub fn new<I, S>(patterns: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let set = RegexSet::new(patterns)?;
        Ok(Self {
            protected: (!set.is_empty()).then_some(set),
        })
    }

    pub fn is_protected(&self, tree: &ProgramTree, id: NodeId) -> bool {
        if tree.is_in_included_file(id) {
            return true;
        }
        let file = tree.node(id).and_then(|n| n.file.as_deref());
        match (&self.protected, file) {
            (Some(set), Some(file)) => set.is_match(file),
            (Some(set), None) => set.is_match(&tree.main_file),
            (None, _) => false,
        }
    }
}

/// Everything a candidate needs to re-resolve itself against the live tree.
#[derive(Clone, Copy)]
pub struct CandidateContext<'a> {
    pub tree: &'a ProgramTree,
    pub resolver: &'a dyn SpanResolver,
    pub policy: &'a SourcePolicy,
}

impl<'a> CandidateContext<'a> {
    pub fn new(
        tree: &'a ProgramTree,
        resolver: &'a dyn SpanResolver,
        policy: &'a SourcePolicy,
    ) -> Self {
        Self {
            tree,
            resolver,
            policy,
        }
    }

    /// Fresh full span of a declaration, `None` if unusable or protected.
    fn resolve(&self, buffer: &TextBuffer, id: NodeId) -> Option<Span> {
        self.edit_span(buffer, id)
            .filter(|s| s.is_valid() && s.end <= buffer.len())
    }

    /// Span handed to the buffer at apply time. `check` has already vetted
    /// it, so a degenerate range here surfaces as a rewrite failure.
    fn edit_span(&self, buffer: &TextBuffer, id: NodeId) -> Option<Span> {
        if self.policy.is_protected(self.tree, id) {
            return None;
        }
        self.resolver.full_span(self.tree, buffer.original(), id)
    }
}

/// What one `apply` did to the buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ApplyReport {
    /// Declarations whose span was deleted
    pub removed: usize,
    /// Declarations skipped because their span already read as deleted
    pub skipped: usize,
    /// Original bytes covered by the deleted spans
    pub bytes: usize,
}

impl ApplyReport {
    pub fn merge(&mut self, other: ApplyReport) {
        self.removed += other.removed;
        self.skipped += other.skipped;
        self.bytes += other.bytes;
    }
}

/// A prospective unit of removal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Candidate {
    Leaf(NodeId),
    Group(Vec<Candidate>),
}

impl Candidate {
    /// Re-validate against the live tree and buffer.
    ///
    /// A group drops its invalid members and stays valid while at least one
    /// member remains.
    pub fn check(&mut self, ctx: &CandidateContext<'_>, buffer: &TextBuffer) -> bool {
        match self {
            Candidate::Leaf(id) => ctx.resolve(buffer, *id).is_some(),
            Candidate::Group(members) => {
                members.retain_mut(|c| c.check(ctx, buffer));
                !members.is_empty()
            }
        }
    }

    /// Delete the candidate's text.
    ///
    /// A leaf whose first or last byte already reads as deleted is skipped, so
    /// applying the same leaf twice leaves the buffer untouched the second
    /// time. Out-of-bounds spans read as deleted and are skipped the same way.
    /// Buffer failures propagate; edits made before the failure stay.
    pub fn apply(&self, ctx: &CandidateContext<'_>, buffer: &mut TextBuffer) -> PruneResult<ApplyReport> {
        let mut report = ApplyReport::default();

        match self {
            Candidate::Leaf(id) => {
                let Some(span) = ctx.edit_span(buffer, *id) else {
                    debug!(node = %id, "candidate span no longer resolves");
                    report.skipped += 1;
                    return Ok(report);
                };

                if overlaps_earlier_edit(buffer, span) {
                    debug!(node = %id, span = %span, "candidate span already deleted");
                    report.skipped += 1;
                    return Ok(report);
                }

                buffer.remove(span)?;
                report.removed += 1;
                report.bytes += span.len();
            }
            Candidate::Group(members) => {
                for member in members {
                    report.merge(member.apply(ctx, buffer)?);
                }
            }
        }

        Ok(report)
    }

    /// Declarations covered by this candidate, in application order.
    pub fn leaves(&self) -> Vec<NodeId> {
        match self {
            Candidate::Leaf(id) => vec![*id],
            Candidate::Group(members) => members.iter().flat_map(Candidate::leaves).collect(),
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self, Candidate::Group(_))
    }
}

/// Negative apparent size up to the span's first or last byte means that byte
/// was removed by an earlier candidate.
fn overlaps_earlier_edit(buffer: &TextBuffer, span: Span) -> bool {
    buffer.measure(0, span.start + 1) < 0 || buffer.measure(0, span.end) < 0
}

/// Collect every unreferenced declaration of a prunable kind, in arena order.
///
/// `used` alone does not keep a declaration. With `all_at_once` the whole
/// list becomes one group candidate (an empty list stays empty).
pub fn collect_candidates(tree: &ProgramTree, state: &LivenessState, all_at_once: bool) -> Vec<Candidate> {
    let leaves: Vec<Candidate> = tree
        .iter()
        .filter(|(id, node)| node.kind.is_prunable() && !state.is_referenced(*id))
        .map(|(id, _)| Candidate::Leaf(id))
        .collect();

    if all_at_once && !leaves.is_empty() {
        vec![Candidate::Group(leaves)]
    } else {
        leaves
    }
}
