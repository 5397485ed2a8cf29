//! Fixpoint liveness propagation.
//!
//! Each pass:
//! 1. every equivalence group with two or more members gets the OR of its
//!    members' `referenced` / `used` bits written back to all members;
//! 2. every containment edge ORs the child's bits into the parent.
//!
//! Passes repeat until one changes nothing. All updates are monotone ORs over
//! a finite bit table, so the loop terminates (at most one productive pass per
//! newly set bit) and the fixpoint does not depend on visiting order.

use serde::Serialize;
use tracing::debug;

use crate::model::{EquivalenceGroup, LivenessState, RelationGraph};

/// Outcome of one propagation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PropagationStats {
    /// Passes executed, including the final quiet one
    pub passes: usize,
    /// Bits flipped by propagation (seeding not included)
    pub changes: usize,
}

/// Drives a [`LivenessState`] to its fixpoint over a [`RelationGraph`].
pub struct Propagator<'g> {
    graph: &'g RelationGraph,
}

impl<'g> Propagator<'g> {
    pub fn new(graph: &'g RelationGraph) -> Self {
        Self { graph }
    }

    /// Run passes until nothing changes.
    pub fn run(&self, state: &mut LivenessState) -> PropagationStats {
        let mut stats = PropagationStats::default();

        loop {
            stats.passes += 1;
            let changed = self.pass(state);
            debug!(pass = stats.passes, changed, "liveness pass");
            if changed == 0 {
                break;
            }
            stats.changes += changed;
        }

        stats
    }

    /// One full pass over groups then containment edges. Returns bits flipped.
    fn pass(&self, state: &mut LivenessState) -> usize {
        let mut changed = 0;

        for group in self.graph.groups() {
            changed += close_group(group, state);
        }

        for (child, parent) in self.graph.containment_edges() {
            if state.is_referenced(child) && state.mark_referenced(parent) {
                changed += 1;
            }
            if state.is_used(child) && state.mark_used(parent) {
                changed += 1;
            }
        }

        changed
    }
}

fn close_group(group: &EquivalenceGroup, state: &mut LivenessState) -> usize {
    if group.len() < 2 {
        return 0;
    }

    let members = group.members();
    let any_referenced = members.iter().any(|&id| state.is_referenced(id));
    let any_used = members.iter().any(|&id| state.is_used(id));

    let mut changed = 0;
    for &id in members {
        if any_referenced && state.mark_referenced(id) {
            changed += 1;
        }
        if any_used && state.mark_used(id) {
            changed += 1;
        }
    }
    changed
}

/// Convenience wrapper: propagate in place and return the stats.
pub fn propagate(graph: &RelationGraph, state: &mut LivenessState) -> PropagationStats {
    Propagator::new(graph).run(state)
}
