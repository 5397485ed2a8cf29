//! Node/relation model.
//!
//! A single traversal of the program tree ([`RelationBuilder`]) produces two
//! things:
//!
//! - an immutable [`RelationGraph`]: equivalence groups plus child -> parent
//!   containment edges;
//! - a seeded [`LivenessState`]: the `referenced` / `used` bits observed
//!   directly during the walk.
//!
//! The propagator then works on these alone; it never looks at the tree.

mod builder;

pub use builder::{build_relations, RelationBuilder};

use petgraph::graphmap::DiGraphMap;
use serde::Serialize;

use crate::tree::NodeId;

/// Where an equivalence group came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupSource {
    /// Byte-identical source spans
    Span,
    /// Instantiation / specialization / member template / templated decl links
    Template,
    /// Definition and its prior declaration
    Redeclaration,
    /// Using-declaration, its shadows and their targets
    Alias,
}

/// Declarations that must share identical liveness.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EquivalenceGroup {
    pub source: GroupSource,
    members: Vec<NodeId>,
}

impl EquivalenceGroup {
    /// Members are sorted and deduplicated.
    pub fn new(source: GroupSource, members: impl IntoIterator<Item = NodeId>) -> Self {
        let mut members: Vec<NodeId> = members.into_iter().collect();
        members.sort_unstable();
        members.dedup();
        Self { source, members }
    }

    pub fn members(&self) -> &[NodeId] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.members.binary_search(&id).is_ok()
    }
}

/// Immutable relation snapshot handed to the liveness propagator.
#[derive(Debug, Clone, Default)]
pub struct RelationGraph {
    groups: Vec<EquivalenceGroup>,
    /// Edges point from a child to each of its lexical/semantic parents
    containment: DiGraphMap<NodeId, ()>,
}

impl RelationGraph {
    pub fn groups(&self) -> &[EquivalenceGroup] {
        &self.groups
    }

    /// All (child, parent) pairs.
    pub fn containment_edges(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.containment.all_edges().map(|(child, parent, _)| (child, parent))
    }

    /// Direct parents of a node.
    pub fn parents_of(&self, child: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.containment.neighbors(child)
    }

    pub fn containment_edge_count(&self) -> usize {
        self.containment.edge_count()
    }

    /// Number of groups that came from the given source.
    pub fn group_count(&self, source: GroupSource) -> usize {
        self.groups.iter().filter(|g| g.source == source).count()
    }
}

/// Monotone liveness bits, indexed by node handle.
///
/// Bits only ever go from false to true; `mark_*` reports whether the call
/// changed anything so the fixpoint loop can detect a quiet pass.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LivenessState {
    referenced: Vec<bool>,
    used: Vec<bool>,
}

impl LivenessState {
    pub fn new(len: usize) -> Self {
        Self {
            referenced: vec![false; len],
            used: vec![false; len],
        }
    }

    pub fn len(&self) -> usize {
        self.referenced.len()
    }

    pub fn is_empty(&self) -> bool {
        self.referenced.is_empty()
    }

    pub fn is_referenced(&self, id: NodeId) -> bool {
        self.referenced.get(id.index()).copied().unwrap_or(false)
    }

    pub fn is_used(&self, id: NodeId) -> bool {
        self.used.get(id.index()).copied().unwrap_or(false)
    }

    /// Returns true if the bit was newly set. Out-of-range handles are ignored.
    pub fn mark_referenced(&mut self, id: NodeId) -> bool {
        set_bit(&mut self.referenced, id)
    }

    /// Returns true if the bit was newly set. Out-of-range handles are ignored.
    pub fn mark_used(&mut self, id: NodeId) -> bool {
        set_bit(&mut self.used, id)
    }

    pub fn referenced_count(&self) -> usize {
        self.referenced.iter().filter(|b| **b).count()
    }

    pub fn used_count(&self) -> usize {
        self.used.iter().filter(|b| **b).count()
    }
}

fn set_bit(bits: &mut [bool], id: NodeId) -> bool {
    match bits.get_mut(id.index()) {
        Some(bit) if !*bit => {
            *bit = true;
            true
        }
        _ => false,
    }
}
