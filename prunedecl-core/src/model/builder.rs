//! Single-pass construction of the relation graph.
//!
//! Performance characteristics:
//! - One visit per declaration, O(|V| + |links|)
//! - Span groups via a `BTreeMap` bucket keyed by (file, span), so group order
//!   is deterministic across runs

use std::collections::BTreeMap;

use petgraph::graphmap::DiGraphMap;
use tracing::{debug, warn};

use super::{EquivalenceGroup, GroupSource, LivenessState, RelationGraph};
use crate::tree::{DeclNode, NodeId, ProgramTree, Span};

/// Accumulates groups, containment edges and seeded flags during one walk.
///
/// Relations are emitted locally at each node; there is no global search.
pub struct RelationBuilder<'t> {
    tree: &'t ProgramTree,
    span_buckets: BTreeMap<(Option<&'t str>, Span), Vec<NodeId>>,
    groups: Vec<EquivalenceGroup>,
    containment: DiGraphMap<NodeId, ()>,
    state: LivenessState,
    dangling: usize,
}

impl<'t> RelationBuilder<'t> {
    pub fn new(tree: &'t ProgramTree) -> Self {
        Self {
            tree,
            span_buckets: BTreeMap::new(),
            groups: Vec::new(),
            containment: DiGraphMap::new(),
            state: LivenessState::new(tree.len()),
            dangling: 0,
        }
    }

    /// Visit every declaration once, implicit ones included.
    pub fn walk(mut self) -> Self {
        let tree = self.tree;
        for (id, node) in tree.iter() {
            self.visit(id, node);
        }
        self
    }

    fn visit(&mut self, id: NodeId, node: &'t DeclNode) {
        if let Some(span) = node.span.filter(Span::is_valid) {
            // An explicit main-file name and `None` denote the same file
            let main_file = self.tree.main_file.as_str();
            let file = node.file.as_deref().filter(|f| *f != main_file);
            self.span_buckets.entry((file, span)).or_default().push(id);
        }

        self.record_links(id, node);
        self.record_containment(id, node);
        self.seed(id, node);
    }

    fn record_links(&mut self, id: NodeId, node: &DeclNode) {
        let links = &node.links;

        for target in [
            links.instantiation_pattern,
            links.primary_template,
            links.member_template,
            links.templated_decl,
        ]
        .into_iter()
        .flatten()
        {
            if let Some(target) = self.resolve(id, target) {
                self.groups
                    .push(EquivalenceGroup::new(GroupSource::Template, [id, target]));
            }
        }

        if let Some(prev) = links.previous_decl.and_then(|p| self.resolve(id, p)) {
            self.groups
                .push(EquivalenceGroup::new(GroupSource::Redeclaration, [id, prev]));
        }

        if !links.shadows.is_empty() {
            let mut members = vec![id];
            for &shadow in &links.shadows {
                let Some(shadow) = self.resolve(id, shadow) else {
                    continue;
                };
                members.push(shadow);
                let target = self
                    .tree
                    .node(shadow)
                    .and_then(|s| s.links.shadow_target);
                if let Some(target) = target.and_then(|t| self.resolve(shadow, t)) {
                    members.push(target);
                }
            }
            self.groups
                .push(EquivalenceGroup::new(GroupSource::Alias, members));
        }
    }

    fn record_containment(&mut self, id: NodeId, node: &DeclNode) {
        for parent in node.parents() {
            if let Some(parent) = self.resolve(id, parent) {
                self.containment.add_edge(id, parent, ());
            }
        }
    }

    fn seed(&mut self, id: NodeId, node: &DeclNode) {
        if node.must_be_emitted {
            self.state.mark_referenced(id);
            self.state.mark_used(id);
        }
        if node.referenced {
            self.state.mark_referenced(id);
        }
        if node.used {
            self.state.mark_used(id);
        }

        for &target in &node.references {
            if let Some(target) = self.resolve(id, target) {
                self.state.mark_referenced(target);
            }
        }

        // Naming a template through a specialization type keeps the template
        // and the declaration it describes.
        for &template in &node.template_refs {
            let Some(template) = self.resolve(id, template) else {
                continue;
            };
            self.state.mark_referenced(template);
            let templated = self
                .tree
                .node(template)
                .and_then(|t| t.links.templated_decl);
            if let Some(templated) = templated.and_then(|d| self.resolve(template, d)) {
                self.state.mark_referenced(templated);
            }
        }
    }

    /// Checks a handle against the arena, counting and logging dangling ones.
    fn resolve(&mut self, from: NodeId, to: NodeId) -> Option<NodeId> {
        if self.tree.contains(to) {
            Some(to)
        } else {
            self.dangling += 1;
            warn!(from = %from, to = %to, "dangling declaration handle in program tree");
            None
        }
    }

    /// Number of out-of-arena handles seen so far.
    pub fn dangling_handles(&self) -> usize {
        self.dangling
    }

    /// Hand off the accumulated relations and seeded state.
    pub fn finish(mut self) -> (RelationGraph, LivenessState) {
        for (_, members) in std::mem::take(&mut self.span_buckets) {
            if members.len() > 1 {
                self.groups
                    .push(EquivalenceGroup::new(GroupSource::Span, members));
            }
        }

        debug!(
            groups = self.groups.len(),
            containment_edges = self.containment.edge_count(),
            referenced = self.state.referenced_count(),
            used = self.state.used_count(),
            dangling = self.dangling,
            "relation model built"
        );

        let graph = RelationGraph {
            groups: self.groups,
            containment: self.containment,
        };
        (graph, self.state)
    }
}

/// Walks the tree once and returns the relation snapshot with seeded flags.
pub fn build_relations(tree: &ProgramTree) -> (RelationGraph, LivenessState) {
    RelationBuilder::new(tree).walk().finish()
}
