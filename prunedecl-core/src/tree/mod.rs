//! Program tree adapter.
//!
//! The tree itself is produced by an external parser and handed to us as a
//! JSON dump:
//!
//! ```json
//! {
//!   "main_file": "input.cpp",
//!   "decls": [
//!     { "name": "main", "kind": "function", "span": { "start": 0, "end": 30 },
//!       "must_be_emitted": true, "references": [1] },
//!     { "name": "helper", "kind": "function", "span": { "start": 31, "end": 52 } }
//!   ]
//! }
//! ```
//!
//! A declaration's handle is its position in `decls`. The arena is read-only
//! for the engine; liveness lives in a separate table keyed by [`NodeId`].

mod node;

pub use node::{DeclKind, DeclLinks, DeclNode, NodeId, Span};

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{IoResultExt, PruneError, PruneResult};

/// Arena of declaration nodes for one translation unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramTree {
    /// Name of the file the text buffer holds
    #[serde(default)]
    pub main_file: String,

    #[serde(default)]
    decls: Vec<DeclNode>,
}

impl ProgramTree {
    pub fn new(main_file: impl Into<String>) -> Self {
        Self {
            main_file: main_file.into(),
            decls: Vec::new(),
        }
    }

    /// Append a declaration and return its handle.
    pub fn push(&mut self, node: DeclNode) -> NodeId {
        let id = NodeId::from(self.decls.len());
        self.decls.push(node);
        id
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.index() < self.decls.len()
    }

    pub fn node(&self, id: NodeId) -> Option<&DeclNode> {
        self.decls.get(id.index())
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut DeclNode> {
        self.decls.get_mut(id.index())
    }

    /// All handles in arena order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.decls.len()).map(NodeId::from)
    }

    /// Handles paired with their nodes, in arena order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &DeclNode)> {
        self.decls
            .iter()
            .enumerate()
            .map(|(i, n)| (NodeId::from(i), n))
    }

    /// Whether the declaration comes from a file other than the main buffer.
    pub fn is_in_included_file(&self, id: NodeId) -> bool {
        self.node(id)
            .and_then(|n| n.file.as_deref())
            .is_some_and(|file| file != self.main_file)
    }

    /// Parse a tree dump. `origin` only labels errors.
    pub fn from_json_str(text: &str, origin: &Path) -> PruneResult<Self> {
        serde_json::from_str(text).map_err(|e| {
            PruneError::tree_format(origin, format!("line {}, column {}: {}", e.line(), e.column(), e))
        })
    }

    pub fn to_json_string(&self) -> PruneResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| PruneError::internal(format!("tree serialization failed: {}", e)))
    }
}

/// Loads a program tree dump from disk.
pub fn load_tree(path: &Path) -> PruneResult<ProgramTree> {
    let text = fs::read_to_string(path).with_path(path)?;
    ProgramTree::from_json_str(&text, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const DUMP: &str = r#"{
        "main_file": "input.cpp",
        "decls": [
            { "name": "main", "kind": "function", "span": { "start": 0, "end": 30 },
              "must_be_emitted": true, "references": [1] },
            { "name": "helper", "kind": "function", "span": { "start": 31, "end": 52 } },
            { "name": "size_t", "kind": "type_alias", "file": "/usr/include/stddef.h",
              "span": { "start": 0, "end": 10 } },
            { "kind": "record_type" }
        ]
    }"#;

    #[test]
    fn test_parse_dump() {
        let tree = ProgramTree::from_json_str(DUMP, Path::new("tree.json")).unwrap();
        assert_eq!(tree.len(), 4);
        assert_eq!(tree.main_file, "input.cpp");

        let main = tree.node(NodeId(0)).unwrap();
        assert!(main.must_be_emitted);
        assert_eq!(main.references, vec![NodeId(1)]);

        let implicit = tree.node(NodeId(3)).unwrap();
        assert_eq!(implicit.kind, DeclKind::RecordType);
        assert!(implicit.span.is_none());
        assert!(implicit.name.is_empty());
    }

    #[test]
    fn test_included_file_detection() {
        let tree = ProgramTree::from_json_str(DUMP, Path::new("tree.json")).unwrap();
        assert!(!tree.is_in_included_file(NodeId(0)));
        assert!(tree.is_in_included_file(NodeId(2)));
        assert!(!tree.is_in_included_file(NodeId(99)));
    }

    #[test]
    fn test_malformed_dump() {
        let err = ProgramTree::from_json_str("{ \"decls\": [ { \"kind\": 7 } ] }", Path::new("bad.json"))
            .unwrap_err();
        assert!(matches!(err, PruneError::TreeFormat { .. }));
        assert_eq!(err.path(), Some(&PathBuf::from("bad.json")));
    }

    #[test]
    fn test_push_and_iter() {
        let mut tree = ProgramTree::new("a.cpp");
        let f = tree.push(DeclNode::new("f", DeclKind::Function).with_span(0, 10));
        let g = tree.push(DeclNode::new("g", DeclKind::Function).with_span(11, 20));
        assert_eq!((f, g), (NodeId(0), NodeId(1)));
        assert!(tree.contains(g));
        assert!(!tree.contains(NodeId(2)));
        let names: Vec<_> = tree.iter().map(|(_, n)| n.name.as_str()).collect();
        assert_eq!(names, vec!["f", "g"]);
    }

    #[test]
    fn test_json_roundtrip_preserves_links() {
        let mut tree = ProgramTree::new("a.cpp");
        let pattern = tree.push(DeclNode::new("f", DeclKind::Function).with_span(0, 10));
        let mut inst = DeclNode::new("f", DeclKind::Function);
        inst.links.instantiation_pattern = Some(pattern);
        tree.push(inst);

        let text = tree.to_json_string().unwrap();
        let back = ProgramTree::from_json_str(&text, Path::new("mem")).unwrap();
        assert_eq!(back, tree);
    }
}
