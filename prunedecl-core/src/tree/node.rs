//! Declaration nodes as stored in the program tree arena.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Handle of a declaration in the program tree arena.
///
/// Handles are array positions in the tree dump. The engine never owns the
/// node itself, only this index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<usize> for NodeId {
    fn from(index: usize) -> Self {
        Self(index as u32)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Kind tag of a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclKind {
    Function,
    TypeAlias,
    UsingAlias,
    RecordType,
    /// Namespaces, templates, using-declarations, shadows, variables...
    /// They take part in propagation but are never pruned.
    #[default]
    Other,
}

impl DeclKind {
    /// Whether declarations of this kind may become removal candidates.
    pub fn is_prunable(&self) -> bool {
        matches!(
            self,
            DeclKind::Function | DeclKind::TypeAlias | DeclKind::UsingAlias | DeclKind::RecordType
        )
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            DeclKind::Function => "function",
            DeclKind::TypeAlias => "type alias",
            DeclKind::UsingAlias => "using alias",
            DeclKind::RecordType => "record type",
            DeclKind::Other => "other",
        }
    }
}

impl fmt::Display for DeclKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Half-open byte range into the main source buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Empty or inverted spans carry no text.
    pub fn is_valid(&self) -> bool {
        self.start < self.end
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Kind-specific links discovered by the parser at this node.
///
/// Every field is optional; which ones are filled depends on the kind of
/// declaration (a using-declaration has `shadows`, a shadow has
/// `shadow_target`, an instantiated function has `instantiation_pattern`...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeclLinks {
    /// Pattern this declaration was instantiated from
    pub instantiation_pattern: Option<NodeId>,
    /// Primary template of an explicit or partial specialization
    pub primary_template: Option<NodeId>,
    /// Member template a member-template instantiation originates from
    pub member_template: Option<NodeId>,
    /// Declaration described by a template declaration
    pub templated_decl: Option<NodeId>,
    /// Prior declaration of an out-of-line definition
    pub previous_decl: Option<NodeId>,
    /// Shadow bindings introduced by a using-declaration
    pub shadows: Vec<NodeId>,
    /// Ultimate target of a using shadow
    pub shadow_target: Option<NodeId>,
}

/// One declaration occurrence in the program tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeclNode {
    /// Simple name; empty for anonymous or implicit declarations
    pub name: String,

    pub kind: DeclKind,

    /// Source text range; `None` for compiler-synthesized declarations
    pub span: Option<Span>,

    /// Originating file; `None` means the main buffer
    pub file: Option<String>,

    /// Enclosing declaration in the source text
    pub lexical_parent: Option<NodeId>,

    /// Enclosing declaration in the semantic scope (differs for out-of-line members)
    pub semantic_parent: Option<NodeId>,

    /// Required-output predicate of the external tree
    pub must_be_emitted: bool,

    /// Name observed by the parser somewhere in the program
    pub referenced: bool,

    /// Required for program semantics without a named use
    pub used: bool,

    /// Targets of name lookups, overload resolutions, specialization links
    /// and type references made from this declaration
    pub references: Vec<NodeId>,

    /// Templates named through a template specialization type
    pub template_refs: Vec<NodeId>,

    pub links: DeclLinks,
}

impl DeclNode {
    pub fn new(name: impl Into<String>, kind: DeclKind) -> Self {
        Self {
            name: name.into(),
            kind,
            ..Self::default()
        }
    }

    pub fn with_span(mut self, start: usize, end: usize) -> Self {
        self.span = Some(Span::new(start, end));
        self
    }

    pub fn with_parent(mut self, parent: NodeId) -> Self {
        self.lexical_parent = Some(parent);
        self
    }

    /// Lexical and semantic parents, deduplicated.
    pub fn parents(&self) -> impl Iterator<Item = NodeId> + '_ {
        let semantic = self
            .semantic_parent
            .filter(|p| Some(*p) != self.lexical_parent);
        self.lexical_parent.into_iter().chain(semantic)
    }

    /// Display string used in reports and logs.
    pub fn display(&self) -> String {
        let name = if self.name.is_empty() {
            "<anonymous>"
        } else {
            self.name.as_str()
        };
        match self.span {
            Some(span) => format!("{} {} ({})", self.kind.display_name(), name, span),
            None => format!("{} {} (implicit)", self.kind.display_name(), name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prunable_kinds() {
        assert!(DeclKind::Function.is_prunable());
        assert!(DeclKind::TypeAlias.is_prunable());
        assert!(DeclKind::UsingAlias.is_prunable());
        assert!(DeclKind::RecordType.is_prunable());
        assert!(!DeclKind::Other.is_prunable());
    }

    #[test]
    fn test_kind_serde_names() {
        let kind: DeclKind = serde_json::from_str("\"using_alias\"").unwrap();
        assert_eq!(kind, DeclKind::UsingAlias);
        assert_eq!(serde_json::to_string(&DeclKind::RecordType).unwrap(), "\"record_type\"");
    }

    #[test]
    fn test_span_validity() {
        assert!(Span::new(0, 1).is_valid());
        assert!(!Span::new(4, 4).is_valid());
        assert!(!Span::new(5, 2).is_valid());
        assert_eq!(Span::new(5, 2).len(), 0);
    }

    #[test]
    fn test_parents_dedup() {
        let mut node = DeclNode::new("f", DeclKind::Function).with_parent(NodeId(1));
        node.semantic_parent = Some(NodeId(1));
        assert_eq!(node.parents().collect::<Vec<_>>(), vec![NodeId(1)]);

        node.semantic_parent = Some(NodeId(2));
        assert_eq!(node.parents().collect::<Vec<_>>(), vec![NodeId(1), NodeId(2)]);
    }

    #[test]
    fn test_display() {
        let node = DeclNode::new("helper", DeclKind::Function).with_span(3, 20);
        assert_eq!(node.display(), "function helper (3..20)");
        let implicit = DeclNode::new("", DeclKind::RecordType);
        assert_eq!(implicit.display(), "record type <anonymous> (implicit)");
    }
}
