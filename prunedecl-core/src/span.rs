//! Declaration-to-span resolution.
//!
//! The tree records where a declaration's own text lies; deleting it cleanly
//! also needs the `;` that terminates aliases, record definitions and
//! function declarations. Resolution is redone every time a candidate is
//! checked or applied, never cached.

use crate::tree::{NodeId, ProgramTree, Span};

/// Maps a declaration handle to the byte range to delete.
pub trait SpanResolver {
    /// Full removable range of `id` in `text` (the original source bytes), or
    /// `None` if the declaration has no usable physical text.
    fn full_span(&self, tree: &ProgramTree, text: &[u8], id: NodeId) -> Option<Span>;
}

/// Node span extended over a trailing `;` terminator.
///
/// Whitespace between the end of the declaration and the `;` is swallowed
/// with it; anything else stops the extension.
#[derive(Debug, Clone, Copy, Default)]
pub struct FullSpanResolver;

impl SpanResolver for FullSpanResolver {
    fn full_span(&self, tree: &ProgramTree, text: &[u8], id: NodeId) -> Option<Span> {
        let span = node_span(tree, text, id)?;

        let rest = &text[span.end..];
        let terminator = rest
            .iter()
            .position(|b| !b.is_ascii_whitespace())
            .filter(|&i| rest[i] == b';');

        Some(match terminator {
            Some(i) => Span::new(span.start, span.end + i + 1),
            None => span,
        })
    }
}

/// Exactly the node span, no terminator handling.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactSpanResolver;

impl SpanResolver for ExactSpanResolver {
    fn full_span(&self, tree: &ProgramTree, text: &[u8], id: NodeId) -> Option<Span> {
        node_span(tree, text, id)
    }
}

/// The recorded span, if valid and inside `text`.
fn node_span(tree: &ProgramTree, text: &[u8], id: NodeId) -> Option<Span> {
    tree.node(id)?
        .span
        .filter(|s| s.is_valid() && s.end <= text.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{DeclKind, DeclNode};

    fn tree_with(span: Option<Span>) -> ProgramTree {
        let mut tree = ProgramTree::new("a.cpp");
        let mut node = DeclNode::new("T", DeclKind::TypeAlias);
        node.span = span;
        tree.push(node);
        tree
    }

    #[test]
    fn test_extends_over_semicolon() {
        let text = b"typedef int T;\nint x;";
        let tree = tree_with(Some(Span::new(0, 13)));
        assert_eq!(
            FullSpanResolver.full_span(&tree, text, NodeId(0)),
            Some(Span::new(0, 14))
        );
    }

    #[test]
    fn test_extends_over_whitespace_before_semicolon() {
        let text = b"struct S { int a; }\n  ;\nint x;";
        let tree = tree_with(Some(Span::new(0, 19)));
        assert_eq!(
            FullSpanResolver.full_span(&tree, text, NodeId(0)),
            Some(Span::new(0, 23))
        );
    }

    #[test]
    fn test_no_terminator() {
        let text = b"void f() {}\nint x;";
        let tree = tree_with(Some(Span::new(0, 11)));
        assert_eq!(
            FullSpanResolver.full_span(&tree, text, NodeId(0)),
            Some(Span::new(0, 11))
        );
        assert_eq!(
            ExactSpanResolver.full_span(&tree, text, NodeId(0)),
            Some(Span::new(0, 11))
        );
    }

    #[test]
    fn test_span_at_end_of_text() {
        let text = b"void f() {}";
        let tree = tree_with(Some(Span::new(0, 11)));
        assert_eq!(
            FullSpanResolver.full_span(&tree, text, NodeId(0)),
            Some(Span::new(0, 11))
        );
    }

    #[test]
    fn test_invalid_spans() {
        let text = b"int x;";
        assert_eq!(FullSpanResolver.full_span(&tree_with(None), text, NodeId(0)), None);
        assert_eq!(
            FullSpanResolver.full_span(&tree_with(Some(Span::new(3, 3))), text, NodeId(0)),
            None
        );
        assert_eq!(
            FullSpanResolver.full_span(&tree_with(Some(Span::new(0, 50))), text, NodeId(0)),
            None
        );
        assert_eq!(FullSpanResolver.full_span(&tree_with(None), text, NodeId(9)), None);
    }
}
