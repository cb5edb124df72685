//! Borrowed cursor over raw nodes.

use crate::base::{TextRange, TextSize, range_contains_offset};

use super::arena::{NodeId, SyntaxTree};
use super::kind::{ContainerKind, SyntaxKind};

/// A raw node viewed against its owning tree.
///
/// This is the read-only structural surface consumed from the external
/// parser: kind, positions, parent, and child access. Cursors are cheap
/// copies; they never outlive the parse generation they point into.
#[derive(Clone, Copy)]
pub struct NodeRef<'t> {
    tree: &'t SyntaxTree,
    id: NodeId,
}

impl<'t> NodeRef<'t> {
    pub fn new(tree: &'t SyntaxTree, id: NodeId) -> Self {
        Self { tree, id }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn tree(&self) -> &'t SyntaxTree {
        self.tree
    }

    pub fn kind(&self) -> SyntaxKind {
        self.tree.data(self.id).kind
    }

    /// Full start: includes leading trivia.
    pub fn pos(&self) -> TextSize {
        self.tree.data(self.id).pos
    }

    /// First-token offset: leading trivia skipped.
    pub fn start(&self) -> TextSize {
        self.tree.data(self.id).start
    }

    pub fn end(&self) -> TextSize {
        self.tree.data(self.id).end
    }

    /// Half-open `[pos, end)` including leading trivia.
    pub fn range(&self) -> TextRange {
        let data = self.tree.data(self.id);
        TextRange::new(data.pos, data.end)
    }

    /// Half-open `[start, end)` over the node's own tokens.
    pub fn token_range(&self) -> TextRange {
        let data = self.tree.data(self.id);
        TextRange::new(data.start, data.end)
    }

    /// The node's token text (leading trivia excluded).
    pub fn text(&self) -> &'t str {
        let data = self.tree.data(self.id);
        &self.tree.text()[usize::from(data.start)..usize::from(data.end)]
    }

    /// Identifier or literal token text, when the parser recorded it.
    pub fn name(&self) -> Option<&'t str> {
        self.tree.data(self.id).name.as_deref()
    }

    pub fn parent(&self) -> Option<NodeRef<'t>> {
        self.tree
            .data(self.id)
            .parent
            .map(|p| NodeRef::new(self.tree, p))
    }

    pub fn child_ids(&self) -> &'t [NodeId] {
        &self.tree.data(self.id).children
    }

    pub fn children(&self) -> impl Iterator<Item = NodeRef<'t>> + '_ {
        let tree = self.tree;
        self.child_ids().iter().map(move |&c| NodeRef::new(tree, c))
    }

    pub fn child_count(&self) -> usize {
        self.child_ids().len()
    }

    /// Visit each structural child in order. Mirrors the host's
    /// `forEachStructuralChild` primitive.
    pub fn for_each_child(&self, mut visitor: impl FnMut(NodeRef<'t>)) {
        for child in self.children() {
            visitor(child);
        }
    }

    /// Container body range: inside the braces, or after the clause colon.
    /// The file root's body is the whole text.
    pub fn body(&self) -> Option<TextRange> {
        if self.kind() == SyntaxKind::SourceFile {
            return Some(TextRange::new(
                TextSize::new(0),
                TextSize::of(self.tree.text()),
            ));
        }
        self.tree.data(self.id).body
    }

    pub fn container_kind(&self) -> Option<ContainerKind> {
        self.kind().container_kind()
    }

    /// The comment-eligible child list: structural children whose first
    /// token falls inside the container body. For a class this excludes
    /// the name identifier; for a case clause it excludes the guard
    /// expression before the colon.
    pub fn container_children(&self) -> Vec<NodeId> {
        let Some(body) = self.body() else {
            return Vec::new();
        };
        self.children()
            .filter(|c| range_contains_offset(body, c.start()))
            .map(|c| c.id())
            .collect()
    }
}

impl std::fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:?}@{:?}..{:?}",
            self.kind(),
            u32::from(self.pos()),
            u32::from(self.end())
        )
    }
}
