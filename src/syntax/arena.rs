//! Arena storage for raw syntax nodes.
//!
//! Raw nodes form a bidirectional parent/child graph. To avoid
//! reference-counted cycles they live in a flat arena owned by the parse
//! result; everything else refers to them through [`NodeId`] handles. The
//! facade registry keys its wrappers by these handles.

use smol_str::SmolStr;

use crate::base::{FileId, TextRange, TextSize};

use super::kind::SyntaxKind;

/// Opaque handle to a node in a [`SyntaxArena`].
///
/// Handles are only meaningful against the arena (and so the parse
/// generation) that produced them; reconciliation is what carries facade
/// identity from one arena's handles to the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Monotone per-document parse counter.
///
/// Every augmented child sequence and facade binding is implicitly scoped
/// to the generation that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Generation(u32);

impl Generation {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// Storage for one node.
#[derive(Debug, Clone)]
pub(crate) struct NodeData {
    pub(crate) kind: SyntaxKind,
    /// Full start: includes leading trivia (end of the previous token).
    pub(crate) pos: TextSize,
    /// First-token offset: leading trivia skipped.
    pub(crate) start: TextSize,
    pub(crate) end: TextSize,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    /// For containers: the region between the opening brace and the
    /// closing brace (exclusive of both), or after the clause colon.
    pub(crate) body: Option<TextRange>,
    /// Token text for identifiers and literals.
    pub(crate) name: Option<SmolStr>,
}

/// Flat node storage for one parse generation.
#[derive(Debug, Default)]
pub struct SyntaxArena {
    nodes: Vec<NodeData>,
}

impl SyntaxArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub(crate) fn alloc(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(data);
        id
    }

    pub(crate) fn get(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.index()]
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.index()]
    }

    /// Iterate all node ids in allocation order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len() as u32).map(NodeId)
    }
}

/// One parse generation's tree: arena, root handle, and the text it was
/// parsed from. Immutable once produced.
#[derive(Debug)]
pub struct SyntaxTree {
    file: FileId,
    text: std::sync::Arc<str>,
    arena: SyntaxArena,
    root: NodeId,
}

impl SyntaxTree {
    pub fn new(file: FileId, text: std::sync::Arc<str>, arena: SyntaxArena, root: NodeId) -> Self {
        Self {
            file,
            text,
            arena,
            root,
        }
    }

    pub fn file(&self) -> FileId {
        self.file
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn text_arc(&self) -> std::sync::Arc<str> {
        std::sync::Arc::clone(&self.text)
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn arena(&self) -> &SyntaxArena {
        &self.arena
    }

    pub(crate) fn data(&self, id: NodeId) -> &NodeData {
        self.arena.get(id)
    }
}

/// Incremental constructor for a [`SyntaxTree`].
///
/// Children are allocated before their parent; adopting them sets the
/// parent pointer. Offsets are plain `u32`s for call-site brevity.
pub struct TreeBuilder {
    file: FileId,
    text: std::sync::Arc<str>,
    arena: SyntaxArena,
}

impl TreeBuilder {
    pub fn new(file: FileId, text: &str) -> Self {
        Self {
            file,
            text: std::sync::Arc::from(text),
            arena: SyntaxArena::new(),
        }
    }

    /// Allocate a leaf node (no children).
    pub fn leaf(&mut self, kind: SyntaxKind, pos: u32, start: u32, end: u32) -> NodeId {
        self.arena.alloc(NodeData {
            kind,
            pos: TextSize::new(pos),
            start: TextSize::new(start),
            end: TextSize::new(end),
            parent: None,
            children: Vec::new(),
            body: None,
            name: None,
        })
    }

    /// Allocate a leaf carrying its token text (identifiers, literals).
    pub fn leaf_named(
        &mut self,
        kind: SyntaxKind,
        pos: u32,
        start: u32,
        end: u32,
        name: &str,
    ) -> NodeId {
        let id = self.leaf(kind, pos, start, end);
        self.arena.get_mut(id).name = Some(SmolStr::new(name));
        id
    }

    /// Allocate an interior node, adopting `children` in order.
    pub fn node(
        &mut self,
        kind: SyntaxKind,
        pos: u32,
        start: u32,
        end: u32,
        children: Vec<NodeId>,
    ) -> NodeId {
        let id = self.arena.alloc(NodeData {
            kind,
            pos: TextSize::new(pos),
            start: TextSize::new(start),
            end: TextSize::new(end),
            parent: None,
            children,
            body: None,
            name: None,
        });
        let child_ids = self.arena.get(id).children.clone();
        for child in child_ids {
            self.arena.get_mut(child).parent = Some(id);
        }
        id
    }

    /// Allocate a container node with an explicit body range.
    #[allow(clippy::too_many_arguments)]
    pub fn container(
        &mut self,
        kind: SyntaxKind,
        pos: u32,
        start: u32,
        end: u32,
        body_start: u32,
        body_end: u32,
        children: Vec<NodeId>,
    ) -> NodeId {
        let id = self.node(kind, pos, start, end, children);
        self.arena.get_mut(id).body = Some(TextRange::new(
            TextSize::new(body_start),
            TextSize::new(body_end),
        ));
        id
    }

    pub fn finish(self, root: NodeId) -> SyntaxTree {
        SyntaxTree::new(self.file, self.text, self.arena, root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_sets_parents() {
        let text = "let a;";
        let mut b = TreeBuilder::new(FileId::new(0), text);
        let name = b.leaf_named(SyntaxKind::Identifier, 4, 4, 5, "a");
        let stmt = b.node(SyntaxKind::VariableStatement, 0, 0, 6, vec![name]);
        let root = b.node(SyntaxKind::SourceFile, 0, 0, 6, vec![stmt]);
        let tree = b.finish(root);

        assert_eq!(tree.data(name).parent, Some(stmt));
        assert_eq!(tree.data(stmt).parent, Some(root));
        assert_eq!(tree.data(root).parent, None);
        assert_eq!(tree.data(root).children, vec![stmt]);
    }

    #[test]
    fn test_generation_is_monotone() {
        let g = Generation::default();
        assert_eq!(g.raw(), 0);
        assert_eq!(g.next().raw(), 1);
        assert!(g < g.next());
    }
}
