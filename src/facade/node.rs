//! Facade node handles.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::base::{FileId, TextRange};
use crate::syntax::{Generation, NodeId, SyntaxKind};
use crate::trivia::{CommentContext, CommentKind, CommentNode};

use super::error::ForgottenNodeError;

#[derive(Debug)]
enum BindState {
    Bound {
        node: NodeId,
        generation: Generation,
        kind: SyntaxKind,
    },
    Forgotten {
        kind: SyntaxKind,
    },
}

#[derive(Debug)]
struct FacadeData {
    file: FileId,
    state: RwLock<BindState>,
}

/// The externally visible wrapper for one raw node.
///
/// Cheap to clone; all clones share identity ([`FacadeNode::ptr_eq`]).
/// The wrapper outlives any single parse generation: reconciliation
/// swaps the raw node it delegates to, and forgetting it makes every
/// subsequent operation fail with [`ForgottenNodeError`] instead of
/// silently serving stale data.
#[derive(Debug, Clone)]
pub struct FacadeNode {
    data: Arc<FacadeData>,
}

impl FacadeNode {
    pub(crate) fn bind(file: FileId, node: NodeId, generation: Generation, kind: SyntaxKind) -> Self {
        Self {
            data: Arc::new(FacadeData {
                file,
                state: RwLock::new(BindState::Bound {
                    node,
                    generation,
                    kind,
                }),
            }),
        }
    }

    /// Reference identity: do two handles denote the same wrapper?
    pub fn ptr_eq(a: &FacadeNode, b: &FacadeNode) -> bool {
        Arc::ptr_eq(&a.data, &b.data)
    }

    pub fn file(&self) -> FileId {
        self.data.file
    }

    pub fn is_forgotten(&self) -> bool {
        matches!(*self.data.state.read(), BindState::Forgotten { .. })
    }

    /// Kind of the bound raw node.
    pub fn kind(&self) -> Result<SyntaxKind, ForgottenNodeError> {
        match *self.data.state.read() {
            BindState::Bound { kind, .. } => Ok(kind),
            BindState::Forgotten { kind } => Err(self.forgotten(kind)),
        }
    }

    /// Generation the wrapper is currently bound into.
    pub fn generation(&self) -> Result<Generation, ForgottenNodeError> {
        match *self.data.state.read() {
            BindState::Bound { generation, .. } => Ok(generation),
            BindState::Forgotten { kind } => Err(self.forgotten(kind)),
        }
    }

    /// The raw handle this wrapper currently delegates to.
    pub(crate) fn bound_id(&self) -> Result<NodeId, ForgottenNodeError> {
        match *self.data.state.read() {
            BindState::Bound { node, .. } => Ok(node),
            BindState::Forgotten { kind } => Err(self.forgotten(kind)),
        }
    }

    /// Swap the delegated raw node without changing wrapper identity.
    pub(crate) fn rebind(&self, node: NodeId, generation: Generation, kind: SyntaxKind) {
        *self.data.state.write() = BindState::Bound {
            node,
            generation,
            kind,
        };
    }

    /// Flip to the forgotten state. Idempotent at this level; the
    /// registry is responsible for cache eviction.
    pub(crate) fn mark_forgotten(&self) {
        let mut state = self.data.state.write();
        let kind = match *state {
            BindState::Bound { kind, .. } => kind,
            BindState::Forgotten { kind } => kind,
        };
        *state = BindState::Forgotten { kind };
    }

    fn forgotten(&self, kind: SyntaxKind) -> ForgottenNodeError {
        ForgottenNodeError {
            kind,
            file: self.data.file,
        }
    }
}

/// Facade view of a comment pseudo-node.
///
/// Self-contained: carries the document text of the generation that
/// produced it, so accessors need no context and cannot dangle. Like the
/// pseudo-node it wraps, it lives only as long as one cache entry is
/// interesting to the caller; it is never registered for reconciliation.
#[derive(Debug, Clone)]
pub struct CommentFacadeNode {
    file: FileId,
    generation: Generation,
    text: Arc<str>,
    comment: CommentNode,
}

impl CommentFacadeNode {
    pub(crate) fn new(
        file: FileId,
        generation: Generation,
        text: Arc<str>,
        comment: CommentNode,
    ) -> Self {
        Self {
            file,
            generation,
            text,
            comment,
        }
    }

    pub fn file(&self) -> FileId {
        self.file
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn range(&self) -> TextRange {
        self.comment.range()
    }

    pub fn kind(&self) -> CommentKind {
        self.comment.kind()
    }

    pub fn is_doc(&self) -> bool {
        self.comment.is_doc()
    }

    pub fn context(&self) -> CommentContext {
        self.comment.context()
    }

    pub fn text(&self) -> &str {
        self.comment.text(&self.text)
    }
}

/// One entry of an augmented child sequence as seen by callers.
#[derive(Debug, Clone)]
pub enum FacadeElement {
    Node(FacadeNode),
    Comment(CommentFacadeNode),
}

impl FacadeElement {
    pub fn as_node(&self) -> Option<&FacadeNode> {
        match self {
            FacadeElement::Node(node) => Some(node),
            FacadeElement::Comment(_) => None,
        }
    }

    pub fn as_comment(&self) -> Option<&CommentFacadeNode> {
        match self {
            FacadeElement::Node(_) => None,
            FacadeElement::Comment(comment) => Some(comment),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::TextSize;

    #[test]
    fn test_clone_shares_identity() {
        let node = FacadeNode::bind(
            FileId::new(0),
            NodeId::from_raw(1),
            Generation::default(),
            SyntaxKind::Block,
        );
        let clone = node.clone();
        assert!(FacadeNode::ptr_eq(&node, &clone));

        let other = FacadeNode::bind(
            FileId::new(0),
            NodeId::from_raw(1),
            Generation::default(),
            SyntaxKind::Block,
        );
        assert!(!FacadeNode::ptr_eq(&node, &other));
    }

    #[test]
    fn test_rebind_preserves_identity_and_updates_binding() {
        let node = FacadeNode::bind(
            FileId::new(0),
            NodeId::from_raw(1),
            Generation::default(),
            SyntaxKind::VariableStatement,
        );
        let held = node.clone();

        node.rebind(NodeId::from_raw(9), Generation::new(1), SyntaxKind::VariableStatement);
        assert!(FacadeNode::ptr_eq(&node, &held));
        assert_eq!(held.bound_id().unwrap(), NodeId::from_raw(9));
        assert_eq!(held.generation().unwrap(), Generation::new(1));
    }

    #[test]
    fn test_forgotten_operations_fail() {
        let node = FacadeNode::bind(
            FileId::new(2),
            NodeId::from_raw(1),
            Generation::default(),
            SyntaxKind::EnumDeclaration,
        );
        node.mark_forgotten();

        assert!(node.is_forgotten());
        let err = node.kind().unwrap_err();
        assert_eq!(err.kind, SyntaxKind::EnumDeclaration);
        assert_eq!(err.file, FileId::new(2));
        assert!(node.bound_id().is_err());
        assert!(node.generation().is_err());
    }

    #[test]
    fn test_comment_facade_text() {
        let source: Arc<str> = Arc::from("x;\n// tail");
        let comment = CommentNode::new(
            TextRange::new(TextSize::new(3), TextSize::new(10)),
            CommentKind::Line,
            false,
            CommentContext::Statement,
        );
        let facade = CommentFacadeNode::new(FileId::new(0), Generation::default(), source, comment);
        assert_eq!(facade.text(), "// tail");
        assert_eq!(facade.kind(), CommentKind::Line);
        assert!(!facade.is_doc());
    }
}
