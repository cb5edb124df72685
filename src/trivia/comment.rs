//! Comment pseudo-node types.

use crate::base::TextRange;
use crate::syntax::ContainerKind;

/// Single-line (`//`) or multi-line (`/* */`) comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommentKind {
    Line,
    Block,
}

/// Which kind of child list a comment pseudo-node was synthesized into.
///
/// Chosen by the container's category, never by the comment itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommentContext {
    Statement,
    ClassMember,
    TypeMember,
    ObjectLiteralElement,
    EnumMember,
}

impl CommentContext {
    pub fn for_container(kind: ContainerKind) -> Self {
        match kind {
            ContainerKind::Statements => CommentContext::Statement,
            ContainerKind::ClassMembers => CommentContext::ClassMember,
            ContainerKind::TypeMembers => CommentContext::TypeMember,
            ContainerKind::EnumMembers => CommentContext::EnumMember,
            ContainerKind::ObjectLiteralElements => CommentContext::ObjectLiteralElement,
        }
    }
}

/// A synthesized comment node.
///
/// Has the same position/text-access contract as a raw node; owned by the
/// augmented-children cache entry that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentNode {
    range: TextRange,
    kind: CommentKind,
    doc: bool,
    context: CommentContext,
}

impl CommentNode {
    pub(crate) fn new(range: TextRange, kind: CommentKind, doc: bool, context: CommentContext) -> Self {
        Self {
            range,
            kind,
            doc,
            context,
        }
    }

    /// Half-open `[pos, end)` over the comment's own text.
    pub fn range(&self) -> TextRange {
        self.range
    }

    pub fn kind(&self) -> CommentKind {
        self.kind
    }

    /// Doc-style (`/** */`) rather than an ordinary comment.
    pub fn is_doc(&self) -> bool {
        self.doc
    }

    pub fn context(&self) -> CommentContext {
        self.context
    }

    /// Slice this comment's text out of the document text.
    pub fn text<'t>(&self, source: &'t str) -> &'t str {
        &source[usize::from(self.range.start())..usize::from(self.range.end())]
    }
}
