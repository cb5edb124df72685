//! Building augmented child sequences.

use crate::syntax::{NodeId, NodeRef, SyntaxKind, SyntaxTree};
use crate::trivia::{CommentContext, CommentNode, scan_gap};

/// One entry of an augmented sequence: a real child or a synthesized
/// comment.
#[derive(Debug, Clone, PartialEq)]
pub enum ChildSlot {
    Node(NodeId),
    Comment(CommentNode),
}

impl ChildSlot {
    pub fn as_node(&self) -> Option<NodeId> {
        match self {
            ChildSlot::Node(id) => Some(*id),
            ChildSlot::Comment(_) => None,
        }
    }

    pub fn as_comment(&self) -> Option<&CommentNode> {
        match self {
            ChildSlot::Node(_) => None,
            ChildSlot::Comment(c) => Some(c),
        }
    }
}

/// An ordered, immutable augmented child sequence for one container in
/// one parse generation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AugmentedChildren {
    slots: Vec<ChildSlot>,
}

impl AugmentedChildren {
    pub fn slots(&self) -> &[ChildSlot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChildSlot> {
        self.slots.iter()
    }

    /// Real children only, comments skipped.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.slots.iter().filter_map(ChildSlot::as_node)
    }

    /// Comment pseudo-nodes only.
    pub fn comments(&self) -> impl Iterator<Item = &CommentNode> {
        self.slots.iter().filter_map(ChildSlot::as_comment)
    }
}

/// Build the augmented sequence for `container` by structural descent.
///
/// Non-containers get their real children back unaugmented.
pub fn build(container: NodeRef<'_>) -> AugmentedChildren {
    let Some(category) = container.container_kind() else {
        return AugmentedChildren {
            slots: container.child_ids().iter().map(|&c| ChildSlot::Node(c)).collect(),
        };
    };
    let context = CommentContext::for_container(category);
    let real = container.container_children();
    let comments = collect_comments(container, context, &real);
    AugmentedChildren {
        slots: merge_comments(container.tree(), &real, comments),
    }
}

/// The already-materialized retrieval strategy: the caller holds a
/// position-ordered child slice (for example from a previous structural
/// descent) and wants the comments spliced in without re-descending.
pub fn splice_into(container: NodeRef<'_>, materialized: &[NodeId]) -> Vec<ChildSlot> {
    let Some(category) = container.container_kind() else {
        return materialized.iter().map(|&c| ChildSlot::Node(c)).collect();
    };
    let context = CommentContext::for_container(category);
    let comments = collect_comments(container, context, materialized);
    merge_comments(container.tree(), materialized, comments)
}

/// Run the scanner over every gap of `container` and collect the kept
/// comments in ascending order.
///
/// The body-start rule: 0 for the whole file, just after the opening
/// brace for brace-delimited containers, just after the colon for
/// clause-style containers - all three are recorded as the container's
/// body range by the parser.
pub fn collect_comments(
    container: NodeRef<'_>,
    context: CommentContext,
    real: &[NodeId],
) -> Vec<CommentNode> {
    let tree = container.tree();
    let text = tree.text();
    let Some(body) = container.body() else {
        return Vec::new();
    };

    let mut out = Vec::new();
    if real.is_empty() {
        // Nothing follows to claim doc comments; capture them too.
        scan_gap(
            text,
            body.start(),
            body.end(),
            false,
            container.kind() != SyntaxKind::SourceFile,
            context,
            &mut out,
        );
        return out;
    }

    let mut prev_end = body.start();
    for &child in real {
        let child = NodeRef::new(tree, child);
        scan_gap(
            text,
            prev_end,
            child.start(),
            true,
            u32::from(prev_end) != 0,
            context,
            &mut out,
        );
        prev_end = child.end();
    }
    scan_gap(text, prev_end, body.end(), false, true, context, &mut out);
    out
}

/// Splice `comments` into `real` with a single forward-moving cursor over
/// both sequences. Comments order against a real child's first-token
/// offset (a child's full start may reach back over the very comments
/// being spliced in front of it). Linear time; never rescans.
pub fn merge_comments(
    tree: &SyntaxTree,
    real: &[NodeId],
    comments: Vec<CommentNode>,
) -> Vec<ChildSlot> {
    let mut slots = Vec::with_capacity(real.len() + comments.len());
    let mut comments = comments.into_iter().peekable();
    for &child in real {
        let child_start = NodeRef::new(tree, child).start();
        while let Some(comment) = comments.next_if(|c| c.range().start() < child_start) {
            slots.push(ChildSlot::Comment(comment));
        }
        slots.push(ChildSlot::Node(child));
    }
    slots.extend(comments.map(ChildSlot::Comment));
    slots
}
