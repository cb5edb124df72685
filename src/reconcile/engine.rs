//! The reconciliation engine.

use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, trace};

use crate::base::range_contains_offset;
use crate::facade::{FacadeNode, ForgottenNodeError, Registry};
use crate::syntax::{Generation, NodeId, NodeRef, SyntaxKind, SyntaxTree};

use super::{EditDescriptor, FirstChildPredicate};

/// Rewrite the facade bindings of `registry` so the tree of the outgoing
/// generation becomes consistent with `new_tree`, preserving wrapper
/// identity wherever the selected strategy allows.
///
/// Returns the recoverable stale-reference error when the descriptor
/// names an already-forgotten facade node. Shape violations abort: they
/// signal that an edit bypassed the specialized strategy it should have
/// used.
pub fn reconcile(
    old_tree: &SyntaxTree,
    new_tree: &SyntaxTree,
    registry: &mut Registry,
    generation: Generation,
    descriptor: &EditDescriptor,
) -> Result<(), ForgottenNodeError> {
    debug!(
        strategy = descriptor.strategy_name(),
        generation = generation.raw(),
        "reconciling facade tree"
    );

    // Resolve every outgoing-generation reference before touching the
    // registry, so a stale descriptor leaves it untouched.
    let resolved = Resolved::from_descriptor(descriptor)?;

    let mut engine = Engine {
        old_tree,
        new_tree,
        old_bindings: registry.drain(),
        registry,
        generation,
    };

    match (descriptor, resolved) {
        (EditDescriptor::Straight, _) => {
            engine.straight(old_tree.root(), new_tree.root());
        }
        (EditDescriptor::DisposeChanged, _) => {
            engine.dispose_changed(old_tree.root(), new_tree.root());
        }
        (
            EditDescriptor::ChildInsertion {
                count,
                first_child,
                custom_mappings,
                ..
            },
            Resolved::Parent { parent, replacing },
        ) => {
            engine.at_parent(parent, |engine, old_parent, new_parent| {
                engine.default_parent(
                    old_parent,
                    new_parent,
                    ChildDelta::Insert(*count),
                    first_child,
                    &replacing,
                    custom_mappings,
                );
            });
        }
        (
            EditDescriptor::ChildRemoval {
                count,
                first_child,
                custom_mappings,
                ..
            },
            Resolved::Parent { parent, replacing },
        ) => {
            engine.at_parent(parent, |engine, old_parent, new_parent| {
                engine.default_parent(
                    old_parent,
                    new_parent,
                    ChildDelta::Remove(*count),
                    first_child,
                    &replacing,
                    custom_mappings,
                );
            });
        }
        (EditDescriptor::RangeReplacement { range, .. }, Resolved::Parent { parent, .. }) => {
            engine.at_parent(parent, |engine, old_parent, new_parent| {
                engine.range_parent(old_parent, new_parent, *range);
            });
        }
        (
            EditDescriptor::ChangeChildOrder {
                old_index,
                new_index,
                ..
            },
            Resolved::Parent { parent, .. },
        ) => {
            engine.at_parent(parent, |engine, old_parent, new_parent| {
                engine.change_child_order(old_parent, new_parent, *old_index, *new_index);
            });
        }
        (EditDescriptor::Unwrap { child_index, .. }, Resolved::Parent { parent, .. }) => {
            engine.at_parent(parent, |engine, old_parent, new_parent| {
                engine.unwrap_parent(old_parent, new_parent, *child_index);
            });
        }
        _ => unreachable!("descriptor/resolution mismatch"),
    }

    engine.finish();
    Ok(())
}

/// Outgoing-generation references resolved to raw handles up front.
enum Resolved {
    Whole,
    Parent {
        parent: NodeId,
        replacing: FxHashSet<NodeId>,
    },
}

impl Resolved {
    fn from_descriptor(descriptor: &EditDescriptor) -> Result<Self, ForgottenNodeError> {
        let (parent, replacing) = match descriptor {
            EditDescriptor::Straight | EditDescriptor::DisposeChanged => {
                return Ok(Resolved::Whole);
            }
            EditDescriptor::ChildInsertion {
                parent,
                replacing_nodes,
                ..
            }
            | EditDescriptor::ChildRemoval {
                parent,
                replacing_nodes,
                ..
            } => (parent, replacing_nodes.as_slice()),
            EditDescriptor::RangeReplacement { parent, .. }
            | EditDescriptor::ChangeChildOrder { parent, .. }
            | EditDescriptor::Unwrap { parent, .. } => (parent, &[] as &[FacadeNode]),
        };
        Ok(Resolved::Parent {
            parent: parent.bound_id()?,
            replacing: replacing
                .iter()
                .map(FacadeNode::bound_id)
                .collect::<Result<_, _>>()?,
        })
    }
}

#[derive(Debug, Clone, Copy)]
enum ChildDelta {
    Insert(usize),
    Remove(usize),
}

struct Engine<'a> {
    old_tree: &'a SyntaxTree,
    new_tree: &'a SyntaxTree,
    old_bindings: FxHashMap<NodeId, FacadeNode>,
    registry: &'a mut Registry,
    generation: Generation,
}

impl Engine<'_> {
    fn old(&self, id: NodeId) -> NodeRef<'_> {
        NodeRef::new(self.old_tree, id)
    }

    fn new_node(&self, id: NodeId) -> NodeRef<'_> {
        NodeRef::new(self.new_tree, id)
    }

    /// Identity-preserving rebind of one node's wrapper, if it has one.
    fn rebind(&mut self, old: NodeId, new: NodeId) {
        if let Some(facade) = self.old_bindings.remove(&old) {
            let new_ref = NodeRef::new(self.new_tree, new);
            facade.rebind(new, self.generation, new_ref.kind());
            self.registry.insert_bound(new, facade);
        }
    }

    /// Eagerly bind a wrapper for an inserted node, attaching it to the
    /// owning file's registry.
    fn fresh_bind(&mut self, new: NodeId) {
        let node = NodeRef::new(self.new_tree, new);
        self.registry.get_or_create(node, self.generation);
    }

    fn forget_node_only(&mut self, old: NodeId) {
        if let Some(facade) = self.old_bindings.remove(&old) {
            facade.mark_forgotten();
        }
    }

    fn forget_subtree(&mut self, old: NodeId) {
        self.forget_node_only(old);
        let children = self.old(old).child_ids().to_vec();
        for child in children {
            self.forget_subtree(child);
        }
    }

    /// Any outgoing binding not rebound by the strategy belongs to a raw
    /// node that no longer exists in the new tree.
    fn finish(&mut self) {
        if !self.old_bindings.is_empty() {
            trace!(
                leftover = self.old_bindings.len(),
                "forgetting bindings with no counterpart"
            );
        }
        for (_, facade) in self.old_bindings.drain() {
            facade.mark_forgotten();
        }
    }

    // ------------------------------------------------------------------
    // Straight replacement
    // ------------------------------------------------------------------

    /// Pair `old` and `new` one-to-one, recursively. Any mismatch here is
    /// an internal-consistency defect, never recovered.
    fn straight(&mut self, old: NodeId, new: NodeId) {
        let old_ref = self.old(old);
        let new_ref = self.new_node(new);
        if old_ref.kind() != new_ref.kind() {
            shape_violation(format_args!(
                "kind mismatch: {:?} paired with {:?}",
                old_ref.kind(),
                new_ref.kind()
            ));
        }
        let old_children = old_ref.child_ids().to_vec();
        let new_children = new_ref.child_ids().to_vec();
        if old_children.len() != new_children.len() {
            shape_violation(format_args!(
                "child count mismatch under {:?}: {} paired with {}",
                old_ref.kind(),
                old_children.len(),
                new_children.len()
            ));
        }
        self.rebind(old, new);
        for (o, n) in old_children.into_iter().zip(new_children) {
            self.straight(o, n);
        }
    }

    // ------------------------------------------------------------------
    // Parent finding
    // ------------------------------------------------------------------

    /// Straight-replace the path from the roots down to `target`, then
    /// apply `handler` at the edited parent.
    fn at_parent(
        &mut self,
        target: NodeId,
        handler: impl FnOnce(&mut Self, NodeId, NodeId),
    ) {
        let mut path = vec![target];
        let mut cursor = self.old(target);
        while let Some(parent) = cursor.parent() {
            path.push(parent.id());
            cursor = parent;
        }
        path.reverse();
        if path[0] != self.old_tree.root() {
            shape_violation(format_args!("edited parent is not reachable from the root"));
        }

        let mut old_id = self.old_tree.root();
        let mut new_id = self.new_tree.root();
        for next in &path[1..] {
            let old_ref = self.old(old_id);
            let new_ref = self.new_node(new_id);
            if old_ref.kind() != new_ref.kind() || old_ref.child_count() != new_ref.child_count()
            {
                shape_violation(format_args!(
                    "tree shape changed above the edited parent ({:?})",
                    old_ref.kind()
                ));
            }
            let old_children = old_ref.child_ids().to_vec();
            let new_children = new_ref.child_ids().to_vec();
            self.rebind(old_id, new_id);

            let index = old_children
                .iter()
                .position(|c| c == next)
                .unwrap_or_else(|| {
                    shape_violation(format_args!("edited parent detached from its ancestor"))
                });
            for (i, (o, n)) in old_children.iter().zip(&new_children).enumerate() {
                if i != index {
                    self.straight(*o, *n);
                }
            }
            old_id = *next;
            new_id = new_children[index];
        }
        handler(self, old_id, new_id);
    }

    // ------------------------------------------------------------------
    // Default parent handler (insertion / removal)
    // ------------------------------------------------------------------

    fn default_parent(
        &mut self,
        old_parent: NodeId,
        new_parent: NodeId,
        delta: ChildDelta,
        first_child: &FirstChildPredicate,
        replacing: &FxHashSet<NodeId>,
        custom_mappings: &IndexMap<usize, usize>,
    ) {
        let old_ref = self.old(old_parent);
        let new_ref = self.new_node(new_parent);
        if old_ref.kind() != new_ref.kind() {
            shape_violation(format_args!(
                "edited parent changed kind: {:?} paired with {:?}",
                old_ref.kind(),
                new_ref.kind()
            ));
        }
        let old_children = old_ref.child_ids().to_vec();
        let new_children = new_ref.child_ids().to_vec();
        self.rebind(old_parent, new_parent);

        // Explicit pairing first; paired children leave the scan.
        let mut old_taken = vec![false; old_children.len()];
        let mut new_taken = vec![false; new_children.len()];
        for (&old_index, &new_index) in custom_mappings {
            if old_index >= old_children.len() || new_index >= new_children.len() {
                shape_violation(format_args!(
                    "custom mapping ({old_index}, {new_index}) is out of bounds"
                ));
            }
            self.straight(old_children[old_index], new_children[new_index]);
            old_taken[old_index] = true;
            new_taken[new_index] = true;
        }

        // Superseded nodes are disposed wherever encountered, never
        // matched; explicit replacement wins over the structural scan.
        let mut old_list = Vec::with_capacity(old_children.len());
        for (index, &child) in old_children.iter().enumerate() {
            if old_taken[index] {
                continue;
            }
            if replacing.contains(&child) {
                self.forget_subtree(child);
            } else {
                old_list.push(child);
            }
        }
        let new_list: Vec<NodeId> = new_children
            .iter()
            .enumerate()
            .filter(|(index, _)| !new_taken[*index])
            .map(|(_, &child)| child)
            .collect();

        // Lockstep straight replacement until the first point of
        // difference, then apply the delta and resume.
        let mut pending = Some(delta);
        let mut i = 0;
        let mut j = 0;
        while i < old_list.len() && j < new_list.len() {
            if let Some(delta) = pending {
                if first_child(self.old(old_list[i]), self.new_node(new_list[j])) {
                    self.apply_delta(delta, &old_list, &new_list, &mut i, &mut j);
                    pending = None;
                    continue;
                }
            }
            self.straight(old_list[i], new_list[j]);
            i += 1;
            j += 1;
        }
        // A difference at the very end is reached with one side
        // exhausted rather than via the predicate.
        if let Some(delta) = pending {
            self.apply_delta(delta, &old_list, &new_list, &mut i, &mut j);
            while i < old_list.len() && j < new_list.len() {
                self.straight(old_list[i], new_list[j]);
                i += 1;
                j += 1;
            }
        }
        if i != old_list.len() || j != new_list.len() {
            shape_violation(format_args!(
                "child lists out of balance after edit: {} old and {} new children unmatched",
                old_list.len() - i,
                new_list.len() - j
            ));
        }
    }

    fn apply_delta(
        &mut self,
        delta: ChildDelta,
        old_list: &[NodeId],
        new_list: &[NodeId],
        i: &mut usize,
        j: &mut usize,
    ) {
        match delta {
            ChildDelta::Insert(count) => {
                if *j + count > new_list.len() {
                    shape_violation(format_args!(
                        "insertion of {count} children exceeds the new child list"
                    ));
                }
                for &inserted in &new_list[*j..*j + count] {
                    self.fresh_bind(inserted);
                }
                *j += count;
            }
            ChildDelta::Remove(count) => {
                if *i + count > old_list.len() {
                    shape_violation(format_args!(
                        "removal of {count} children exceeds the old child list"
                    ));
                }
                for index in *i..*i + count {
                    self.forget_subtree(old_list[index]);
                }
                *i += count;
            }
        }
    }

    // ------------------------------------------------------------------
    // Range parent handler
    // ------------------------------------------------------------------

    fn range_parent(
        &mut self,
        old_parent: NodeId,
        new_parent: NodeId,
        range: crate::base::TextRange,
    ) {
        let old_ref = self.old(old_parent);
        let new_ref = self.new_node(new_parent);
        if old_ref.kind() != new_ref.kind() {
            shape_violation(format_args!(
                "edited parent changed kind: {:?} paired with {:?}",
                old_ref.kind(),
                new_ref.kind()
            ));
        }
        let old_children = old_ref.child_ids().to_vec();
        let new_children = new_ref.child_ids().to_vec();
        self.rebind(old_parent, new_parent);

        let mut outside = Vec::with_capacity(old_children.len());
        for &child in &new_children {
            let start = self.new_node(child).start();
            if range_contains_offset(range, start) {
                self.fresh_bind(child);
            } else {
                outside.push(child);
            }
        }
        if outside.len() != old_children.len() {
            shape_violation(format_args!(
                "children outside the replaced range do not pair up: {} old, {} new",
                old_children.len(),
                outside.len()
            ));
        }
        for (o, n) in old_children.into_iter().zip(outside) {
            self.straight(o, n);
        }
    }

    // ------------------------------------------------------------------
    // Child order handler
    // ------------------------------------------------------------------

    fn change_child_order(
        &mut self,
        old_parent: NodeId,
        new_parent: NodeId,
        old_index: usize,
        new_index: usize,
    ) {
        let old_ref = self.old(old_parent);
        let new_ref = self.new_node(new_parent);
        if old_ref.kind() != new_ref.kind() {
            shape_violation(format_args!(
                "edited parent changed kind: {:?} paired with {:?}",
                old_ref.kind(),
                new_ref.kind()
            ));
        }
        let mut old_children = old_ref.child_ids().to_vec();
        let new_children = new_ref.child_ids().to_vec();
        if old_index >= old_children.len() || new_index >= old_children.len() {
            shape_violation(format_args!(
                "child order move ({old_index} -> {new_index}) is out of bounds for {} children",
                old_children.len()
            ));
        }
        self.rebind(old_parent, new_parent);

        // Identity follows the moved semantic child, not the position.
        let moved = old_children.remove(old_index);
        old_children.insert(new_index, moved);

        if old_children.len() != new_children.len() {
            shape_violation(format_args!(
                "child count changed during a reorder: {} paired with {}",
                old_children.len(),
                new_children.len()
            ));
        }
        for (o, n) in old_children.into_iter().zip(new_children) {
            self.straight(o, n);
        }
    }

    // ------------------------------------------------------------------
    // Unwrap handler
    // ------------------------------------------------------------------

    fn unwrap_parent(&mut self, old_parent: NodeId, new_parent: NodeId, child_index: usize) {
        let old_ref = self.old(old_parent);
        let new_ref = self.new_node(new_parent);
        if old_ref.kind() != new_ref.kind() {
            shape_violation(format_args!(
                "edited parent changed kind: {:?} paired with {:?}",
                old_ref.kind(),
                new_ref.kind()
            ));
        }
        let old_children = old_ref.child_ids().to_vec();
        let new_children = new_ref.child_ids().to_vec();
        if child_index >= old_children.len() {
            shape_violation(format_args!(
                "unwrap index {child_index} is out of bounds for {} children",
                old_children.len()
            ));
        }
        self.rebind(old_parent, new_parent);

        let wrapper = old_children[child_index];
        let wrapper_ref = self.old(wrapper);

        // The spliced nodes: a bare container (a block statement) splices
        // its own children; a declaration carrying a body container (a
        // module) splices the body's children, and the body node goes
        // down with the wrapper.
        let (spliced, shell_body) = if wrapper_ref.kind().is_container() {
            (wrapper_ref.container_children(), None)
        } else if let Some(body) = wrapper_ref.children().find(|c| {
            matches!(c.kind(), SyntaxKind::Block | SyntaxKind::ModuleBlock)
        }) {
            (body.child_ids().to_vec(), Some(body.id()))
        } else {
            (wrapper_ref.child_ids().to_vec(), None)
        };

        if new_children.len() != old_children.len() - 1 + spliced.len() {
            shape_violation(format_args!(
                "unwrapped child list does not line up: expected {} new children, found {}",
                old_children.len() - 1 + spliced.len(),
                new_children.len()
            ));
        }

        // Dispose the wrapper shell: the wrapper itself, its body node
        // when present, and any non-spliced children (a module's name).
        self.forget_node_only(wrapper);
        let spliced_set: FxHashSet<NodeId> = spliced.iter().copied().collect();
        let wrapper_children = self.old(wrapper).child_ids().to_vec();
        for child in wrapper_children {
            if Some(child) == shell_body {
                self.forget_node_only(child);
            } else if !spliced_set.contains(&child) {
                self.forget_subtree(child);
            }
        }

        for index in 0..child_index {
            self.straight(old_children[index], new_children[index]);
        }
        for (offset, &grandchild) in spliced.iter().enumerate() {
            self.straight(grandchild, new_children[child_index + offset]);
        }
        for index in child_index + 1..old_children.len() {
            self.straight(
                old_children[index],
                new_children[index - 1 + spliced.len()],
            );
        }
    }

    // ------------------------------------------------------------------
    // Dispose-changed handler
    // ------------------------------------------------------------------

    /// Conservative validating pass: rebind positional matches, forget
    /// everything whose kind no longer lines up.
    fn dispose_changed(&mut self, old: NodeId, new: NodeId) {
        let old_ref = self.old(old);
        let new_ref = self.new_node(new);
        if old_ref.kind() != new_ref.kind() {
            self.forget_subtree(old);
            return;
        }
        let old_children = old_ref.child_ids().to_vec();
        let new_children = new_ref.child_ids().to_vec();
        self.rebind(old, new);

        let paired = old_children.len().min(new_children.len());
        for index in 0..paired {
            self.dispose_changed(old_children[index], new_children[index]);
        }
        for &dropped in &old_children[paired..] {
            self.forget_subtree(dropped);
        }
    }
}

#[track_caller]
fn shape_violation(message: std::fmt::Arguments<'_>) -> ! {
    panic!("reconciliation shape violation: {message}")
}
