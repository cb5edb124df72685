//! Incremental reconciliation of the facade tree after a reparse.
//!
//! An edit produces new text, the host reparses it, and one of the
//! strategies here rewrites the existing facade tree in place: wrappers
//! for unaffected nodes are rebound to their new-tree counterparts
//! (identity preserved), wrappers for removed nodes are forgotten, and
//! inserted nodes get fresh wrappers. The strategy is selected by the
//! kind of edit that produced the tree - the caller that performed the
//! edit knows which one applies - never by post-hoc diffing.
//!
//! Shape assumptions are load-bearing: when straight replacement meets a
//! kind or child-count mismatch, the caller picked the wrong strategy
//! for the edit it actually performed. That is an internal-consistency
//! defect and aborts; it is kept mechanically distinct from the
//! recoverable stale-reference path ([`crate::ForgottenNodeError`]).

mod engine;

pub use engine::reconcile;

use indexmap::IndexMap;

use crate::base::TextRange;
use crate::facade::FacadeNode;
use crate::syntax::NodeRef;

/// Signals the first point of difference between the old and new child
/// lists of the edited parent. Called with `(old_child, new_child)`
/// cursors during the lockstep walk.
pub type FirstChildPredicate = Box<dyn Fn(NodeRef<'_>, NodeRef<'_>) -> bool>;

/// Which edit produced the new tree.
///
/// Closed set, matched exhaustively by the engine. Parent references and
/// `replacing_nodes` are facade nodes of the outgoing generation;
/// `custom_mappings` pre-pair structural child indices (old -> new) that
/// the lockstep walk must not re-judge, applied in insertion order, and
/// explicit pairing takes precedence over the structural scan.
pub enum EditDescriptor {
    /// Default/fallback: the whole tree matches one-to-one.
    Straight,
    /// `count` new children appeared under `parent`.
    ChildInsertion {
        parent: FacadeNode,
        count: usize,
        first_child: FirstChildPredicate,
        replacing_nodes: Vec<FacadeNode>,
        custom_mappings: IndexMap<usize, usize>,
    },
    /// `count` old children disappeared from `parent`.
    ChildRemoval {
        parent: FacadeNode,
        count: usize,
        first_child: FirstChildPredicate,
        replacing_nodes: Vec<FacadeNode>,
        custom_mappings: IndexMap<usize, usize>,
    },
    /// Every new child positioned inside `range` is wholly new; children
    /// outside it match straight, in order.
    RangeReplacement { parent: FacadeNode, range: TextRange },
    /// One child of `parent` moved among otherwise-unchanged siblings.
    ChangeChildOrder {
        parent: FacadeNode,
        old_index: usize,
        new_index: usize,
    },
    /// The wrapping layer at `child_index` was removed and its contents
    /// spliced into `parent`.
    Unwrap {
        parent: FacadeNode,
        child_index: usize,
    },
    /// Conservative validating pass for edits with no structural
    /// knowledge: forget whatever no longer matches positionally.
    DisposeChanged,
}

impl EditDescriptor {
    /// Insertion with no pre-paired or superseded nodes.
    pub fn insertion(parent: FacadeNode, count: usize, first_child: FirstChildPredicate) -> Self {
        EditDescriptor::ChildInsertion {
            parent,
            count,
            first_child,
            replacing_nodes: Vec::new(),
            custom_mappings: IndexMap::new(),
        }
    }

    /// Removal with no pre-paired or superseded nodes.
    pub fn removal(parent: FacadeNode, count: usize, first_child: FirstChildPredicate) -> Self {
        EditDescriptor::ChildRemoval {
            parent,
            count,
            first_child,
            replacing_nodes: Vec::new(),
            custom_mappings: IndexMap::new(),
        }
    }

    pub(crate) fn strategy_name(&self) -> &'static str {
        match self {
            EditDescriptor::Straight => "straight",
            EditDescriptor::ChildInsertion { .. } => "child-insertion",
            EditDescriptor::ChildRemoval { .. } => "child-removal",
            EditDescriptor::RangeReplacement { .. } => "range-replacement",
            EditDescriptor::ChangeChildOrder { .. } => "change-child-order",
            EditDescriptor::Unwrap { .. } => "unwrap",
            EditDescriptor::DisposeChanged => "dispose-changed",
        }
    }
}

impl std::fmt::Debug for EditDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EditDescriptor::ChildInsertion { count, .. } => {
                write!(f, "ChildInsertion {{ count: {count} }}")
            }
            EditDescriptor::ChildRemoval { count, .. } => {
                write!(f, "ChildRemoval {{ count: {count} }}")
            }
            EditDescriptor::RangeReplacement { range, .. } => {
                write!(f, "RangeReplacement {{ range: {range:?} }}")
            }
            EditDescriptor::ChangeChildOrder {
                old_index,
                new_index,
                ..
            } => write!(
                f,
                "ChangeChildOrder {{ old_index: {old_index}, new_index: {new_index} }}"
            ),
            EditDescriptor::Unwrap { child_index, .. } => {
                write!(f, "Unwrap {{ child_index: {child_index} }}")
            }
            EditDescriptor::Straight => write!(f, "Straight"),
            EditDescriptor::DisposeChanged => write!(f, "DisposeChanged"),
        }
    }
}
