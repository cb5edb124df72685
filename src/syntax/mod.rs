//! Raw syntax model at the parser boundary.
//!
//! The external parser produces an immutable tree of raw nodes for each
//! parse generation. This module defines how that tree is represented on
//! our side of the seam:
//!
//! - [`SyntaxKind`] / [`ContainerKind`] - closed kind and category enums
//! - [`SyntaxArena`], [`NodeId`] - externally-owned node storage with
//!   opaque index handles (raw nodes are never reference-counted)
//! - [`SyntaxTree`] - one parse generation's arena, root, and text
//! - [`NodeRef`] - a borrowed cursor exposing the structural primitives
//!   (`kind`, `pos`, `end`, `parent`, child iteration)
//!
//! Nothing in this module is mutated after a parse completes; an edit
//! replaces the whole tree and the reconciliation layer re-keys wrappers
//! against the replacement.

mod arena;
mod kind;
mod node;

pub use arena::{Generation, NodeId, SyntaxArena, SyntaxTree, TreeBuilder};
pub use kind::{ContainerKind, SyntaxKind};
pub use node::NodeRef;
