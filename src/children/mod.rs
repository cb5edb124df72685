//! Augmented child sequences.
//!
//! A container's augmented children are its real children with comment
//! pseudo-nodes spliced in at their source positions. Sequences are
//! computed at most once per container per parse generation, cached, and
//! only ever invalidated wholesale by a reparse.

mod builder;
mod cache;

pub use builder::{AugmentedChildren, ChildSlot, build, collect_comments, merge_comments, splice_into};
pub use cache::ChildrenCache;
