//! Per-container, per-generation sequence cache.

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::syntax::{Generation, NodeId, NodeRef, SyntaxTree};

use super::builder::{AugmentedChildren, build};

/// Caches one [`AugmentedChildren`] per container for the current parse
/// generation. Entries are never mutated; a reparse invalidates the
/// whole table.
#[derive(Debug, Default)]
pub struct ChildrenCache {
    generation: Generation,
    map: RwLock<FxHashMap<NodeId, Arc<AugmentedChildren>>>,
}

impl ChildrenCache {
    pub fn new(generation: Generation) -> Self {
        Self {
            generation,
            map: RwLock::new(FxHashMap::default()),
        }
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Fetch the cached sequence for `container`, computing it on first
    /// use in this generation.
    pub fn get_or_build(&self, tree: &SyntaxTree, container: NodeId) -> Arc<AugmentedChildren> {
        if let Some(cached) = self.map.read().get(&container) {
            return Arc::clone(cached);
        }
        let built = Arc::new(build(NodeRef::new(tree, container)));
        let mut map = self.map.write();
        // A racing reader may have built it meanwhile; first write wins
        // so callers keep seeing one allocation per container.
        Arc::clone(map.entry(container).or_insert(built))
    }

    /// Wholesale invalidation after a reparse.
    pub fn reset(&mut self, generation: Generation) {
        self.generation = generation;
        self.map.get_mut().clear();
    }
}
