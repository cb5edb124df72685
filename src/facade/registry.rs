//! Identity-keyed wrapper registry.

use rustc_hash::FxHashMap;

use crate::base::FileId;
use crate::syntax::{Generation, NodeId, NodeRef};

use super::error::ForgottenNodeError;
use super::node::FacadeNode;

/// One facade wrapper per live raw node, keyed by raw-node identity.
///
/// Handles are only meaningful within one parse generation; after a
/// reparse the reconciliation engine drains the table and re-inserts
/// surviving wrappers under their new-generation keys.
#[derive(Debug, Default)]
pub struct Registry {
    file: FileId,
    map: FxHashMap<NodeId, FacadeNode>,
}

impl Registry {
    pub fn new(file: FileId) -> Self {
        Self {
            file,
            map: FxHashMap::default(),
        }
    }

    pub fn file(&self) -> FileId {
        self.file
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Fetch the wrapper for `node`, creating it lazily on first
    /// navigation. Many-to-one is never allowed: a second call with the
    /// same handle returns the identical wrapper.
    pub fn get_or_create(&mut self, node: NodeRef<'_>, generation: Generation) -> FacadeNode {
        self.map
            .entry(node.id())
            .or_insert_with(|| FacadeNode::bind(self.file, node.id(), generation, node.kind()))
            .clone()
    }

    /// The wrapper currently bound to `node`, if one was ever navigated
    /// to.
    pub fn get(&self, node: NodeId) -> Option<FacadeNode> {
        self.map.get(&node).cloned()
    }

    /// Dispose a wrapper: evict its cache entry and flip it so every
    /// later operation fails with [`ForgottenNodeError`].
    pub fn forget(&mut self, facade: &FacadeNode) -> Result<(), ForgottenNodeError> {
        let id = facade.bound_id()?;
        let is_cached = self
            .map
            .get(&id)
            .is_some_and(|entry| FacadeNode::ptr_eq(entry, facade));
        if is_cached {
            self.map.remove(&id);
        }
        facade.mark_forgotten();
        Ok(())
    }

    /// Rebind `facade` to a raw node of the new generation, re-keying its
    /// cache entry. Wrapper identity is untouched; this is how "the same
    /// object, now pointing at fresher data" is achieved across an edit.
    pub fn rebind(&mut self, facade: &FacadeNode, node: NodeRef<'_>, generation: Generation) {
        if let Ok(old_id) = facade.bound_id() {
            self.map.remove(&old_id);
        }
        facade.rebind(node.id(), generation, node.kind());
        self.map.insert(node.id(), facade.clone());
    }

    /// Take every binding of the outgoing generation, leaving the table
    /// empty for the reconciliation engine to repopulate.
    pub(crate) fn drain(&mut self) -> FxHashMap<NodeId, FacadeNode> {
        std::mem::take(&mut self.map)
    }

    /// Insert a wrapper already bound to a new-generation handle.
    pub(crate) fn insert_bound(&mut self, node: NodeId, facade: FacadeNode) {
        self.map.insert(node, facade);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::FileId;
    use crate::parser::parse;
    use crate::syntax::SyntaxKind;

    #[test]
    fn test_get_or_create_is_lazy_and_unique() {
        let tree = parse(FileId::new(0), "let a;\nlet b;");
        let mut registry = Registry::new(FileId::new(0));
        assert!(registry.is_empty());

        let root = NodeRef::new(&tree, tree.root());
        let first = registry.get_or_create(root, Generation::default());
        let again = registry.get_or_create(root, Generation::default());
        assert!(FacadeNode::ptr_eq(&first, &again));
        assert_eq!(registry.len(), 1);
        assert_eq!(first.kind().unwrap(), SyntaxKind::SourceFile);
    }

    #[test]
    fn test_forget_evicts_and_poisons() {
        let tree = parse(FileId::new(0), "let a;");
        let mut registry = Registry::new(FileId::new(0));
        let root = NodeRef::new(&tree, tree.root());
        let facade = registry.get_or_create(root, Generation::default());

        registry.forget(&facade).unwrap();
        assert!(registry.is_empty());
        assert!(facade.is_forgotten());
        // Forgetting twice reports the stale reference.
        assert!(registry.forget(&facade).is_err());

        // A fresh navigation creates a brand-new wrapper.
        let fresh = registry.get_or_create(root, Generation::default());
        assert!(!FacadeNode::ptr_eq(&facade, &fresh));
    }

    #[test]
    fn test_rebind_rekeys_entry() {
        let tree = parse(FileId::new(0), "let a;\nlet b;");
        let root = NodeRef::new(&tree, tree.root());
        let stmts: Vec<_> = root.children().collect();

        let mut registry = Registry::new(FileId::new(0));
        let facade = registry.get_or_create(stmts[0], Generation::default());

        registry.rebind(&facade, stmts[1], Generation::new(1));
        assert!(registry.get(stmts[0].id()).is_none());
        let rebound = registry.get(stmts[1].id()).unwrap();
        assert!(FacadeNode::ptr_eq(&facade, &rebound));
        assert_eq!(facade.generation().unwrap(), Generation::new(1));
    }
}
