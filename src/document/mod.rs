//! Per-file document context.
//!
//! A [`SourceDocument`] owns everything one file needs: the current text
//! and raw tree, the parse-generation counter, the facade registry, and
//! the augmented-children cache. An edit, reparse, and reconciliation
//! form one atomic synchronous step; nothing here suspends, and a
//! reentrant edit is an invariant violation, not a queueing request.

use std::io;
use std::path::Path;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::debug;

use crate::base::{FileId, TextRange};
use crate::children::{ChildSlot, ChildrenCache, splice_into};
use crate::facade::{CommentFacadeNode, FacadeElement, FacadeNode, ForgottenNodeError, Registry};
use crate::host::{FileSystem, ParseHost};
use crate::reconcile::{EditDescriptor, reconcile};
use crate::syntax::{Generation, NodeRef, SyntaxTree};

struct DocState {
    tree: SyntaxTree,
    generation: Generation,
    registry: Registry,
    children: ChildrenCache,
}

/// One parsed file, navigable as a live facade tree.
pub struct SourceDocument {
    file: FileId,
    host: Arc<dyn ParseHost>,
    state: RwLock<DocState>,
    /// Held for the whole edit step; a second edit before the first
    /// finished reconciling is a defect in the caller.
    edit_guard: Mutex<()>,
}

impl SourceDocument {
    pub fn new(file: FileId, text: &str, host: Arc<dyn ParseHost>) -> Self {
        let tree = host.parse(file, text);
        let generation = Generation::default();
        Self {
            file,
            host,
            state: RwLock::new(DocState {
                tree,
                generation,
                registry: Registry::new(file),
                children: ChildrenCache::new(generation),
            }),
            edit_guard: Mutex::new(()),
        }
    }

    /// Read `path` through the file-system seam and parse it.
    pub fn load(
        fs: &dyn FileSystem,
        path: &Path,
        file: FileId,
        host: Arc<dyn ParseHost>,
    ) -> io::Result<Self> {
        let text = fs.read(path)?;
        Ok(Self::new(file, &text, host))
    }

    /// Write the current text back through the file-system seam.
    pub fn save(&self, fs: &dyn FileSystem, path: &Path) -> io::Result<()> {
        fs.write(path, &self.text())
    }

    pub fn file(&self) -> FileId {
        self.file
    }

    pub fn generation(&self) -> Generation {
        self.state.read().generation
    }

    pub fn text(&self) -> Arc<str> {
        self.state.read().tree.text_arc()
    }

    /// Facade node for the file root.
    pub fn root(&self) -> FacadeNode {
        let mut state = self.state.write();
        let DocState {
            tree,
            generation,
            registry,
            ..
        } = &mut *state;
        registry.get_or_create(NodeRef::new(tree, tree.root()), *generation)
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    /// Full range of `node`, leading trivia included.
    pub fn range_of(&self, node: &FacadeNode) -> Result<TextRange, ForgottenNodeError> {
        let id = node.bound_id()?;
        let state = self.state.read();
        Ok(NodeRef::new(&state.tree, id).range())
    }

    /// Range over the node's own tokens.
    pub fn token_range_of(&self, node: &FacadeNode) -> Result<TextRange, ForgottenNodeError> {
        let id = node.bound_id()?;
        let state = self.state.read();
        Ok(NodeRef::new(&state.tree, id).token_range())
    }

    /// The node's token text.
    pub fn text_of(&self, node: &FacadeNode) -> Result<String, ForgottenNodeError> {
        let id = node.bound_id()?;
        let state = self.state.read();
        Ok(NodeRef::new(&state.tree, id).text().to_owned())
    }

    /// Identifier or literal token text, when the parser recorded it.
    pub fn name_of(&self, node: &FacadeNode) -> Result<Option<String>, ForgottenNodeError> {
        let id = node.bound_id()?;
        let state = self.state.read();
        Ok(NodeRef::new(&state.tree, id).name().map(str::to_owned))
    }

    pub fn parent_of(&self, node: &FacadeNode) -> Result<Option<FacadeNode>, ForgottenNodeError> {
        let id = node.bound_id()?;
        let mut state = self.state.write();
        let DocState {
            tree,
            generation,
            registry,
            ..
        } = &mut *state;
        Ok(NodeRef::new(tree, id)
            .parent()
            .map(|parent| registry.get_or_create(parent, *generation)))
    }

    /// Number of structural children, comments not included.
    pub fn child_count_of(&self, node: &FacadeNode) -> Result<usize, ForgottenNodeError> {
        let id = node.bound_id()?;
        let state = self.state.read();
        Ok(NodeRef::new(&state.tree, id).child_count())
    }

    /// Structural children as facade nodes, comments not included.
    pub fn children_of(&self, node: &FacadeNode) -> Result<Vec<FacadeNode>, ForgottenNodeError> {
        let id = node.bound_id()?;
        let mut state = self.state.write();
        let DocState {
            tree,
            generation,
            registry,
            ..
        } = &mut *state;
        Ok(NodeRef::new(tree, id)
            .children()
            .map(|child| registry.get_or_create(child, *generation))
            .collect())
    }

    /// The comment-augmented child sequence of a container, cached per
    /// generation. Non-containers yield their structural children.
    pub fn augmented_children(
        &self,
        container: &FacadeNode,
    ) -> Result<Vec<FacadeElement>, ForgottenNodeError> {
        let id = container.bound_id()?;
        let mut state = self.state.write();
        let DocState {
            tree,
            generation,
            registry,
            children,
        } = &mut *state;
        let sequence = children.get_or_build(tree, id);
        Ok(sequence
            .iter()
            .map(|slot| self.slot_to_element(slot, tree, registry, *generation))
            .collect())
    }

    /// The already-materialized retrieval strategy: splice comments into
    /// a child list the caller is holding, without re-descending.
    pub fn splice_comments(
        &self,
        container: &FacadeNode,
        materialized: &[FacadeNode],
    ) -> Result<Vec<FacadeElement>, ForgottenNodeError> {
        let id = container.bound_id()?;
        let ids = materialized
            .iter()
            .map(FacadeNode::bound_id)
            .collect::<Result<Vec<_>, _>>()?;
        let mut state = self.state.write();
        let DocState {
            tree,
            generation,
            registry,
            ..
        } = &mut *state;
        let slots = splice_into(NodeRef::new(tree, id), &ids);
        Ok(slots
            .iter()
            .map(|slot| self.slot_to_element(slot, tree, registry, *generation))
            .collect())
    }

    fn slot_to_element(
        &self,
        slot: &ChildSlot,
        tree: &SyntaxTree,
        registry: &mut Registry,
        generation: Generation,
    ) -> FacadeElement {
        match slot {
            ChildSlot::Node(id) => {
                FacadeElement::Node(registry.get_or_create(NodeRef::new(tree, *id), generation))
            }
            ChildSlot::Comment(comment) => FacadeElement::Comment(CommentFacadeNode::new(
                self.file,
                generation,
                tree.text_arc(),
                comment.clone(),
            )),
        }
    }

    // ------------------------------------------------------------------
    // Disposal
    // ------------------------------------------------------------------

    /// Dispose a wrapper; every later operation on it fails with
    /// [`ForgottenNodeError`] instead of serving stale data.
    pub fn forget(&self, node: &FacadeNode) -> Result<(), ForgottenNodeError> {
        self.state.write().registry.forget(node)
    }

    pub fn is_forgotten(&self, node: &FacadeNode) -> bool {
        node.is_forgotten()
    }

    // ------------------------------------------------------------------
    // Edits
    // ------------------------------------------------------------------

    /// Replace the document text, reparse, and reconcile the facade tree
    /// in place. One atomic synchronous step.
    pub fn apply_edit(
        &self,
        new_text: &str,
        descriptor: &EditDescriptor,
    ) -> Result<(), ForgottenNodeError> {
        let _guard = self
            .edit_guard
            .try_lock()
            .unwrap_or_else(|| panic!("reentrant edit: a previous edit has not finished reconciling"));

        let new_tree = self.host.parse(self.file, new_text);
        let mut state = self.state.write();
        let next = state.generation.next();
        debug!(
            file = %self.file,
            generation = next.raw(),
            strategy = descriptor.strategy_name(),
            "applying edit"
        );

        let DocState {
            tree,
            registry,
            children,
            generation,
        } = &mut *state;
        reconcile(tree, &new_tree, registry, next, descriptor)?;
        *tree = new_tree;
        *generation = next;
        children.reset(next);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::TextSize;
    use crate::host::MemoryFileSystem;
    use crate::parser::ReferenceParser;
    use crate::syntax::SyntaxKind;

    fn document(text: &str) -> SourceDocument {
        SourceDocument::new(FileId::new(0), text, Arc::new(ReferenceParser))
    }

    #[test]
    fn test_navigation_through_the_facade() {
        let doc = document("// a\nlet a;\n//b");
        let root = doc.root();
        assert_eq!(root.kind().unwrap(), SyntaxKind::SourceFile);

        let children = doc.augmented_children(&root).unwrap();
        assert_eq!(children.len(), 3);
        let comment = children[0].as_comment().unwrap();
        assert_eq!(comment.text(), "// a");
        let stmt = children[1].as_node().unwrap();
        assert_eq!(doc.text_of(stmt).unwrap(), "let a;");
        assert_eq!(doc.name_of(stmt).unwrap(), None);
        let ident = doc.children_of(stmt).unwrap().remove(0);
        assert_eq!(doc.name_of(&ident).unwrap(), Some("a".to_string()));
        let parent = doc.parent_of(stmt).unwrap().unwrap();
        assert!(FacadeNode::ptr_eq(&parent, &root));
    }

    #[test]
    fn test_forgotten_node_never_serves_stale_data() {
        let doc = document("let a;");
        let root = doc.root();
        let stmt = doc.children_of(&root).unwrap().remove(0);

        doc.forget(&stmt).unwrap();
        assert!(doc.is_forgotten(&stmt));
        assert!(matches!(doc.text_of(&stmt), Err(ForgottenNodeError { .. })));
        assert!(matches!(doc.range_of(&stmt), Err(ForgottenNodeError { .. })));
        assert!(matches!(
            doc.augmented_children(&stmt),
            Err(ForgottenNodeError { .. })
        ));
    }

    #[test]
    fn test_apply_edit_preserves_identity_and_bumps_generation() {
        let doc = document("let a;\nlet b;");
        let root = doc.root();
        let stmts = doc.children_of(&root).unwrap();
        assert_eq!(doc.generation(), Generation::new(0));

        let descriptor = EditDescriptor::insertion(
            root.clone(),
            1,
            Box::new(|_, new_child| new_child.start() >= TextSize::new(7)),
        );
        doc.apply_edit("let a;\nlet n;\nlet b;", &descriptor).unwrap();

        assert_eq!(doc.generation(), Generation::new(1));
        assert_eq!(&*doc.text(), "let a;\nlet n;\nlet b;");

        // Old wrappers survived the edit and now serve fresh data.
        assert_eq!(doc.text_of(&stmts[0]).unwrap(), "let a;");
        assert_eq!(doc.text_of(&stmts[1]).unwrap(), "let b;");
        assert_eq!(
            doc.range_of(&stmts[1]).unwrap(),
            TextRange::new(TextSize::new(13), TextSize::new(20))
        );

        let after = doc.children_of(&root).unwrap();
        assert_eq!(after.len(), 3);
        assert!(FacadeNode::ptr_eq(&after[0], &stmts[0]));
        assert!(FacadeNode::ptr_eq(&after[2], &stmts[1]));
    }

    #[test]
    fn test_augmented_children_cached_within_a_generation() {
        let doc = document("// c\nlet a;");
        let root = doc.root();

        let first = doc.augmented_children(&root).unwrap();
        let second = doc.augmented_children(&root).unwrap();
        // Wrapper identity is stable across calls; the comment entries
        // come from the same cached sequence.
        assert!(FacadeNode::ptr_eq(
            first[1].as_node().unwrap(),
            second[1].as_node().unwrap()
        ));
        assert_eq!(
            first[0].as_comment().unwrap().range(),
            second[0].as_comment().unwrap().range()
        );
    }

    #[test]
    fn test_edit_invalidates_the_children_cache() {
        let doc = document("// c\nlet a;");
        let root = doc.root();
        let before = doc.augmented_children(&root).unwrap();
        assert_eq!(before.len(), 2);

        doc.apply_edit("let a;", &EditDescriptor::DisposeChanged)
            .unwrap();
        let after = doc.augmented_children(&root).unwrap();
        assert_eq!(after.len(), 1);
        assert!(after[0].as_node().is_some());
    }

    #[test]
    fn test_comment_facades_carry_their_generation_text() {
        let doc = document("// c\nlet a;");
        let root = doc.root();
        let children = doc.augmented_children(&root).unwrap();
        let comment = children[0].as_comment().unwrap().clone();

        doc.apply_edit("let a;", &EditDescriptor::DisposeChanged)
            .unwrap();
        // The old comment facade still reads its own generation's text.
        assert_eq!(comment.text(), "// c");
        assert_eq!(comment.generation(), Generation::new(0));
    }

    #[test]
    fn test_splice_comments_matches_augmented_children() {
        let doc = document("// a\nlet a;\n// b\nlet b;");
        let root = doc.root();
        let materialized = doc.children_of(&root).unwrap();

        let structural = doc.augmented_children(&root).unwrap();
        let spliced = doc.splice_comments(&root, &materialized).unwrap();
        assert_eq!(structural.len(), spliced.len());
        for (a, b) in structural.iter().zip(&spliced) {
            match (a, b) {
                (FacadeElement::Node(x), FacadeElement::Node(y)) => {
                    assert!(FacadeNode::ptr_eq(x, y));
                }
                (FacadeElement::Comment(x), FacadeElement::Comment(y)) => {
                    assert_eq!(x.range(), y.range());
                }
                _ => panic!("sequences disagree on slot kind"),
            }
        }
    }

    #[test]
    fn test_load_and_save_through_the_fs_seam() {
        let fs = MemoryFileSystem::new();
        let path = Path::new("mod.ts");
        fs.insert(path, "let a;");

        let doc =
            SourceDocument::load(&fs, path, FileId::new(0), Arc::new(ReferenceParser)).unwrap();
        assert_eq!(&*doc.text(), "let a;");

        doc.apply_edit("let a;\nlet b;", &EditDescriptor::DisposeChanged)
            .unwrap();
        doc.save(&fs, path).unwrap();
        assert_eq!(fs.read(path).unwrap(), "let a;\nlet b;");
    }

    #[test]
    fn test_stale_descriptor_leaves_document_usable() {
        let doc = document("let a;");
        let root = doc.root();
        let stmt = doc.children_of(&root).unwrap().remove(0);
        doc.forget(&stmt).unwrap();

        let descriptor = EditDescriptor::insertion(stmt, 1, Box::new(|_, _| false));
        let err = doc.apply_edit("let a;\nlet b;", &descriptor).unwrap_err();
        assert_eq!(err.kind, SyntaxKind::VariableStatement);

        // The failed edit did not advance the generation or the text.
        assert_eq!(doc.generation(), Generation::new(0));
        assert_eq!(&*doc.text(), "let a;");
        assert_eq!(doc.text_of(&root.clone()).unwrap(), "let a;");
    }
}
