//! # regraft-base
//!
//! Core library for navigating a parsed source file as a live facade tree,
//! weaving comments into container child lists, and incrementally
//! reconciling facade identity across text edits.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! document  → per-file context: apply_edit, generation, caches
//!   ↓
//! reconcile → edit strategies that rebind the facade tree in place
//!   ↓
//! facade    → one wrapper per raw node, identity-keyed registry
//!   ↓
//! children  → augmented child sequences (real children + comments)
//!   ↓
//! trivia    → comment scanner over inter-child gaps
//!   ↓
//! parser    → bundled reference parser (logos lexer, recursive descent)
//!   ↓
//! syntax    → raw-node arena, SyntaxKind, NodeRef cursor
//!   ↓
//! host      → external collaborator traits (ParseHost, FileSystem)
//!   ↓
//! base      → primitives (FileId, TextRange)
//! ```

// ============================================================================
// MODULES (dependency order: base → host → syntax → parser → trivia →
// children → facade → reconcile → document)
// ============================================================================

/// Foundation types: FileId, TextRange/TextSize
pub mod base;

/// External collaborator seams: parser host, file system
pub mod host;

/// Raw syntax model: arena, kinds, NodeRef cursor
pub mod syntax;

/// Bundled reference parser: logos lexer, recursive-descent grammar
pub mod parser;

/// Trivia: comment pseudo-nodes and the gap scanner
pub mod trivia;

/// Augmented child sequences: real children merged with comments
pub mod children;

/// Facade wrappers and the identity-keyed registry
pub mod facade;

/// Reconciliation strategies applied after a reparse
pub mod reconcile;

/// Per-file document context: text, tree, generation, caches
pub mod document;

// Re-export foundation types
pub use base::{FileId, TextRange, TextSize};

// Re-export the primary API surface
pub use document::SourceDocument;
pub use facade::{CommentFacadeNode, FacadeElement, FacadeNode, ForgottenNodeError};
pub use reconcile::EditDescriptor;
pub use syntax::{ContainerKind, Generation, NodeId, SyntaxKind, SyntaxTree};
pub use trivia::{CommentContext, CommentKind, CommentNode};
