//! Bundled reference parser.
//!
//! A small recursive-descent parser for a TypeScript-like structural
//! subset, enough to exercise every container the core recognizes:
//! source files, blocks, module blocks, switch clauses, classes (and
//! class expressions), interfaces, type literals, enums, and object
//! literals.
//!
//! This is boundary scaffolding: the core only ever sees the raw tree it
//! produces through the [`crate::host::ParseHost`] seam. The parser is a
//! full reparser; it never reuses previous trees.
//!
//! Position discipline: every node records both its full start (end of
//! the previous token, so leading trivia belongs to the following node)
//! and its first-token offset. The comment scanner depends on that split.

mod grammar;
mod lexer;

pub use grammar::{ReferenceParser, parse};
pub use lexer::{Lexer, Token, TokenKind, tokenize};
