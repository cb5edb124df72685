//! Recursive-descent grammar for the reference language.
//!
//! Every construct the core's container table names is producible here:
//! statements (file root, blocks, module blocks, case/default clauses),
//! class members (declarations and class expressions), type members
//! (interfaces and type literals), enum members, and object-literal
//! elements.
//!
//! Recovery is deliberately blunt: an unexpected token becomes an `Error`
//! leaf and parsing continues. The facade layers treat error nodes like
//! any other raw node.

use text_size::TextSize;

use crate::base::FileId;
use crate::host::ParseHost;
use crate::syntax::{NodeId, SyntaxKind, SyntaxTree, TreeBuilder};

use super::lexer::{Lexer, TokenKind};

/// [`ParseHost`] implementation backed by this parser.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReferenceParser;

impl ParseHost for ReferenceParser {
    fn parse(&self, file: FileId, text: &str) -> SyntaxTree {
        parse(file, text)
    }
}

/// Full reparse of `text` into a raw tree.
pub fn parse(file: FileId, text: &str) -> SyntaxTree {
    Parser::new(file, text).run()
}

/// A significant token plus its full start (end of the previous
/// significant token, so intervening trivia belongs to this one).
#[derive(Debug, Clone, Copy)]
struct SigToken<'a> {
    kind: TokenKind,
    text: &'a str,
    start: TextSize,
    end: TextSize,
    full_start: TextSize,
}

/// Node position mark captured before the first token of a node.
#[derive(Debug, Clone, Copy)]
struct Mark {
    pos: TextSize,
    start: TextSize,
}

struct Parser<'a> {
    toks: Vec<SigToken<'a>>,
    i: usize,
    prev_end: TextSize,
    builder: TreeBuilder,
}

impl<'a> Parser<'a> {
    fn new(file: FileId, text: &'a str) -> Self {
        let mut toks = Vec::new();
        let mut prev_sig_end = TextSize::new(0);
        for token in Lexer::new(text) {
            if token.is_trivia() {
                continue;
            }
            let start = token.offset;
            let end = token.end();
            toks.push(SigToken {
                kind: token.kind,
                text: token.text,
                start,
                end,
                full_start: prev_sig_end,
            });
            prev_sig_end = end;
        }
        let eof = TextSize::of(text);
        toks.push(SigToken {
            kind: TokenKind::Eof,
            text: "",
            start: eof,
            end: eof,
            full_start: prev_sig_end,
        });
        Self {
            toks,
            i: 0,
            prev_end: TextSize::new(0),
            builder: TreeBuilder::new(file, text),
        }
    }

    fn run(mut self) -> SyntaxTree {
        let eof = self.toks[self.toks.len() - 1].end;
        let mut children = Vec::new();
        while !self.at(TokenKind::Eof) {
            children.push(self.statement());
        }
        let root = self.builder.node(
            SyntaxKind::SourceFile,
            0,
            0,
            eof.into(),
            children,
        );
        self.builder.finish(root)
    }

    // ------------------------------------------------------------------
    // Token plumbing
    // ------------------------------------------------------------------

    fn cur(&self) -> SigToken<'a> {
        self.toks[self.i]
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.cur().kind == kind
    }

    fn bump(&mut self) -> SigToken<'a> {
        let token = self.toks[self.i];
        if token.kind != TokenKind::Eof {
            self.i += 1;
            self.prev_end = token.end;
        }
        token
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    /// Consume `kind` if present; otherwise stand still (zero-width
    /// recovery at the current token).
    fn expect(&mut self, kind: TokenKind) -> SigToken<'a> {
        if self.at(kind) {
            self.bump()
        } else {
            let cur = self.cur();
            SigToken {
                kind,
                text: "",
                start: cur.start,
                end: cur.start,
                full_start: cur.full_start,
            }
        }
    }

    fn mark(&self) -> Mark {
        let cur = self.cur();
        Mark {
            pos: cur.full_start,
            start: cur.start,
        }
    }

    fn finish(&mut self, kind: SyntaxKind, mark: Mark, children: Vec<NodeId>) -> NodeId {
        self.builder.node(
            kind,
            mark.pos.into(),
            mark.start.into(),
            self.prev_end.into(),
            children,
        )
    }

    fn finish_container(
        &mut self,
        kind: SyntaxKind,
        mark: Mark,
        body_start: TextSize,
        body_end: TextSize,
        children: Vec<NodeId>,
    ) -> NodeId {
        self.builder.container(
            kind,
            mark.pos.into(),
            mark.start.into(),
            self.prev_end.into(),
            body_start.into(),
            body_end.into(),
            children,
        )
    }

    fn error_leaf(&mut self) -> NodeId {
        let token = self.bump();
        self.builder.leaf(
            SyntaxKind::Error,
            token.full_start.into(),
            token.start.into(),
            token.end.into(),
        )
    }

    fn ident(&mut self) -> NodeId {
        let token = self.expect(TokenKind::Ident);
        self.builder.leaf_named(
            SyntaxKind::Identifier,
            token.full_start.into(),
            token.start.into(),
            token.end.into(),
            token.text,
        )
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    fn statement(&mut self) -> NodeId {
        match self.cur().kind {
            TokenKind::ClassKw => self.class_like(SyntaxKind::ClassDeclaration),
            TokenKind::InterfaceKw => self.interface_decl(),
            TokenKind::EnumKw => self.enum_decl(),
            TokenKind::ModuleKw => self.module_decl(),
            TokenKind::SwitchKw => self.switch_stmt(),
            TokenKind::VarKw => self.var_stmt(),
            TokenKind::LBrace => self.block(),
            TokenKind::Semicolon => {
                let mark = self.mark();
                self.bump();
                self.finish(SyntaxKind::EmptyStatement, mark, Vec::new())
            }
            _ => self.expr_stmt(),
        }
    }

    fn block(&mut self) -> NodeId {
        let mark = self.mark();
        let open = self.expect(TokenKind::LBrace);
        let mut children = Vec::new();
        while !self.at(TokenKind::RBrace) && !self.at(TokenKind::Eof) {
            children.push(self.statement());
        }
        let close = self.expect(TokenKind::RBrace);
        self.finish_container(SyntaxKind::Block, mark, open.end, close.start, children)
    }

    fn var_stmt(&mut self) -> NodeId {
        let mark = self.mark();
        self.bump(); // let/const/var
        let mut children = vec![self.ident()];
        if self.eat(TokenKind::Colon) {
            children.push(self.type_node());
        }
        if self.eat(TokenKind::Eq) {
            children.push(self.expr());
        }
        self.expect(TokenKind::Semicolon);
        self.finish(SyntaxKind::VariableStatement, mark, children)
    }

    fn expr_stmt(&mut self) -> NodeId {
        let mark = self.mark();
        let expr = self.expr();
        self.expect(TokenKind::Semicolon);
        self.finish(SyntaxKind::ExpressionStatement, mark, vec![expr])
    }

    fn module_decl(&mut self) -> NodeId {
        let mark = self.mark();
        self.bump(); // module/namespace
        let name = self.ident();
        let body = self.module_block();
        self.finish(SyntaxKind::ModuleDeclaration, mark, vec![name, body])
    }

    fn module_block(&mut self) -> NodeId {
        let mark = self.mark();
        let open = self.expect(TokenKind::LBrace);
        let mut children = Vec::new();
        while !self.at(TokenKind::RBrace) && !self.at(TokenKind::Eof) {
            children.push(self.statement());
        }
        let close = self.expect(TokenKind::RBrace);
        self.finish_container(SyntaxKind::ModuleBlock, mark, open.end, close.start, children)
    }

    fn switch_stmt(&mut self) -> NodeId {
        let mark = self.mark();
        self.bump(); // switch
        self.expect(TokenKind::LParen);
        let discriminant = self.expr();
        self.expect(TokenKind::RParen);
        self.expect(TokenKind::LBrace);
        let mut children = vec![discriminant];
        while self.at(TokenKind::CaseKw) || self.at(TokenKind::DefaultKw) {
            children.push(self.clause());
        }
        self.expect(TokenKind::RBrace);
        self.finish(SyntaxKind::SwitchStatement, mark, children)
    }

    /// Case/default clause. The clause body extends from the colon to the
    /// next clause keyword or the switch's closing brace, so trailing
    /// trivia between clauses is scannable from the clause that owns it.
    fn clause(&mut self) -> NodeId {
        let mark = self.mark();
        let kind = if self.at(TokenKind::CaseKw) {
            self.bump();
            SyntaxKind::CaseClause
        } else {
            self.bump();
            SyntaxKind::DefaultClause
        };
        let mut children = Vec::new();
        if kind == SyntaxKind::CaseClause {
            children.push(self.expr());
        }
        let colon = self.expect(TokenKind::Colon);
        while !matches!(
            self.cur().kind,
            TokenKind::CaseKw | TokenKind::DefaultKw | TokenKind::RBrace | TokenKind::Eof
        ) {
            children.push(self.statement());
        }
        let body_end = self.cur().start;
        self.finish_container(kind, mark, colon.end, body_end, children)
    }

    // ------------------------------------------------------------------
    // Declarations with member lists
    // ------------------------------------------------------------------

    fn class_like(&mut self, kind: SyntaxKind) -> NodeId {
        let mark = self.mark();
        self.bump(); // class
        let mut children = Vec::new();
        if self.at(TokenKind::Ident) {
            children.push(self.ident());
        } else if kind == SyntaxKind::ClassDeclaration {
            children.push(self.ident()); // zero-width recovery name
        }
        let open = self.expect(TokenKind::LBrace);
        while !self.at(TokenKind::RBrace) && !self.at(TokenKind::Eof) {
            children.push(self.class_member());
        }
        let close = self.expect(TokenKind::RBrace);
        self.finish_container(kind, mark, open.end, close.start, children)
    }

    fn class_member(&mut self) -> NodeId {
        if !self.at(TokenKind::Ident) {
            return self.error_leaf();
        }
        let mark = self.mark();
        let name = self.ident();
        if self.at(TokenKind::LParen) {
            let mut children = vec![name];
            self.bump(); // (
            while !self.at(TokenKind::RParen) && !self.at(TokenKind::Eof) {
                children.push(self.parameter());
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
            self.expect(TokenKind::RParen);
            if self.eat(TokenKind::Colon) {
                children.push(self.type_node());
            }
            children.push(self.block());
            self.finish(SyntaxKind::MethodDeclaration, mark, children)
        } else {
            let mut children = vec![name];
            self.eat(TokenKind::Question);
            if self.eat(TokenKind::Colon) {
                children.push(self.type_node());
            }
            if self.eat(TokenKind::Eq) {
                children.push(self.expr());
            }
            self.expect(TokenKind::Semicolon);
            self.finish(SyntaxKind::PropertyDeclaration, mark, children)
        }
    }

    fn parameter(&mut self) -> NodeId {
        let mark = self.mark();
        let mut children = vec![self.ident()];
        if self.eat(TokenKind::Colon) {
            children.push(self.type_node());
        }
        self.finish(SyntaxKind::Parameter, mark, children)
    }

    fn interface_decl(&mut self) -> NodeId {
        let mark = self.mark();
        self.bump(); // interface
        let name = self.ident();
        let open = self.expect(TokenKind::LBrace);
        let mut children = vec![name];
        while !self.at(TokenKind::RBrace) && !self.at(TokenKind::Eof) {
            children.push(self.type_member());
        }
        let close = self.expect(TokenKind::RBrace);
        self.finish_container(
            SyntaxKind::InterfaceDeclaration,
            mark,
            open.end,
            close.start,
            children,
        )
    }

    fn type_member(&mut self) -> NodeId {
        if !self.at(TokenKind::Ident) {
            return self.error_leaf();
        }
        let mark = self.mark();
        let mut children = vec![self.ident()];
        self.eat(TokenKind::Question);
        if self.eat(TokenKind::Colon) {
            children.push(self.type_node());
        }
        self.expect(TokenKind::Semicolon);
        self.finish(SyntaxKind::PropertySignature, mark, children)
    }

    fn enum_decl(&mut self) -> NodeId {
        let mark = self.mark();
        self.bump(); // enum
        let name = self.ident();
        let open = self.expect(TokenKind::LBrace);
        let mut children = vec![name];
        while self.at(TokenKind::Ident) {
            children.push(self.enum_member());
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        let close = self.expect(TokenKind::RBrace);
        self.finish_container(
            SyntaxKind::EnumDeclaration,
            mark,
            open.end,
            close.start,
            children,
        )
    }

    fn enum_member(&mut self) -> NodeId {
        let mark = self.mark();
        let mut children = vec![self.ident()];
        if self.eat(TokenKind::Eq) {
            children.push(self.expr());
        }
        self.finish(SyntaxKind::EnumMember, mark, children)
    }

    // ------------------------------------------------------------------
    // Expressions and types
    // ------------------------------------------------------------------

    fn expr(&mut self) -> NodeId {
        match self.cur().kind {
            TokenKind::Ident => self.leaf_from_cur(SyntaxKind::Identifier),
            TokenKind::Number => self.leaf_from_cur(SyntaxKind::NumberLiteral),
            TokenKind::String => self.leaf_from_cur(SyntaxKind::StringLiteral),
            TokenKind::LBrace => self.object_literal(),
            TokenKind::ClassKw => self.class_like(SyntaxKind::ClassExpression),
            TokenKind::LParen => {
                self.bump();
                let inner = self.expr();
                self.expect(TokenKind::RParen);
                inner
            }
            _ => self.error_leaf(),
        }
    }

    fn leaf_from_cur(&mut self, kind: SyntaxKind) -> NodeId {
        let token = self.bump();
        self.builder.leaf_named(
            kind,
            token.full_start.into(),
            token.start.into(),
            token.end.into(),
            token.text,
        )
    }

    fn object_literal(&mut self) -> NodeId {
        let mark = self.mark();
        let open = self.expect(TokenKind::LBrace);
        let mut children = Vec::new();
        while matches!(
            self.cur().kind,
            TokenKind::Ident | TokenKind::String | TokenKind::Number
        ) {
            children.push(self.object_member());
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        let close = self.expect(TokenKind::RBrace);
        self.finish_container(
            SyntaxKind::ObjectLiteral,
            mark,
            open.end,
            close.start,
            children,
        )
    }

    fn object_member(&mut self) -> NodeId {
        let mark = self.mark();
        let name = match self.cur().kind {
            TokenKind::String => self.leaf_from_cur(SyntaxKind::StringLiteral),
            TokenKind::Number => self.leaf_from_cur(SyntaxKind::NumberLiteral),
            _ => self.ident(),
        };
        if self.eat(TokenKind::Colon) {
            let value = self.expr();
            self.finish(SyntaxKind::PropertyAssignment, mark, vec![name, value])
        } else {
            self.finish(SyntaxKind::ShorthandPropertyAssignment, mark, vec![name])
        }
    }

    fn type_node(&mut self) -> NodeId {
        if self.at(TokenKind::LBrace) {
            let mark = self.mark();
            let open = self.expect(TokenKind::LBrace);
            let mut children = Vec::new();
            while !self.at(TokenKind::RBrace) && !self.at(TokenKind::Eof) {
                children.push(self.type_member());
            }
            let close = self.expect(TokenKind::RBrace);
            self.finish_container(SyntaxKind::TypeLiteral, mark, open.end, close.start, children)
        } else {
            let token = self.expect(TokenKind::Ident);
            self.builder.leaf_named(
                SyntaxKind::TypeReference,
                token.full_start.into(),
                token.start.into(),
                token.end.into(),
                token.text,
            )
        }
    }
}
