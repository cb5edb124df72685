//! Logos-based lexer for the reference language.

use logos::Logos;
use text_size::TextSize;

/// A token with its kind, text, and position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub offset: TextSize,
}

impl Token<'_> {
    pub fn end(&self) -> TextSize {
        self.offset + TextSize::of(self.text)
    }

    pub fn is_trivia(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Whitespace | TokenKind::LineComment | TokenKind::BlockComment
        )
    }
}

/// Lexer wrapping the logos-generated tokenizer.
pub struct Lexer<'a> {
    inner: logos::Lexer<'a, LogosToken>,
    offset: u32,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            inner: LogosToken::lexer(input),
            offset: 0,
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let logos_token = self.inner.next()?;
        let text = self.inner.slice();
        let offset = TextSize::new(self.offset);
        self.offset += text.len() as u32;

        let kind = match logos_token {
            Ok(t) => keyword_or(t, text),
            Err(()) => TokenKind::Error,
        };

        Some(Token { kind, text, offset })
    }
}

/// Tokenize an entire string into a Vec.
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    Lexer::new(input).collect()
}

fn keyword_or(token: LogosToken, text: &str) -> TokenKind {
    match token {
        LogosToken::Whitespace => TokenKind::Whitespace,
        LogosToken::LineComment => TokenKind::LineComment,
        LogosToken::BlockComment => TokenKind::BlockComment,
        LogosToken::Ident => match text {
            "class" => TokenKind::ClassKw,
            "interface" => TokenKind::InterfaceKw,
            "enum" => TokenKind::EnumKw,
            "module" | "namespace" => TokenKind::ModuleKw,
            "switch" => TokenKind::SwitchKw,
            "case" => TokenKind::CaseKw,
            "default" => TokenKind::DefaultKw,
            "let" | "const" | "var" => TokenKind::VarKw,
            _ => TokenKind::Ident,
        },
        LogosToken::Number => TokenKind::Number,
        LogosToken::String => TokenKind::String,
        LogosToken::LBrace => TokenKind::LBrace,
        LogosToken::RBrace => TokenKind::RBrace,
        LogosToken::LParen => TokenKind::LParen,
        LogosToken::RParen => TokenKind::RParen,
        LogosToken::Colon => TokenKind::Colon,
        LogosToken::Semicolon => TokenKind::Semicolon,
        LogosToken::Comma => TokenKind::Comma,
        LogosToken::Eq => TokenKind::Eq,
        LogosToken::Dot => TokenKind::Dot,
        LogosToken::Question => TokenKind::Question,
    }
}

/// Token classification handed to the parser. Keywords are resolved from
/// identifier text at lex time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    // Trivia
    Whitespace,
    LineComment,
    BlockComment,

    // Literals and names
    Ident,
    Number,
    String,

    // Keywords
    ClassKw,
    InterfaceKw,
    EnumKw,
    ModuleKw,
    SwitchKw,
    CaseKw,
    DefaultKw,
    VarKw,

    // Punctuation
    LBrace,
    RBrace,
    LParen,
    RParen,
    Colon,
    Semicolon,
    Comma,
    Eq,
    Dot,
    Question,

    Error,
    Eof,
}

/// Logos token enum - trivia is kept, not skipped, so the parser can
/// attribute it to the following node's full start.
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
pub(crate) enum LogosToken {
    #[regex(r"[ \t\r\n]+")]
    Whitespace,

    #[regex(r"//[^\n]*")]
    LineComment,

    #[regex(r"/\*([^*]|\*[^/])*\*/")]
    BlockComment,

    #[regex(r"[a-zA-Z_$][a-zA-Z0-9_$]*")]
    Ident,

    #[regex(r"[0-9]+(\.[0-9]+)?")]
    Number,

    #[regex(r#""([^"\\]|\\.)*""#)]
    String,

    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token(":")]
    Colon,

    #[token(";")]
    Semicolon,

    #[token(",")]
    Comma,

    #[token("=")]
    Eq,

    #[token(".")]
    Dot,

    #[token("?")]
    Question,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_keeps_trivia() {
        let tokens = tokenize("let a; // t");
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::VarKw,
                TokenKind::Whitespace,
                TokenKind::Ident,
                TokenKind::Semicolon,
                TokenKind::Whitespace,
                TokenKind::LineComment,
            ]
        );
    }

    #[test]
    fn test_offsets_are_cumulative() {
        let tokens = tokenize("a b");
        assert_eq!(tokens[0].offset, TextSize::new(0));
        assert_eq!(tokens[1].offset, TextSize::new(1));
        assert_eq!(tokens[2].offset, TextSize::new(2));
        assert_eq!(tokens[2].end(), TextSize::new(3));
    }

    #[test]
    fn test_keywords_resolved_from_ident_text() {
        let tokens = tokenize("class namespace defaulted");
        assert_eq!(tokens[0].kind, TokenKind::ClassKw);
        assert_eq!(tokens[2].kind, TokenKind::ModuleKw);
        // Prefix of a keyword stays an identifier
        assert_eq!(tokens[4].kind, TokenKind::Ident);
    }

    #[test]
    fn test_block_comment_is_single_token() {
        let tokens = tokenize("/* a\nb */x");
        assert_eq!(tokens[0].kind, TokenKind::BlockComment);
        assert_eq!(tokens[0].text, "/* a\nb */");
        assert_eq!(tokens[1].kind, TokenKind::Ident);
    }
}
