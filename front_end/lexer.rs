//! Lexer for MC source text, built on `logos`.
//!
//! Produces a flat token stream with byte spans; `Parser` turns spans into
//! `(line, column)` pairs on demand (see `Parser::pos_at`), the same scheme
//! the teacher's hand-rolled lexer used.

use derive_more::Display;
use logos::Logos;

#[derive(Logos, Clone, Copy, Debug, Eq, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
#[logos(skip r"//[^\n]*")]
pub enum TokenKind {
    #[token("int")]
    Int,
    #[token("bool")]
    Bool,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("while")]
    While,
    #[token("return")]
    Return,
    #[token("print")]
    Print,
    #[token("true")]
    True,
    #[token("false")]
    False,

    #[regex("[A-Za-z_][A-Za-z0-9_]*")]
    Ident,
    #[regex("[0-9]+")]
    Number,

    #[token("==")]
    EqEq,
    #[token("!=")]
    Neq,
    #[token("<=")]
    Le,
    #[token(">=")]
    Ge,
    #[token("&&")]
    AndAnd,
    #[token("||")]
    OrOr,

    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("=")]
    Eq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("!")]
    Not,

    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(";")]
    Semi,
    #[token(",")]
    Comma,
}

#[derive(Clone, Copy, Debug)]
pub struct Token {
    pub kind: TokenKind,
    pub span: std::ops::Range<usize>,
}

#[derive(Clone, Debug, Display, Eq, PartialEq)]
#[display(fmt = "{}", _0)]
pub struct LexError(pub String);
impl std::error::Error for LexError {}

// Scans the full source into a token stream. Does not append an explicit
// EOF token; `Parser` treats running off the end of `tokens` as EOF.
pub fn lex(source: &str) -> Result<Vec<Token>, LexError> {
    let mut lexer = TokenKind::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        match result {
            Ok(kind) => tokens.push(Token { kind, span }),
            Err(()) => {
                let (line, column) = pos_at(source, span.start);
                return Err(LexError(format!(
                    "unexpected character {:?} at line {line}, column {column}",
                    &source[span.clone()]
                )));
            }
        }
    }

    Ok(tokens)
}

// Converts a byte offset into 1-based (line, column), matching the teacher
// parser's `Parser::error` row/column reconstruction.
pub fn pos_at(source: &str, byte: usize) -> (usize, usize) {
    let mut line = 1;
    let mut line_start = 0;

    for (idx, ch) in source.char_indices() {
        if idx >= byte {
            break;
        }
        if ch == '\n' {
            line += 1;
            line_start = idx + 1;
        }
    }

    (line, byte - line_start + 1)
}
