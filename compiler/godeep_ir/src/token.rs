//! Go tokens.
//!
//! Tokens carry no text: identifiers and literals are recovered by slicing
//! the source with the token span. Automatic semicolons inserted by the
//! lexer have a zero-length span at the position of the line break.

use crate::Span;
use std::fmt;

/// A token with its span in the source.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    #[inline]
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Token { kind, span }
    }

    /// True for a semicolon synthesized at a line break.
    #[inline]
    pub fn is_implicit_semicolon(&self) -> bool {
        self.kind == TokenKind::Semicolon && self.span.is_empty()
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} @ {}", self.kind, self.span)
    }
}

/// Go token kinds.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum TokenKind {
    Ident,
    /// Integer, float or imaginary literal.
    Number,
    /// Rune literal: `'a'`, `'\n'`.
    Rune,
    /// Interpreted string literal: `"a\tb"`.
    String,
    /// Raw string literal: `` `a\tb` ``.
    RawString,

    // Keywords
    Break,
    Case,
    Chan,
    Const,
    Continue,
    Default,
    Defer,
    Else,
    Fallthrough,
    For,
    Func,
    Go,
    Goto,
    If,
    Import,
    Interface,
    Map,
    Package,
    Range,
    Return,
    Select,
    Struct,
    Switch,
    Type,
    Var,

    // Arithmetic and bitwise operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Amp,
    Pipe,
    Caret,
    Shl,
    Shr,
    AndNot,

    // Assignment operators
    PlusAssign,
    MinusAssign,
    StarAssign,
    SlashAssign,
    PercentAssign,
    AmpAssign,
    PipeAssign,
    CaretAssign,
    ShlAssign,
    ShrAssign,
    AndNotAssign,

    AndAnd,
    OrOr,
    Arrow,
    Inc,
    Dec,
    EqEq,
    Lt,
    Gt,
    Assign,
    Not,
    Tilde,
    NotEq,
    LtEq,
    GtEq,
    Define,
    Ellipsis,

    // Delimiters
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Dot,
    Semicolon,
    Colon,

    Eof,
}

impl TokenKind {
    /// Human-readable form used in parse diagnostics.
    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::Ident => "identifier",
            TokenKind::Number => "number",
            TokenKind::Rune => "rune literal",
            TokenKind::String | TokenKind::RawString => "string literal",
            TokenKind::Break => "`break`",
            TokenKind::Case => "`case`",
            TokenKind::Chan => "`chan`",
            TokenKind::Const => "`const`",
            TokenKind::Continue => "`continue`",
            TokenKind::Default => "`default`",
            TokenKind::Defer => "`defer`",
            TokenKind::Else => "`else`",
            TokenKind::Fallthrough => "`fallthrough`",
            TokenKind::For => "`for`",
            TokenKind::Func => "`func`",
            TokenKind::Go => "`go`",
            TokenKind::Goto => "`goto`",
            TokenKind::If => "`if`",
            TokenKind::Import => "`import`",
            TokenKind::Interface => "`interface`",
            TokenKind::Map => "`map`",
            TokenKind::Package => "`package`",
            TokenKind::Range => "`range`",
            TokenKind::Return => "`return`",
            TokenKind::Select => "`select`",
            TokenKind::Struct => "`struct`",
            TokenKind::Switch => "`switch`",
            TokenKind::Type => "`type`",
            TokenKind::Var => "`var`",
            TokenKind::Plus => "`+`",
            TokenKind::Minus => "`-`",
            TokenKind::Star => "`*`",
            TokenKind::Slash => "`/`",
            TokenKind::Percent => "`%`",
            TokenKind::Amp => "`&`",
            TokenKind::Pipe => "`|`",
            TokenKind::Caret => "`^`",
            TokenKind::Shl => "`<<`",
            TokenKind::Shr => "`>>`",
            TokenKind::AndNot => "`&^`",
            TokenKind::PlusAssign => "`+=`",
            TokenKind::MinusAssign => "`-=`",
            TokenKind::StarAssign => "`*=`",
            TokenKind::SlashAssign => "`/=`",
            TokenKind::PercentAssign => "`%=`",
            TokenKind::AmpAssign => "`&=`",
            TokenKind::PipeAssign => "`|=`",
            TokenKind::CaretAssign => "`^=`",
            TokenKind::ShlAssign => "`<<=`",
            TokenKind::ShrAssign => "`>>=`",
            TokenKind::AndNotAssign => "`&^=`",
            TokenKind::AndAnd => "`&&`",
            TokenKind::OrOr => "`||`",
            TokenKind::Arrow => "`<-`",
            TokenKind::Inc => "`++`",
            TokenKind::Dec => "`--`",
            TokenKind::EqEq => "`==`",
            TokenKind::Lt => "`<`",
            TokenKind::Gt => "`>`",
            TokenKind::Assign => "`=`",
            TokenKind::Not => "`!`",
            TokenKind::Tilde => "`~`",
            TokenKind::NotEq => "`!=`",
            TokenKind::LtEq => "`<=`",
            TokenKind::GtEq => "`>=`",
            TokenKind::Define => "`:=`",
            TokenKind::Ellipsis => "`...`",
            TokenKind::LParen => "`(`",
            TokenKind::RParen => "`)`",
            TokenKind::LBracket => "`[`",
            TokenKind::RBracket => "`]`",
            TokenKind::LBrace => "`{`",
            TokenKind::RBrace => "`}`",
            TokenKind::Comma => "`,`",
            TokenKind::Dot => "`.`",
            TokenKind::Semicolon => "`;`",
            TokenKind::Colon => "`:`",
            TokenKind::Eof => "end of file",
        }
    }

    /// Whether a line break after this token ends the statement.
    ///
    /// This is Go's automatic semicolon rule: identifiers, literals, the
    /// keywords `break continue fallthrough return`, the operators `++ --`
    /// and the closers `) ] }`.
    pub fn ends_statement(self) -> bool {
        matches!(
            self,
            TokenKind::Ident
                | TokenKind::Number
                | TokenKind::Rune
                | TokenKind::String
                | TokenKind::RawString
                | TokenKind::Break
                | TokenKind::Continue
                | TokenKind::Fallthrough
                | TokenKind::Return
                | TokenKind::Inc
                | TokenKind::Dec
                | TokenKind::RParen
                | TokenKind::RBracket
                | TokenKind::RBrace
        )
    }

    /// Whether this is one of `= += -= ...` (but not `:=`).
    pub fn is_assign_op(self) -> bool {
        matches!(
            self,
            TokenKind::Assign
                | TokenKind::PlusAssign
                | TokenKind::MinusAssign
                | TokenKind::StarAssign
                | TokenKind::SlashAssign
                | TokenKind::PercentAssign
                | TokenKind::AmpAssign
                | TokenKind::PipeAssign
                | TokenKind::CaretAssign
                | TokenKind::ShlAssign
                | TokenKind::ShrAssign
                | TokenKind::AndNotAssign
        )
    }

    /// Binary operator precedence (Go spec: 5 binds tightest), or 0.
    pub fn binary_precedence(self) -> u8 {
        match self {
            TokenKind::OrOr => 1,
            TokenKind::AndAnd => 2,
            TokenKind::EqEq
            | TokenKind::NotEq
            | TokenKind::Lt
            | TokenKind::LtEq
            | TokenKind::Gt
            | TokenKind::GtEq => 3,
            TokenKind::Plus | TokenKind::Minus | TokenKind::Pipe | TokenKind::Caret => 4,
            TokenKind::Star
            | TokenKind::Slash
            | TokenKind::Percent
            | TokenKind::Shl
            | TokenKind::Shr
            | TokenKind::Amp
            | TokenKind::AndNot => 5,
            _ => 0,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// Lexer output: tokens in source order, always terminated by `Eof`.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TokenList {
    tokens: Vec<Token>,
}

impl TokenList {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    /// Kind of the most recently pushed token, if any.
    #[inline]
    pub fn last_kind(&self) -> Option<TokenKind> {
        self.tokens.last().map(|t| t.kind)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    #[inline]
    pub fn as_slice(&self) -> &[Token] {
        &self.tokens
    }

    pub fn kinds(&self) -> impl Iterator<Item = TokenKind> + '_ {
        self.tokens.iter().map(|t| t.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_semicolon_rule() {
        assert!(TokenKind::Ident.ends_statement());
        assert!(TokenKind::RBrace.ends_statement());
        assert!(TokenKind::Return.ends_statement());
        assert!(!TokenKind::LBrace.ends_statement());
        assert!(!TokenKind::Comma.ends_statement());
        assert!(!TokenKind::Func.ends_statement());
    }

    #[test]
    fn test_precedence_ordering() {
        assert!(TokenKind::Star.binary_precedence() > TokenKind::Plus.binary_precedence());
        assert!(TokenKind::Plus.binary_precedence() > TokenKind::EqEq.binary_precedence());
        assert!(TokenKind::EqEq.binary_precedence() > TokenKind::AndAnd.binary_precedence());
        assert!(TokenKind::AndAnd.binary_precedence() > TokenKind::OrOr.binary_precedence());
        assert_eq!(TokenKind::Define.binary_precedence(), 0);
    }

    #[test]
    fn test_implicit_semicolon() {
        let implicit = Token::new(TokenKind::Semicolon, Span::point(4));
        let explicit = Token::new(TokenKind::Semicolon, Span::new(4, 5));
        assert!(implicit.is_implicit_semicolon());
        assert!(!explicit.is_implicit_semicolon());
    }
}
