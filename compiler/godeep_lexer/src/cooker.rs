//! Token cooking: raw logos tokens into the parser's token stream.
//!
//! Operators and keywords map 1:1. Comments disappear, except that a
//! general comment spanning a line break acts like a newline. Newlines
//! become semicolons when the previous token can end a statement.

use godeep_ir::{Span, Token, TokenKind, TokenList};
use logos::Logos;

use crate::lex_error::LexError;
use crate::raw_token::RawToken;

/// Cook `source`, shifting every span by `offset` bytes.
pub(crate) fn cook(source: &str, offset: usize) -> Result<TokenList, LexError> {
    let mut tokens = TokenList::new();
    let mut lexer = RawToken::lexer(source);

    while let Some(result) = lexer.next() {
        let range = lexer.span();
        let span = Span::from_range(range.start + offset..range.end + offset);
        let Ok(raw) = result else {
            return Err(LexError::from_unmatched(lexer.slice(), span));
        };

        match raw {
            RawToken::LineComment => {}
            RawToken::BlockComment => {
                if lexer.slice().contains('\n') {
                    line_break(&mut tokens, span.start);
                }
            }
            RawToken::Newline => line_break(&mut tokens, span.start),
            other => tokens.push(Token::new(convert(other), span)),
        }
    }

    let end = u32::try_from(source.len() + offset).unwrap_or(u32::MAX);
    line_break(&mut tokens, end);
    tokens.push(Token::new(TokenKind::Eof, Span::point(end)));
    Ok(tokens)
}

/// Insert an implicit semicolon if the line so far ends a statement.
fn line_break(tokens: &mut TokenList, at: u32) {
    if tokens.last_kind().is_some_and(TokenKind::ends_statement) {
        tokens.push(Token::new(TokenKind::Semicolon, Span::point(at)));
    }
}

fn convert(raw: RawToken) -> TokenKind {
    match raw {
        RawToken::Break => TokenKind::Break,
        RawToken::Case => TokenKind::Case,
        RawToken::Chan => TokenKind::Chan,
        RawToken::Const => TokenKind::Const,
        RawToken::Continue => TokenKind::Continue,
        RawToken::Default => TokenKind::Default,
        RawToken::Defer => TokenKind::Defer,
        RawToken::Else => TokenKind::Else,
        RawToken::Fallthrough => TokenKind::Fallthrough,
        RawToken::For => TokenKind::For,
        RawToken::Func => TokenKind::Func,
        RawToken::Go => TokenKind::Go,
        RawToken::Goto => TokenKind::Goto,
        RawToken::If => TokenKind::If,
        RawToken::Import => TokenKind::Import,
        RawToken::Interface => TokenKind::Interface,
        RawToken::Map => TokenKind::Map,
        RawToken::Package => TokenKind::Package,
        RawToken::Range => TokenKind::Range,
        RawToken::Return => TokenKind::Return,
        RawToken::Select => TokenKind::Select,
        RawToken::Struct => TokenKind::Struct,
        RawToken::Switch => TokenKind::Switch,
        RawToken::Type => TokenKind::Type,
        RawToken::Var => TokenKind::Var,
        RawToken::Ident => TokenKind::Ident,
        RawToken::Number => TokenKind::Number,
        RawToken::Rune => TokenKind::Rune,
        RawToken::String => TokenKind::String,
        RawToken::RawString => TokenKind::RawString,
        RawToken::Plus => TokenKind::Plus,
        RawToken::Minus => TokenKind::Minus,
        RawToken::Star => TokenKind::Star,
        RawToken::Slash => TokenKind::Slash,
        RawToken::Percent => TokenKind::Percent,
        RawToken::Amp => TokenKind::Amp,
        RawToken::Pipe => TokenKind::Pipe,
        RawToken::Caret => TokenKind::Caret,
        RawToken::Shl => TokenKind::Shl,
        RawToken::Shr => TokenKind::Shr,
        RawToken::AndNot => TokenKind::AndNot,
        RawToken::PlusAssign => TokenKind::PlusAssign,
        RawToken::MinusAssign => TokenKind::MinusAssign,
        RawToken::StarAssign => TokenKind::StarAssign,
        RawToken::SlashAssign => TokenKind::SlashAssign,
        RawToken::PercentAssign => TokenKind::PercentAssign,
        RawToken::AmpAssign => TokenKind::AmpAssign,
        RawToken::PipeAssign => TokenKind::PipeAssign,
        RawToken::CaretAssign => TokenKind::CaretAssign,
        RawToken::ShlAssign => TokenKind::ShlAssign,
        RawToken::ShrAssign => TokenKind::ShrAssign,
        RawToken::AndNotAssign => TokenKind::AndNotAssign,
        RawToken::AndAnd => TokenKind::AndAnd,
        RawToken::OrOr => TokenKind::OrOr,
        RawToken::Arrow => TokenKind::Arrow,
        RawToken::Inc => TokenKind::Inc,
        RawToken::Dec => TokenKind::Dec,
        RawToken::EqEq => TokenKind::EqEq,
        RawToken::Lt => TokenKind::Lt,
        RawToken::Gt => TokenKind::Gt,
        RawToken::Assign => TokenKind::Assign,
        RawToken::Not => TokenKind::Not,
        RawToken::Tilde => TokenKind::Tilde,
        RawToken::NotEq => TokenKind::NotEq,
        RawToken::LtEq => TokenKind::LtEq,
        RawToken::GtEq => TokenKind::GtEq,
        RawToken::Define => TokenKind::Define,
        RawToken::Ellipsis => TokenKind::Ellipsis,
        RawToken::LParen => TokenKind::LParen,
        RawToken::RParen => TokenKind::RParen,
        RawToken::LBracket => TokenKind::LBracket,
        RawToken::RBracket => TokenKind::RBracket,
        RawToken::LBrace => TokenKind::LBrace,
        RawToken::RBrace => TokenKind::RBrace,
        RawToken::Comma => TokenKind::Comma,
        RawToken::Dot => TokenKind::Dot,
        RawToken::Semicolon => TokenKind::Semicolon,
        RawToken::Colon => TokenKind::Colon,
        // Comments and newlines never reach conversion.
        RawToken::LineComment | RawToken::BlockComment | RawToken::Newline => {
            TokenKind::Semicolon
        }
    }
}
