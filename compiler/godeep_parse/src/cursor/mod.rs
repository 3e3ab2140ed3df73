//! Token cursor for navigating the token stream.
//!
//! Provides low-level token access, lookahead, and consumption methods.

use godeep_ir::{Span, Token, TokenKind, TokenList};

/// Cursor for navigating tokens.
///
/// The token list always ends with `Eof`; the cursor never moves past it,
/// so `current()` is valid at every position.
pub(crate) struct Cursor<'a> {
    tokens: &'a [Token],
    source: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(tokens: &'a TokenList, source: &'a str) -> Self {
        Cursor {
            tokens: tokens.as_slice(),
            source,
            pos: 0,
        }
    }

    /// Current position, for backtracking with [`Cursor::set_position`].
    #[inline]
    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    pub(crate) fn set_position(&mut self, pos: usize) {
        debug_assert!(pos < self.tokens.len(), "cursor position out of bounds");
        self.pos = pos;
    }

    /// Get the current token.
    #[inline]
    pub(crate) fn current(&self) -> Token {
        self.nth(0)
    }

    #[inline]
    pub(crate) fn current_kind(&self) -> TokenKind {
        self.current().kind
    }

    #[inline]
    pub(crate) fn current_span(&self) -> Span {
        self.current().span
    }

    /// Kind of the token `n` positions ahead of the current one.
    #[inline]
    pub(crate) fn peek_kind(&self, n: usize) -> TokenKind {
        self.nth(n).kind
    }

    fn nth(&self, n: usize) -> Token {
        match self.tokens.get(self.pos + n).or(self.tokens.last()) {
            Some(token) => *token,
            None => Token::new(TokenKind::Eof, Span::DUMMY),
        }
    }

    /// Get the previous token's span.
    #[inline]
    pub(crate) fn previous_span(&self) -> Span {
        if self.pos > 0 {
            self.tokens[self.pos - 1].span
        } else {
            Span::DUMMY
        }
    }

    #[inline]
    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        self.current_kind() == kind
    }

    #[inline]
    pub(crate) fn is_at_end(&self) -> bool {
        self.check(TokenKind::Eof)
    }

    /// Consume the current token and return it.
    pub(crate) fn advance(&mut self) -> Token {
        let token = self.current();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    /// Consume the current token if it has the given kind.
    pub(crate) fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Source text covered by `span`.
    #[inline]
    pub(crate) fn text(&self, span: Span) -> &'a str {
        span.text(self.source)
    }
}
