//! Recursive-descent parser for Go source files.
//!
//! Two modes share one grammar:
//! - [`ParseMode::Signatures`] is used when loading packages. Function
//!   bodies are skipped by brace matching and `var`/`const` declarations
//!   are skipped to their terminating semicolon, so only the shapes the
//!   type model needs are built.
//! - [`ParseMode::Full`] also parses function bodies. It checks that
//!   generated code is syntactically valid Go.

mod cursor;
mod error;
mod grammar;

pub use error::{ErrorContext, ParseError, ParseErrorKind, SyntaxError};

use cursor::Cursor;
use godeep_ir::ast::{File, Ident};
use godeep_ir::{Token, TokenKind, TokenList};

/// How much of a file to parse.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParseMode {
    /// Declarations only; function bodies are skipped.
    Signatures,
    /// Declarations and function bodies.
    Full,
}

/// Lex and parse one source file.
pub fn parse_source(source: &str, mode: ParseMode) -> Result<File, SyntaxError> {
    let tokens = godeep_lexer::lex(source)?;
    Ok(parse_file(source, &tokens, mode)?)
}

/// Parse an already lexed source file.
pub fn parse_file(source: &str, tokens: &TokenList, mode: ParseMode) -> Result<File, ParseError> {
    let mut parser = Parser::new(tokens, source, mode);
    let file = parser.parse_file()?;
    tracing::trace!(
        package = %file.package.name,
        imports = file.imports.len(),
        decls = file.decls.len(),
        ?mode,
        "parsed file"
    );
    Ok(file)
}

/// Parser state.
pub(crate) struct Parser<'a> {
    cursor: Cursor<'a>,
    mode: ParseMode,
    /// Set while parsing `if`/`for` headers, where `T {` opens the body
    /// rather than a composite literal. Cleared inside brackets.
    no_composite: bool,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a TokenList, source: &'a str, mode: ParseMode) -> Self {
        Parser {
            cursor: Cursor::new(tokens, source),
            mode,
            no_composite: false,
        }
    }

    /// Consume a token of `kind` or fail naming `expected`.
    pub(crate) fn expect(
        &mut self,
        kind: TokenKind,
        expected: &'static str,
    ) -> Result<Token, ParseError> {
        if self.cursor.check(kind) {
            Ok(self.cursor.advance())
        } else {
            Err(self.unexpected(expected))
        }
    }

    pub(crate) fn expect_ident(&mut self) -> Result<Ident, ParseError> {
        let token = self.expect(TokenKind::Ident, "identifier")?;
        Ok(Ident::new(self.cursor.text(token.span), token.span))
    }

    /// A statement terminator. Go lets it be omitted before `)` and `}`.
    pub(crate) fn expect_semi(&mut self) -> Result<(), ParseError> {
        if self.cursor.eat(TokenKind::Semicolon)
            || matches!(
                self.cursor.current_kind(),
                TokenKind::RParen | TokenKind::RBrace
            )
        {
            Ok(())
        } else {
            Err(self.unexpected("`;` or newline"))
        }
    }

    #[cold]
    pub(crate) fn unexpected(&self, expected: &'static str) -> ParseError {
        ParseError::new(
            ParseErrorKind::UnexpectedToken {
                expected,
                found: self.cursor.current_kind(),
            },
            self.cursor.current_span(),
        )
    }

    /// Run `f`, tagging any error it returns with `context`.
    pub(crate) fn in_context<T>(
        &mut self,
        context: ErrorContext,
        f: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        f(self).map_err(|err| err.with_context(context))
    }

    /// Run `f` with composite literals allowed or suppressed.
    pub(crate) fn with_composite<T>(
        &mut self,
        allowed: bool,
        f: impl FnOnce(&mut Self) -> T,
    ) -> T {
        let saved = self.no_composite;
        self.no_composite = !allowed;
        let result = f(self);
        self.no_composite = saved;
        result
    }
}

#[cfg(test)]
mod tests;
