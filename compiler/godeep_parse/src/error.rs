//! Parse error types.
//!
//! A [`ParseError`] records where the parser stopped, what it expected,
//! and an [`ErrorContext`] for "while parsing X" messages.

use godeep_ir::{Span, TokenKind};
use godeep_lexer::LexError;
use std::fmt;

/// What was being parsed when an error occurred.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorContext {
    // === Top-level ===
    PackageClause,
    ImportDecl,
    TypeDecl,
    FuncDecl,
    ConstDecl,
    VarDecl,

    // === Types ===
    TypeExpr,
    TypeParams,
    Signature,
    StructType,
    InterfaceType,
    Receiver,

    // === Bodies ===
    Block,
    Statement,
    Expression,
    CompositeLiteral,
}

impl ErrorContext {
    /// Phrase suitable for "while parsing {description}".
    pub fn description(self) -> &'static str {
        match self {
            Self::PackageClause => "the package clause",
            Self::ImportDecl => "an import declaration",
            Self::TypeDecl => "a type declaration",
            Self::FuncDecl => "a function declaration",
            Self::ConstDecl => "a const declaration",
            Self::VarDecl => "a var declaration",
            Self::TypeExpr => "a type",
            Self::TypeParams => "type parameters",
            Self::Signature => "a function signature",
            Self::StructType => "a struct type",
            Self::InterfaceType => "an interface type",
            Self::Receiver => "a method receiver",
            Self::Block => "a block",
            Self::Statement => "a statement",
            Self::Expression => "an expression",
            Self::CompositeLiteral => "a composite literal",
        }
    }
}

/// What went wrong.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum ParseErrorKind {
    #[error("expected {expected}, found {found}")]
    UnexpectedToken {
        expected: &'static str,
        found: TokenKind,
    },
    #[error("unclosed `{{`")]
    UnclosedBrace,
    #[error("mixed named and unnamed parameters")]
    MixedParameters,
}

/// A parse error with location and context.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParseError {
    pub span: Span,
    pub kind: ParseErrorKind,
    pub context: Option<ErrorContext>,
}

impl ParseError {
    #[cold]
    pub fn new(kind: ParseErrorKind, span: Span) -> Self {
        ParseError {
            span,
            kind,
            context: None,
        }
    }

    /// Attach a context unless a more specific one is already set.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        if self.context.is_none() {
            self.context = Some(context);
        }
        self
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(context) = self.context {
            write!(f, " while parsing {}", context.description())?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {}

/// Any failure turning source text into a syntax tree.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum SyntaxError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl SyntaxError {
    pub fn span(&self) -> Span {
        match self {
            SyntaxError::Lex(err) => err.span,
            SyntaxError::Parse(err) => err.span,
        }
    }
}
