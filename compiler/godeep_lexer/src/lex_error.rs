//! Lexer error types.

use godeep_ir::Span;

/// A lexer error: WHERE (`span`) and WHAT (`kind`).
#[derive(Clone, Debug, Eq, PartialEq, Hash, thiserror::Error)]
#[error("{kind}")]
pub struct LexError {
    pub span: Span,
    pub kind: LexErrorKind,
}

/// What kind of lexer error occurred.
#[derive(Clone, Debug, Eq, PartialEq, Hash, thiserror::Error)]
pub enum LexErrorKind {
    #[error("string literal not terminated")]
    UnterminatedString,
    #[error("raw string literal not terminated")]
    UnterminatedRawString,
    #[error("rune literal not terminated")]
    UnterminatedRune,
    #[error("invalid character {0:?}")]
    InvalidChar(char),
}

impl LexError {
    pub fn new(kind: LexErrorKind, span: Span) -> Self {
        LexError { span, kind }
    }

    /// Classify an unmatched slice by its first characters.
    pub(crate) fn from_unmatched(slice: &str, span: Span) -> Self {
        let kind = if slice.starts_with('"') {
            LexErrorKind::UnterminatedString
        } else if slice.starts_with('`') {
            LexErrorKind::UnterminatedRawString
        } else if slice.starts_with('\'') {
            LexErrorKind::UnterminatedRune
        } else {
            LexErrorKind::InvalidChar(slice.chars().next().unwrap_or('\0'))
        };
        LexError { span, kind }
    }
}
