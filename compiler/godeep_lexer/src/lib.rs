//! Go lexer using logos.
//!
//! Produces a [`TokenList`] ready for the parser: comments are dropped and
//! Go's automatic semicolons are inserted, so the grammar can treat `;` as
//! the only statement terminator.
//!
//! ```text
//! source → RawToken (logos) → cook → TokenList
//! ```

mod cooker;
mod lex_error;
mod raw_token;

pub use lex_error::{LexError, LexErrorKind};

use godeep_ir::TokenList;

/// Byte-order mark, permitted by Go only as the first character of a file.
const BOM: &str = "\u{FEFF}";

/// Tokenize a Go source file.
pub fn lex(source: &str) -> Result<TokenList, LexError> {
    let (body, offset) = match source.strip_prefix(BOM) {
        Some(rest) => (rest, BOM.len()),
        None => (source, 0),
    };
    cooker::cook(body, offset)
}
