//! godeep IR - shared front-end data structures.
//!
//! This crate holds everything the Go front end passes between phases:
//! - [`Span`] for byte-offset source locations
//! - [`Token`], [`TokenKind`] and [`TokenList`] produced by the lexer
//! - the syntax tree in [`ast`] produced by the parser
//! - [`ensure_sufficient_stack`] for the recursive phases
//!
//! Nothing here knows how to lex, parse or resolve; it only describes the
//! shapes those phases agree on.

pub mod ast;
mod span;
mod stack;
mod token;

pub use span::{LineCol, Span};
pub use stack::ensure_sufficient_stack;
pub use token::{Token, TokenKind, TokenList};
