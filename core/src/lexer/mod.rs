//! Tokenizer for aoxim source text.
//!
//! The lexer is a pull scanner: the parser asks for one token at a time and
//! may snapshot/restore the cursor for lookahead. Malformed input never stops
//! the scan; it yields a `TokenKind::Error` token and advances past the bad
//! character so the parser can report it and keep going.

#[allow(clippy::module_inception)]
mod lexer;
mod token;


pub use lexer::{Lexer, LexerState};
pub use token::{LexError, SourceLoc, Span, Token, TokenKind};

/// Scan an entire buffer, stopping before end of input.
///
/// Used by tooling (REPL validation and highlighting) that only needs the
/// token stream.
pub fn tokenize(source: &str) -> Vec<Token<'_>> {
    Lexer::new(source).collect()
}
