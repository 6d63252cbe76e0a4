//! Lexical analysis for Staple.

mod cursor;
mod lexer;
mod token;

pub use lexer::{Lexer, decode_string_literal};
pub use token::{Token, TokenKind, lookup_keyword};
