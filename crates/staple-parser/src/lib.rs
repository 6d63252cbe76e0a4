//! Lexer and parser for the Staple language.
//!
//! The parser produces an arena-allocated [`ast::Script`] in which every
//! bindable node carries a stable [`staple_core::NodeId`].

pub mod ast;
pub mod lexer;

pub use ast::Parser;
