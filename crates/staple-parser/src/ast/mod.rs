//! Abstract syntax tree for Staple.
//!
//! Nodes are allocated in a [`bumpalo::Bump`] arena owned by the caller and
//! borrow from it for `'ast`. Every node that later stages bind information
//! to carries a [`NodeId`]; resolved symbols, types and scopes are kept in
//! side tables keyed by that id rather than stored in the tree.
//!
//! # Example
//!
//! ```ignore
//! use bumpalo::Bump;
//! use staple_parser::Parser;
//!
//! let arena = Bump::new();
//! let script = Parser::parse("int main() { return 0; }", &arena)?;
//! assert_eq!(script.items.len(), 1);
//! ```

mod decl;
mod decl_parser;
mod expr;
mod expr_parser;
mod ops;
mod parser;
mod stmt;
mod stmt_parser;
mod type_parser;
mod types;
pub mod visitor;

pub use decl::*;
pub use expr::*;
pub use ops::{ArithmeticOp, BinaryOp, CompareOp};
pub use parser::Parser;
pub use stmt::*;
pub use types::{TypeBase, TypeExpr};

use staple_core::Span;

/// An identifier with its source location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ident<'ast> {
    pub name: &'ast str,
    pub span: Span,
}

impl<'ast> Ident<'ast> {
    #[inline]
    pub fn new(name: &'ast str, span: Span) -> Self {
        Self { name, span }
    }
}

/// A parsed compile unit.
#[derive(Debug, Clone, Copy)]
pub struct Script<'ast> {
    pub items: &'ast [Item<'ast>],
    pub span: Span,
    /// Number of node ids issued while parsing; every id is below this.
    pub node_count: u32,
}

impl<'ast> Script<'ast> {
    pub fn classes(&self) -> impl Iterator<Item = &ClassDecl<'ast>> {
        self.items.iter().filter_map(|item| match item {
            Item::Class(class) => Some(class),
            _ => None,
        })
    }

    pub fn structs(&self) -> impl Iterator<Item = &StructDecl<'ast>> {
        self.items.iter().filter_map(|item| match item {
            Item::Struct(s) => Some(s),
            _ => None,
        })
    }

    /// Free functions and external declarations, in source order.
    pub fn functions(&self) -> impl Iterator<Item = &FunctionDecl<'ast>> {
        self.items.iter().filter_map(|item| match item {
            Item::Function(f) => Some(f),
            _ => None,
        })
    }
}
