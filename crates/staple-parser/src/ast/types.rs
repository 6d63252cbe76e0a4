//! Type expressions as written in source.

use staple_core::{PrimitiveKind, Span};

use super::Ident;

/// A type reference: a base name followed by zero or more `*`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TypeExpr<'ast> {
    pub base: TypeBase<'ast>,
    pub pointer_depth: u32,
    pub span: Span,
}

/// The named part of a type reference.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TypeBase<'ast> {
    Primitive(PrimitiveKind),
    /// A class or struct name, resolved during binding.
    Named(Ident<'ast>),
}

impl TypeExpr<'_> {
    pub fn is_void(&self) -> bool {
        self.pointer_depth == 0 && matches!(self.base, TypeBase::Primitive(PrimitiveKind::Void))
    }
}

impl std::fmt::Display for TypeExpr<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.base {
            TypeBase::Primitive(kind) => write!(f, "{kind}")?,
            TypeBase::Named(ident) => f.write_str(ident.name)?,
        }
        for _ in 0..self.pointer_depth {
            f.write_str("*")?;
        }
        Ok(())
    }
}
