//! Field, argument and local variable entries.

use crate::{Span, SymbolId, Type};

/// A storage slot declared in a class or struct body.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldEntry {
    pub name: String,
    pub span: Span,
    pub ty: Type,
    /// Declaring class or struct.
    pub owner: SymbolId,
    /// Storage offset within the flattened layout, assigned once layouts are final.
    pub offset: Option<u32>,
}

impl FieldEntry {
    pub fn new(name: impl Into<String>, span: Span, ty: Type, owner: SymbolId) -> Self {
        Self {
            name: name.into(),
            span,
            ty,
            owner,
            offset: None,
        }
    }
}

/// An argument or local variable.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableEntry {
    pub name: String,
    pub span: Span,
    pub ty: Type,
}

impl VariableEntry {
    pub fn new(name: impl Into<String>, span: Span, ty: Type) -> Self {
        Self {
            name: name.into(),
            span,
            ty,
        }
    }
}
