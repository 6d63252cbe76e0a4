//! Struct symbol entry.

use crate::{Span, SymbolId};

/// A plain aggregate: named fields, no functions, no inheritance.
#[derive(Debug, Clone, PartialEq)]
pub struct StructEntry {
    pub name: String,
    pub span: Span,
    /// Field symbols in declaration order; a field's offset is its index.
    pub fields: Vec<SymbolId>,
}

impl StructEntry {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
            fields: Vec::new(),
        }
    }
}
