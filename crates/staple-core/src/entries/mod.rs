//! Symbol entries.
//!
//! A [`Symbol`] is everything a name can be bound to. Symbols are created once
//! by the declaration or resolution pass and stored in the registry's arena.
//! Class symbols keep growing while their body is resolved; function symbols
//! created ahead of resolution receive their signature exactly once.

mod class;
mod function;
mod literal;
mod struct_entry;
mod variable;

pub use class::{ClassEntry, ClassLayout};
pub use function::{FunctionEntry, FunctionTraits};
pub use literal::StringLiteralEntry;
pub use struct_entry::StructEntry;
pub use variable::{FieldEntry, VariableEntry};

use crate::Span;

/// A named program entity.
#[derive(Debug, Clone, PartialEq)]
pub enum Symbol {
    Class(ClassEntry),
    Struct(StructEntry),
    Function(FunctionEntry),
    Field(FieldEntry),
    Argument(VariableEntry),
    LocalVariable(VariableEntry),
    StringLiteral(StringLiteralEntry),
    /// The trailing `...` of a variadic external function.
    MultiArgumentMarker,
}

impl Symbol {
    /// Name the symbol is bound under.
    pub fn name(&self) -> &str {
        match self {
            Symbol::Class(c) => &c.name,
            Symbol::Struct(s) => &s.name,
            Symbol::Function(f) => &f.name,
            Symbol::Field(f) => &f.name,
            Symbol::Argument(v) | Symbol::LocalVariable(v) => &v.name,
            Symbol::StringLiteral(s) => &s.global_name,
            Symbol::MultiArgumentMarker => "...",
        }
    }

    /// Declaration site, if the symbol came from source.
    pub fn span(&self) -> Option<Span> {
        match self {
            Symbol::Class(c) => c.span,
            Symbol::Struct(s) => Some(s.span),
            Symbol::Function(f) => f.span,
            Symbol::Field(f) => Some(f.span),
            Symbol::Argument(v) | Symbol::LocalVariable(v) => Some(v.span),
            Symbol::StringLiteral(_) | Symbol::MultiArgumentMarker => None,
        }
    }

    /// Short description used in diagnostics ("class", "local variable", ...).
    pub fn kind_name(&self) -> &'static str {
        match self {
            Symbol::Class(_) => "class",
            Symbol::Struct(_) => "struct",
            Symbol::Function(_) => "function",
            Symbol::Field(_) => "field",
            Symbol::Argument(_) => "argument",
            Symbol::LocalVariable(_) => "local variable",
            Symbol::StringLiteral(_) => "string literal",
            Symbol::MultiArgumentMarker => "variadic marker",
        }
    }

    pub fn as_class(&self) -> Option<&ClassEntry> {
        match self {
            Symbol::Class(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&StructEntry> {
        match self {
            Symbol::Struct(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&FunctionEntry> {
        match self {
            Symbol::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_field(&self) -> Option<&FieldEntry> {
        match self {
            Symbol::Field(f) => Some(f),
            _ => None,
        }
    }

    /// The variable entry of an argument or local.
    pub fn as_variable(&self) -> Option<&VariableEntry> {
        match self {
            Symbol::Argument(v) | Symbol::LocalVariable(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_string_literal(&self) -> Option<&StringLiteralEntry> {
        match self {
            Symbol::StringLiteral(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_argument(&self) -> bool {
        matches!(self, Symbol::Argument(_))
    }
}
