//! Class symbol entry.

use crate::{Span, SymbolId};

/// A declared class.
///
/// `fields` and `functions` hold only the members declared by this class, in
/// declaration order. The flattened view including inherited members lives in
/// [`ClassLayout`], computed once every class is bound.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassEntry {
    pub name: String,
    /// `None` for classes supplied by the runtime.
    pub span: Option<Span>,
    /// Bound parent class. Only the root base class has none.
    pub parent: Option<SymbolId>,
    pub fields: Vec<SymbolId>,
    pub functions: Vec<SymbolId>,
    /// Provided by the runtime rather than declared in source.
    pub external: bool,
    pub layout: Option<ClassLayout>,
}

impl ClassEntry {
    /// A class declared in source.
    pub fn script(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span: Some(span),
            parent: None,
            fields: Vec::new(),
            functions: Vec::new(),
            external: false,
            layout: None,
        }
    }

    /// A class provided by the runtime.
    pub fn external(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            span: None,
            parent: None,
            fields: Vec::new(),
            functions: Vec::new(),
            external: true,
            layout: None,
        }
    }

    /// Name of the dispatch/metadata record type, e.g. `FooClass`.
    pub fn dispatch_record_name(&self) -> String {
        format!("{}Class", self.name)
    }

    /// Name of the global dispatch record instance, e.g. `FooClassObj`.
    pub fn dispatch_instance_name(&self) -> String {
        format!("{}ClassObj", self.name)
    }

    /// Name of the global holding the class name text, e.g. `FooName`.
    pub fn name_global_name(&self) -> String {
        format!("{}Name", self.name)
    }
}

/// Flattened storage and dispatch order of a class.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClassLayout {
    /// Inherited fields first, then own fields. A field's storage offset is
    /// its index here.
    pub fields: Vec<SymbolId>,
    /// Dispatch slots: the parent's slots (overridden in place), then new
    /// functions.
    pub dispatch: Vec<SymbolId>,
}

impl ClassLayout {
    /// Storage offset of `field`, if it belongs to this layout.
    pub fn offset_of(&self, field: SymbolId) -> Option<u32> {
        self.fields.iter().position(|f| *f == field).map(|i| i as u32)
    }
}
