//! Symbol Table - arena of every symbol in a compile unit.
//!
//! Symbols are appended and never removed. The table is created with the
//! runtime-provided root class `Object` already registered, so every class
//! declared in source has somewhere to inherit from.

use rustc_hash::{FxHashMap, FxHashSet};
use staple_core::{
    ClassEntry, ClassLayout, FieldEntry, FunctionEntry, FunctionTraits, INIT_FUNCTION_NAME,
    ROOT_CLASS_NAME, Span, StringLiteralEntry, Symbol, SymbolId, Type,
};

use crate::RegistryError;

/// Owner of all symbols of a compile unit.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
    root_class: SymbolId,
    /// Literal text -> its deduplicated storage symbol.
    literals: FxHashMap<String, SymbolId>,
    literal_order: Vec<SymbolId>,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    /// Create a table containing the root class and its runtime members.
    ///
    /// `Object` carries the instance header every object starts with
    /// (`classType`, `refCount`) and the `init`/`dest` entry points.
    pub fn new() -> Self {
        let mut table = Self {
            symbols: Vec::new(),
            root_class: SymbolId::new(0),
            literals: FxHashMap::default(),
            literal_order: Vec::new(),
        };

        let root = table.add(Symbol::Class(ClassEntry::external(ROOT_CLASS_NAME)));
        table.root_class = root;

        for (name, ty) in [("classType", Type::void_pointer()), ("refCount", Type::UINT32)] {
            let field = table.add(Symbol::Field(FieldEntry::new(name, Span::default(), ty, root)));
            table.push_field(root, field);
        }
        for name in [INIT_FUNCTION_NAME, "dest"] {
            let mut entry =
                FunctionEntry::member(name, ROOT_CLASS_NAME, root, None, FunctionTraits::EXTERNAL);
            entry.return_type = Type::VOID;
            entry.signature_resolved = true;
            let function = table.add(Symbol::Function(entry));
            table.push_function(root, function);
        }

        table
    }

    // =========================================
    // Arena access
    // =========================================

    /// Store a symbol and return its id.
    pub fn add(&mut self, symbol: Symbol) -> SymbolId {
        let id = SymbolId::new(self.symbols.len() as u32);
        self.symbols.push(symbol);
        id
    }

    pub fn get(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.index()]
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SymbolId, &Symbol)> {
        self.symbols
            .iter()
            .enumerate()
            .map(|(i, s)| (SymbolId::new(i as u32), s))
    }

    pub fn root_class(&self) -> SymbolId {
        self.root_class
    }

    pub fn name(&self, id: SymbolId) -> &str {
        self.get(id).name()
    }

    pub fn class(&self, id: SymbolId) -> Option<&ClassEntry> {
        self.get(id).as_class()
    }

    pub fn function(&self, id: SymbolId) -> Option<&FunctionEntry> {
        self.get(id).as_function()
    }

    pub fn field(&self, id: SymbolId) -> Option<&FieldEntry> {
        self.get(id).as_field()
    }

    /// All classes in registration order, root first.
    pub fn classes(&self) -> impl Iterator<Item = (SymbolId, &ClassEntry)> {
        self.iter().filter_map(|(id, s)| s.as_class().map(|c| (id, c)))
    }

    fn class_mut(&mut self, id: SymbolId) -> Option<&mut ClassEntry> {
        match &mut self.symbols[id.index()] {
            Symbol::Class(c) => Some(c),
            _ => None,
        }
    }

    pub(crate) fn symbol_mut(&mut self, id: SymbolId) -> &mut Symbol {
        &mut self.symbols[id.index()]
    }

    // =========================================
    // Growing classes, structs and functions
    // =========================================

    pub fn set_parent(&mut self, class: SymbolId, parent: SymbolId) {
        if let Some(entry) = self.class_mut(class) {
            entry.parent = Some(parent);
        }
    }

    /// Append a field to a class or struct.
    pub fn push_field(&mut self, owner: SymbolId, field: SymbolId) {
        match &mut self.symbols[owner.index()] {
            Symbol::Class(c) => c.fields.push(field),
            Symbol::Struct(s) => s.fields.push(field),
            _ => {}
        }
    }

    pub fn push_function(&mut self, class: SymbolId, function: SymbolId) {
        if let Some(entry) = self.class_mut(class) {
            entry.functions.push(function);
        }
    }

    /// Put `new` in the function slot of `class` currently held by `old`.
    pub fn replace_function(&mut self, class: SymbolId, old: SymbolId, new: SymbolId) -> bool {
        let Some(entry) = self.class_mut(class) else {
            return false;
        };
        match entry.functions.iter_mut().find(|f| **f == old) {
            Some(slot) => {
                *slot = new;
                true
            }
            None => false,
        }
    }

    /// Fill in a function's signature. Only the first call has an effect.
    pub fn set_signature(
        &mut self,
        function: SymbolId,
        return_type: Type,
        arguments: Vec<SymbolId>,
    ) -> Result<(), RegistryError> {
        let Symbol::Function(entry) = &mut self.symbols[function.index()] else {
            return Err(RegistryError::WrongKind {
                id: function,
                expected: "function",
            });
        };
        if !entry.signature_resolved {
            entry.return_type = return_type;
            entry.arguments = arguments;
            entry.signature_resolved = true;
        }
        Ok(())
    }

    // =========================================
    // String literals
    // =========================================

    /// The storage symbol for `text`, creating it on first use.
    pub fn intern_string(&mut self, text: &str) -> SymbolId {
        if let Some(id) = self.literals.get(text) {
            return *id;
        }
        let entry = StringLiteralEntry::new(text, self.literal_order.len());
        let id = self.add(Symbol::StringLiteral(entry));
        self.literals.insert(text.to_string(), id);
        self.literal_order.push(id);
        id
    }

    pub fn string_literal(&self, text: &str) -> Option<SymbolId> {
        self.literals.get(text).copied()
    }

    /// Interned literals in first-use order.
    pub fn string_literals(&self) -> &[SymbolId] {
        &self.literal_order
    }

    // =========================================
    // Types
    // =========================================

    /// The type of a symbol.
    pub fn symbol_type(&self, id: SymbolId) -> Type {
        match self.get(id) {
            Symbol::Class(_) => Type::Class(id),
            Symbol::Struct(_) => Type::Struct(id),
            Symbol::Function(_) => Type::Function(id),
            Symbol::Field(f) => f.ty.clone(),
            Symbol::Argument(v) | Symbol::LocalVariable(v) => v.ty.clone(),
            Symbol::StringLiteral(s) => s.storage_type(),
            Symbol::MultiArgumentMarker => Type::Error,
        }
    }

    /// Source-level spelling of a type, for diagnostics.
    pub fn type_name(&self, ty: &Type) -> String {
        match ty {
            Type::Primitive(kind) => kind.name().to_string(),
            Type::Pointer(base) => format!("{}*", self.type_name(base)),
            Type::Array(base, len) => format!("{}[{len}]", self.type_name(base)),
            Type::Function(id) | Type::Class(id) | Type::Struct(id) => self.name(*id).to_string(),
            Type::Error => "<error>".to_string(),
        }
    }

    // =========================================
    // Inheritance and member lookup
    // =========================================

    /// `class` followed by its ancestors, nearest first, ending at the root.
    ///
    /// Stops early if the chain revisits a class.
    pub fn ancestors(&self, class: SymbolId) -> Vec<SymbolId> {
        let mut chain = Vec::new();
        let mut current = Some(class);
        while let Some(id) = current {
            if chain.contains(&id) {
                break;
            }
            chain.push(id);
            current = self.class(id).and_then(|c| c.parent);
        }
        chain
    }

    /// Whether `class` is `ancestor` or inherits from it.
    pub fn is_subclass_of(&self, class: SymbolId, ancestor: SymbolId) -> bool {
        self.ancestors(class).contains(&ancestor)
    }

    /// Whether `record` holds a copy of itself, through by-value fields or
    /// base classes, at any depth. Pointers break the chain.
    pub fn contains_itself(&self, record: SymbolId) -> bool {
        let mut seen = FxHashSet::default();
        let mut pending = self.inline_records(record);
        while let Some(next) = pending.pop() {
            if next == record {
                return true;
            }
            if seen.insert(next) {
                pending.extend(self.inline_records(next));
            }
        }
        false
    }

    /// Records stored directly inside `record`: its parent class and the
    /// by-value types of its own fields.
    fn inline_records(&self, record: SymbolId) -> Vec<SymbolId> {
        let (parent, fields) = match self.get(record) {
            Symbol::Class(class) => (class.parent, class.fields.as_slice()),
            Symbol::Struct(decl) => (None, decl.fields.as_slice()),
            _ => return Vec::new(),
        };
        parent
            .into_iter()
            .chain(
                fields
                    .iter()
                    .filter_map(|f| self.field(*f).and_then(|f| f.ty.inline_record())),
            )
            .collect()
    }

    /// A member declared directly in `class`.
    pub fn own_member(&self, class: SymbolId, name: &str) -> Option<SymbolId> {
        let entry = self.class(class)?;
        entry
            .fields
            .iter()
            .chain(entry.functions.iter())
            .copied()
            .find(|id| self.name(*id) == name)
    }

    /// Resolve a member of `class`: its own members first, then each
    /// ancestor's in turn. The first match wins.
    pub fn lookup_member(&self, class: SymbolId, name: &str) -> Option<SymbolId> {
        self.ancestors(class)
            .into_iter()
            .find_map(|c| self.own_member(c, name))
    }

    /// A field of a struct by name.
    pub fn struct_field(&self, decl: SymbolId, name: &str) -> Option<SymbolId> {
        self.get(decl)
            .as_struct()?
            .fields
            .iter()
            .copied()
            .find(|id| self.name(*id) == name)
    }

    // =========================================
    // Layout
    // =========================================

    pub fn layout(&self, class: SymbolId) -> Option<&ClassLayout> {
        self.class(class)?.layout.as_ref()
    }

    /// Storage offset of a field, once layouts are final.
    pub fn field_offset(&self, field: SymbolId) -> Option<u32> {
        self.field(field)?.offset
    }
}
