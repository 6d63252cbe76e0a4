//! Class layout computation.
//!
//! Runs once after every class has its parent, fields and functions bound.
//! Layouts are computed parent first, so a class always extends a finished
//! parent layout.

use staple_core::{ClassLayout, Symbol, SymbolId};
use tracing::trace;

use crate::{RegistryError, SymbolTable};

impl SymbolTable {
    /// Compute the flattened layout of every class and the storage offset of
    /// every class and struct field.
    ///
    /// - fields: the parent's fields followed by the class's own fields
    /// - dispatch: the parent's slots, with an own function of the same name
    ///   taking over the slot, followed by the remaining own functions
    pub fn finalize_layouts(&mut self) -> Result<(), RegistryError> {
        let classes: Vec<SymbolId> = self.classes().map(|(id, _)| id).collect();
        let mut visiting = Vec::new();
        for class in classes {
            self.compute_layout(class, &mut visiting)?;
        }

        let structs: Vec<SymbolId> = self
            .iter()
            .filter_map(|(id, s)| s.as_struct().map(|_| id))
            .collect();
        for decl in structs {
            let fields = self.get(decl).as_struct().map(|s| s.fields.clone()).unwrap_or_default();
            self.assign_offsets(&fields);
        }
        Ok(())
    }

    fn compute_layout(
        &mut self,
        class: SymbolId,
        visiting: &mut Vec<SymbolId>,
    ) -> Result<(), RegistryError> {
        let Some(entry) = self.class(class) else {
            return Ok(());
        };
        if entry.layout.is_some() {
            return Ok(());
        }
        if visiting.contains(&class) {
            return Err(RegistryError::InheritanceCycle {
                class: entry.name.clone(),
            });
        }
        let parent = entry.parent;
        let own_fields = entry.fields.clone();
        let own_functions = entry.functions.clone();

        let mut layout = match parent {
            Some(parent) => {
                visiting.push(class);
                self.compute_layout(parent, visiting)?;
                visiting.pop();
                self.layout(parent).cloned().unwrap_or_default()
            }
            None => ClassLayout::default(),
        };

        layout.fields.extend(own_fields);
        for function in own_functions {
            let name = self.name(function);
            match layout.dispatch.iter().position(|slot| self.name(*slot) == name) {
                Some(index) => layout.dispatch[index] = function,
                None => layout.dispatch.push(function),
            }
        }

        trace!(
            class = self.name(class),
            fields = layout.fields.len(),
            slots = layout.dispatch.len(),
            "class layout"
        );

        self.assign_offsets(&layout.fields);
        if let Symbol::Class(entry) = self.symbol_mut(class) {
            entry.layout = Some(layout);
        }
        Ok(())
    }

    /// Only fields without an offset are touched, so inherited fields keep
    /// the offset their declaring class gave them.
    fn assign_offsets(&mut self, fields: &[SymbolId]) {
        for (index, field) in fields.iter().enumerate() {
            if let Symbol::Field(entry) = self.symbol_mut(*field) {
                entry.offset.get_or_insert(index as u32);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use staple_core::{
        ClassEntry, FieldEntry, FunctionEntry, FunctionTraits, Span, StructEntry, Type,
    };

    use super::*;

    fn class(table: &mut SymbolTable, name: &str, parent: SymbolId) -> SymbolId {
        let id = table.add(Symbol::Class(ClassEntry::script(name, Span::default())));
        table.set_parent(id, parent);
        id
    }

    fn field(table: &mut SymbolTable, owner: SymbolId, name: &str) -> SymbolId {
        let id = table.add(Symbol::Field(FieldEntry::new(name, Span::default(), Type::INT32, owner)));
        table.push_field(owner, id);
        id
    }

    fn method(table: &mut SymbolTable, owner: SymbolId, name: &str) -> SymbolId {
        let class_name = table.name(owner).to_string();
        let id = table.add(Symbol::Function(FunctionEntry::member(
            name,
            &class_name,
            owner,
            Some(Span::default()),
            FunctionTraits::empty(),
        )));
        table.push_function(owner, id);
        id
    }

    #[test]
    fn fields_are_inherited_in_order() {
        let mut table = SymbolTable::new();
        let root = table.root_class();
        let shape = class(&mut table, "Shape", root);
        let square = class(&mut table, "Square", shape);
        let x = field(&mut table, shape, "x");
        let side = field(&mut table, square, "side");

        table.finalize_layouts().unwrap();

        let root_fields = table.class(root).unwrap().fields.clone();
        let layout = table.layout(square).unwrap();
        assert_eq!(layout.fields[..2], root_fields[..]);
        assert_eq!(layout.fields[2..], [x, side]);
        assert_eq!(table.field_offset(x), Some(2));
        assert_eq!(table.field_offset(side), Some(3));
        assert_eq!(table.layout(square).unwrap().offset_of(side), Some(3));
    }

    #[test]
    fn overrides_take_the_parent_slot() {
        let mut table = SymbolTable::new();
        let root = table.root_class();
        let shape = class(&mut table, "Shape", root);
        let square = class(&mut table, "Square", shape);
        let area = method(&mut table, shape, "area");
        let name = method(&mut table, shape, "name");
        let square_area = method(&mut table, square, "area");
        let corners = method(&mut table, square, "corners");

        table.finalize_layouts().unwrap();

        let root_slots = table.layout(root).unwrap().dispatch.clone();
        assert_eq!(root_slots.len(), 2);
        assert_eq!(table.layout(shape).unwrap().dispatch[2..], [area, name]);
        assert_eq!(
            table.layout(square).unwrap().dispatch[2..],
            [square_area, name, corners]
        );
    }

    #[test]
    fn derived_class_declared_first() {
        let mut table = SymbolTable::new();
        let root = table.root_class();
        let derived = class(&mut table, "Derived", root);
        let base = class(&mut table, "Base", root);
        table.set_parent(derived, base);
        let b = field(&mut table, base, "b");
        let d = field(&mut table, derived, "d");

        table.finalize_layouts().unwrap();
        assert_eq!(table.field_offset(b), Some(2));
        assert_eq!(table.field_offset(d), Some(3));
    }

    #[test]
    fn cycles_are_reported() {
        let mut table = SymbolTable::new();
        let root = table.root_class();
        let a = class(&mut table, "A", root);
        let b = class(&mut table, "B", a);
        table.set_parent(a, b);

        let err = table.finalize_layouts().unwrap_err();
        assert!(matches!(err, RegistryError::InheritanceCycle { .. }));
    }

    #[test]
    fn struct_fields_are_numbered() {
        let mut table = SymbolTable::new();
        let point = table.add(Symbol::Struct(StructEntry::new("Point", Span::default())));
        let x = field(&mut table, point, "x");
        let y = field(&mut table, point, "y");

        table.finalize_layouts().unwrap();
        assert_eq!(table.field_offset(x), Some(0));
        assert_eq!(table.field_offset(y), Some(1));
    }
}
