//! Address descriptor: which locations hold a symbol's address.
//!
//! Owned by one function lowering. Locations are kept in insertion order and
//! the first pointer-typed one is the symbol's current address.

use indexmap::{IndexMap, IndexSet};
use staple_core::{InternalError, SymbolId};
use staple_registry::SymbolTable;

use super::Operand;

#[derive(Debug)]
pub struct AddressDescriptor {
    /// Function being lowered, for error reports.
    function: String,
    locations: IndexMap<SymbolId, IndexSet<Operand>>,
}

impl AddressDescriptor {
    pub fn new(function: impl Into<String>) -> Self {
        Self {
            function: function.into(),
            locations: IndexMap::new(),
        }
    }

    pub fn record(&mut self, symbol: SymbolId, location: Operand) {
        self.locations.entry(symbol).or_default().insert(location);
    }

    pub fn forget(&mut self, symbol: SymbolId, location: &Operand) {
        if let Some(set) = self.locations.get_mut(&symbol) {
            set.shift_remove(location);
        }
    }

    pub fn locations(&self, symbol: SymbolId) -> impl Iterator<Item = &Operand> {
        self.locations.get(&symbol).into_iter().flatten()
    }

    /// The first pointer-typed location recorded for `symbol`.
    pub fn current_address(
        &self,
        symbol: SymbolId,
        symbols: &SymbolTable,
    ) -> Result<Operand, InternalError> {
        if let Some(address) = self.locations(symbol).find(|loc| loc.ty().pointee().is_some()) {
            return Ok(address.clone());
        }
        let known = self
            .locations(symbol)
            .map(|loc| format!("{loc}: {}", loc.ty()))
            .collect::<Vec<_>>()
            .join(", ");
        Err(InternalError::MissingAddress {
            symbol: symbols.name(symbol).to_string(),
            function: self.function.clone(),
            known,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::IrType;
    use staple_core::{Span, Symbol, Type, VariableEntry};

    fn local(symbols: &mut SymbolTable, name: &str) -> SymbolId {
        symbols.add(Symbol::LocalVariable(VariableEntry::new(name, Span::default(), Type::INT32)))
    }

    fn temp(id: u32, ty: IrType) -> Operand {
        Operand::Temp { id, ty }
    }

    #[test]
    fn first_pointer_location_wins() {
        let mut symbols = SymbolTable::new();
        let x = local(&mut symbols, "x");
        let mut addresses = AddressDescriptor::new("main");

        addresses.record(x, temp(4, IrType::I32));
        addresses.record(x, temp(1, IrType::pointer_to(IrType::I32)));
        addresses.record(x, temp(2, IrType::pointer_to(IrType::I32)));
        assert_eq!(
            addresses.current_address(x, &symbols).unwrap(),
            temp(1, IrType::pointer_to(IrType::I32))
        );

        addresses.forget(x, &temp(1, IrType::pointer_to(IrType::I32)));
        assert_eq!(
            addresses.current_address(x, &symbols).unwrap(),
            temp(2, IrType::pointer_to(IrType::I32))
        );
    }

    #[test]
    fn missing_address_names_symbol_and_locations() {
        let mut symbols = SymbolTable::new();
        let x = local(&mut symbols, "count");
        let mut addresses = AddressDescriptor::new("tally");
        addresses.record(x, temp(3, IrType::I32));

        let err = addresses.current_address(x, &symbols).unwrap_err();
        assert_eq!(
            err,
            InternalError::MissingAddress {
                symbol: "count".into(),
                function: "tally".into(),
                known: "t3: int32".into(),
            }
        );
    }
}
