//! Side tables attaching resolution results to syntax nodes.
//!
//! The tree itself is immutable; everything the resolution pass learns about
//! a node is stored here under the node's [`NodeId`].

use rustc_hash::FxHashMap;
use staple_core::{NodeId, ScopeId, SymbolId, Type};

#[derive(Debug, Default)]
pub struct Bindings {
    symbols: FxHashMap<NodeId, SymbolId>,
    types: FxHashMap<NodeId, Type>,
    scopes: FxHashMap<NodeId, ScopeId>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind_symbol(&mut self, node: NodeId, symbol: SymbolId) {
        self.symbols.insert(node, symbol);
    }

    pub fn symbol(&self, node: NodeId) -> Option<SymbolId> {
        self.symbols.get(&node).copied()
    }

    pub fn bind_type(&mut self, node: NodeId, ty: Type) {
        self.types.insert(node, ty);
    }

    pub fn type_of(&self, node: NodeId) -> Option<&Type> {
        self.types.get(&node)
    }

    pub fn bind_scope(&mut self, node: NodeId, scope: ScopeId) {
        self.scopes.insert(node, scope);
    }

    pub fn scope(&self, node: NodeId) -> Option<ScopeId> {
        self.scopes.get(&node).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_are_independent() {
        let mut bindings = Bindings::new();
        let node = NodeId::new(7);
        bindings.bind_symbol(node, SymbolId::new(3));
        bindings.bind_type(node, Type::BOOL);

        assert_eq!(bindings.symbol(node), Some(SymbolId::new(3)));
        assert_eq!(bindings.type_of(node), Some(&Type::BOOL));
        assert_eq!(bindings.scope(node), None);
        assert_eq!(bindings.symbol(NodeId::new(8)), None);
    }
}
