//! CompilationContext - all state owned by one compile unit.

use staple_core::{Diagnostics, ROOT_CLASS_NAME, ScopeId, SemanticError, Span, SymbolId};
use staple_registry::{RegistryError, ScopeTree, SymbolTable};

use crate::bindings::Bindings;

/// Symbols, scopes, node bindings and diagnostics of one compile unit.
///
/// Independent units share nothing.
#[derive(Debug)]
pub struct CompilationContext {
    pub symbols: SymbolTable,
    pub scopes: ScopeTree,
    pub bindings: Bindings,
    pub diagnostics: Diagnostics,
}

impl Default for CompilationContext {
    fn default() -> Self {
        Self::new()
    }
}

impl CompilationContext {
    /// A context whose root scope already binds the root class.
    pub fn new() -> Self {
        let symbols = SymbolTable::new();
        let mut scopes = ScopeTree::new();
        let root = scopes.root();
        // A fresh scope cannot already bind the name.
        let _ = scopes.define(root, ROOT_CLASS_NAME, symbols.root_class());
        Self {
            symbols,
            scopes,
            bindings: Bindings::new(),
            diagnostics: Diagnostics::new(),
        }
    }

    pub fn report(&mut self, error: SemanticError) {
        self.diagnostics.report(error);
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.has_errors()
    }

    /// Bind `name` in `scope`, reporting a duplicate declaration if the scope
    /// already binds it. Returns whether the binding was made.
    pub fn define(&mut self, scope: ScopeId, name: &str, symbol: SymbolId, span: Span) -> bool {
        match self.scopes.define(scope, name, symbol) {
            Ok(()) => true,
            Err(RegistryError::AlreadyDefined { existing, .. }) => {
                let original = self.symbols.get(existing).span().unwrap_or_default();
                self.report(SemanticError::duplicate(name, original, span));
                false
            }
            Err(other) => {
                self.report(SemanticError::mismatch(other.to_string(), span));
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use staple_core::{Symbol, Type, VariableEntry};

    #[test]
    fn root_class_is_visible() {
        let ctx = CompilationContext::new();
        let root = ctx.scopes.root();
        assert_eq!(ctx.scopes.lookup(root, "Object"), Some(ctx.symbols.root_class()));
    }

    #[test]
    fn duplicate_definition_is_reported_once() {
        let mut ctx = CompilationContext::new();
        let block = ctx.scopes.push(ctx.scopes.root(), staple_registry::ScopeKind::Block);
        let first = ctx.symbols.add(Symbol::LocalVariable(VariableEntry::new("x", Span::new(2, 5, 1), Type::INT32)));
        let second = ctx.symbols.add(Symbol::LocalVariable(VariableEntry::new("x", Span::new(3, 5, 1), Type::BOOL)));

        assert!(ctx.define(block, "x", first, Span::new(2, 5, 1)));
        assert!(!ctx.define(block, "x", second, Span::new(3, 5, 1)));
        assert_eq!(ctx.scopes.lookup(block, "x"), Some(first));
        assert!(matches!(
            ctx.diagnostics.semantic_errors(),
            [SemanticError::DuplicateDeclaration { original, .. }] if *original == Span::new(2, 5, 1)
        ));
    }
}
