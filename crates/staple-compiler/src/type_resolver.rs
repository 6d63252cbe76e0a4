//! Type resolution from AST type expressions to semantic [`Type`]s.
//!
//! Named types are looked up outward from the scope the type expression
//! appears in. A name that resolves to nothing is an unresolved symbol; a
//! name bound to something other than a class or struct is a type mismatch.
//! Either way the result is [`Type::Error`] so resolution can continue.
//!
//! ## Example
//!
//! ```ignore
//! let mut resolver = TypeResolver::new(&mut ctx, scope);
//! // "Shape**"
//! let ty = resolver.resolve(&type_expr);
//! assert!(ty.is_pointer());
//! ```

use staple_core::{ScopeId, SemanticError, Symbol, Type};
use staple_parser::ast::{TypeBase, TypeExpr};

use crate::context::CompilationContext;

/// Resolves AST type expressions against one scope.
pub struct TypeResolver<'a> {
    ctx: &'a mut CompilationContext,
    scope: ScopeId,
}

impl<'a> TypeResolver<'a> {
    pub fn new(ctx: &'a mut CompilationContext, scope: ScopeId) -> Self {
        Self { ctx, scope }
    }

    /// Resolve a type expression, reporting failures.
    pub fn resolve(&mut self, type_expr: &TypeExpr<'_>) -> Type {
        let mut ty = match type_expr.base {
            TypeBase::Primitive(kind) => Type::Primitive(kind),
            TypeBase::Named(ident) => match self.ctx.scopes.lookup(self.scope, ident.name) {
                None => {
                    self.ctx
                        .report(SemanticError::unresolved(ident.name, ident.span));
                    return Type::Error;
                }
                Some(id) => match self.ctx.symbols.get(id) {
                    Symbol::Class(_) => Type::Class(id),
                    Symbol::Struct(_) => Type::Struct(id),
                    other => {
                        let message =
                            format!("'{}' is a {}, not a type", ident.name, other.kind_name());
                        self.ctx.report(SemanticError::mismatch(message, ident.span));
                        return Type::Error;
                    }
                },
            },
        };
        for _ in 0..type_expr.pointer_depth {
            ty = Type::pointer_to(ty);
        }
        ty
    }

    /// Resolve the type of a variable, field or parameter, which may not be
    /// plain `void`.
    pub fn resolve_storage(&mut self, type_expr: &TypeExpr<'_>, what: &str) -> Type {
        let ty = self.resolve(type_expr);
        if ty.is_void() {
            let message = format!("{what} cannot have type 'void'");
            self.ctx.report(SemanticError::mismatch(message, type_expr.span));
            return Type::Error;
        }
        ty
    }
}
