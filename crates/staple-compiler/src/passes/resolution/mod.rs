//! Resolution Pass (Pass 2) - Bind names, types and scopes.
//!
//! Runs two sweeps over the unit:
//!
//! 1. **Declarations**: bind `extends` clauses, resolve struct and class
//!    fields, create member function symbols and resolve every signature.
//! 2. **Bodies**: resolve and type-check every function body.
//!
//! Splitting the sweeps means a body sees every member and signature of the
//! unit, including members inherited from classes declared later in source.
//!
//! Everything learned is attached to syntax nodes through
//! [`Bindings`](crate::bindings::Bindings). Failures are reported and
//! resolution continues with [`Type::Error`], which is compatible with
//! everything so one mistake does not cascade.

mod declarations;
mod expressions;
mod statements;

use staple_core::{NodeId, ScopeId, SymbolId, Type};
use staple_parser::ast::{ClassMember, Item, Script};
use staple_registry::ScopeKind;
use tracing::debug;

use crate::context::CompilationContext;

/// Counts of what Pass 2 resolved.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ResolutionOutput {
    /// Function bodies resolved.
    pub bodies: usize,
    /// Scopes created.
    pub scopes: usize,
}

/// Pass 2: resolve declarations, then bodies.
pub struct ResolutionPass<'a> {
    ctx: &'a mut CompilationContext,
    /// Function whose body is being resolved.
    current_function: Option<SymbolId>,
    output: ResolutionOutput,
}

impl<'a> ResolutionPass<'a> {
    pub fn new(ctx: &'a mut CompilationContext) -> Self {
        Self {
            ctx,
            current_function: None,
            output: ResolutionOutput::default(),
        }
    }

    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn run(mut self, script: &Script<'_>) -> ResolutionOutput {
        self.declare_unit(script);
        debug!(
            errors = self.ctx.diagnostics.error_count(),
            "resolution pass: declarations bound"
        );

        for item in script.items {
            match item {
                Item::Class(class) => {
                    for member in class.members {
                        if let ClassMember::Method(method) = member {
                            self.resolve_body(method);
                        }
                    }
                }
                Item::Function(function) => self.resolve_body(function),
                Item::Struct(_) => {}
            }
        }
        debug!(
            bodies = self.output.bodies,
            scopes = self.output.scopes,
            errors = self.ctx.diagnostics.error_count(),
            "resolution pass complete"
        );
        self.output
    }

    /// The scope attached to `node`, creating it under `parent` on first visit.
    fn scope_for(&mut self, node: NodeId, parent: ScopeId, kind: ScopeKind) -> ScopeId {
        if let Some(scope) = self.ctx.bindings.scope(node) {
            return scope;
        }
        let scope = self.ctx.scopes.push(parent, kind);
        self.ctx.bindings.bind_scope(node, scope);
        self.output.scopes += 1;
        scope
    }

    /// Look a name up from `scope` outwards.
    ///
    /// Class scopes answer with the class's own members and then those of
    /// its ancestors, so inherited fields and functions are visible inside
    /// member function bodies.
    fn lookup_name(&self, scope: ScopeId, name: &str) -> Option<SymbolId> {
        let scopes = &self.ctx.scopes;
        scopes.chain(scope).find_map(|s| match scopes.kind(s) {
            ScopeKind::Class(class) => self.ctx.symbols.lookup_member(class, name),
            _ => scopes.lookup_local(s, name),
        })
    }

    fn type_name(&self, ty: &Type) -> String {
        self.ctx.symbols.type_name(ty)
    }
}

#[cfg(test)]
mod tests;
