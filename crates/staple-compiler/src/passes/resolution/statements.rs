//! Body sweep of Pass 2: blocks and statements.

use staple_core::{ScopeId, SemanticError, Symbol, Type, VariableEntry};
use staple_parser::ast::{Block, FunctionDecl, Stmt};
use staple_registry::ScopeKind;
use tracing::trace;

use super::ResolutionPass;
use crate::type_resolver::TypeResolver;

impl ResolutionPass<'_> {
    pub(super) fn resolve_body(&mut self, function: &FunctionDecl<'_>) {
        let Some(body) = function.body else {
            return;
        };
        let (Some(symbol), Some(scope)) = (
            self.ctx.bindings.symbol(function.id),
            self.ctx.bindings.scope(function.id),
        ) else {
            return;
        };
        trace!(function = function.name.name, "resolve body");

        self.current_function = Some(symbol);
        self.resolve_block(body, scope);
        self.current_function = None;
        self.output.bodies += 1;

        let returns_value = self
            .ctx
            .symbols
            .function(symbol)
            .is_some_and(|f| !f.return_type.is_void() && !f.return_type.is_error());
        if returns_value && !always_returns(body.stmts) {
            let message = format!(
                "function '{}' does not return a value on every path",
                function.name.name
            );
            self.ctx
                .report(SemanticError::mismatch(message, function.name.span));
        }
    }

    fn resolve_block(&mut self, block: &Block<'_>, parent: ScopeId) {
        let scope = self.scope_for(block.id, parent, ScopeKind::Block);
        for stmt in block.stmts {
            self.resolve_stmt(stmt, scope);
        }
    }

    /// An `if` branch is a scope of its own even without braces, so a
    /// declaration there is not visible after the `if`.
    fn resolve_branch(&mut self, stmt: &Stmt<'_>, parent: ScopeId) {
        if let Stmt::Block(block) = stmt {
            self.resolve_block(block, parent);
            return;
        }
        let scope = self.ctx.scopes.push(parent, ScopeKind::Block);
        self.output.scopes += 1;
        self.resolve_stmt(stmt, scope);
    }

    fn resolve_stmt(&mut self, stmt: &Stmt<'_>, scope: ScopeId) {
        match stmt {
            Stmt::Block(block) => self.resolve_block(block, scope),
            Stmt::VarDecl(decl) => {
                let ty = TypeResolver::new(self.ctx, scope).resolve_storage(&decl.ty, "variable");
                // The initializer is resolved before the name is bound, so
                // `int x = x;` reads an outer `x`.
                if let Some(init) = decl.init {
                    let actual = self.resolve_expr(init, scope, Some(&ty));
                    self.check_assignable(&actual, &ty, init.span());
                }
                let entry = VariableEntry::new(decl.name.name, decl.name.span, ty);
                let local = self.ctx.symbols.add(Symbol::LocalVariable(entry));
                self.ctx.bindings.bind_symbol(decl.id, local);
                self.ctx.define(scope, decl.name.name, local, decl.name.span);
            }
            Stmt::If(if_stmt) => {
                let condition = self.resolve_expr(if_stmt.condition, scope, Some(&Type::BOOL));
                self.expect_bool(&condition, "if condition", if_stmt.condition.span());
                self.resolve_branch(if_stmt.then_stmt, scope);
                if let Some(else_stmt) = if_stmt.else_stmt {
                    self.resolve_branch(else_stmt, scope);
                }
            }
            Stmt::Return(ret) => {
                let expected = self
                    .current_function
                    .and_then(|f| self.ctx.symbols.function(f))
                    .map(|f| f.return_type.clone())
                    .unwrap_or(Type::Error);
                match ret.value {
                    Some(value) => {
                        let actual = self.resolve_expr(value, scope, Some(&expected));
                        if expected.is_void() {
                            self.ctx.report(SemanticError::mismatch(
                                "cannot return a value from a void function",
                                value.span(),
                            ));
                        } else {
                            self.check_assignable(&actual, &expected, value.span());
                        }
                    }
                    None if !expected.is_void() && !expected.is_error() => {
                        let message =
                            format!("missing return value of type '{}'", self.type_name(&expected));
                        self.ctx.report(SemanticError::mismatch(message, ret.span));
                    }
                    None => {}
                }
            }
            Stmt::Expr(expr_stmt) => {
                self.resolve_expr(expr_stmt.expr, scope, None);
            }
        }
    }
}

/// Whether every path through `stmts` ends in a `return`.
fn always_returns(stmts: &[Stmt<'_>]) -> bool {
    stmts.iter().any(stmt_returns)
}

fn stmt_returns(stmt: &Stmt<'_>) -> bool {
    match stmt {
        Stmt::Return(_) => true,
        Stmt::Block(block) => always_returns(block.stmts),
        Stmt::If(if_stmt) => {
            if_stmt.else_stmt.is_some_and(stmt_returns) && stmt_returns(if_stmt.then_stmt)
        }
        Stmt::VarDecl(_) | Stmt::Expr(_) => false,
    }
}
