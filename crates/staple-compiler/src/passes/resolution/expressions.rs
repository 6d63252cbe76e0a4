//! Expression resolution and type checking.
//!
//! Every expression node gets its type recorded; identifiers, calls and
//! member accesses also get the symbol they denote. An integer literal takes
//! the integer type its context expects, so `uint8 b = 3;` needs no cast.

use staple_core::{NodeId, PrimitiveKind, ScopeId, SemanticError, Span, Symbol, SymbolId, Type};
use staple_parser::ast::{
    AssignExpr, BinaryExpr, BinaryOp, CallExpr, Expr, LiteralExpr, LiteralKind, MemberExpr,
};

use super::ResolutionPass;

impl ResolutionPass<'_> {
    /// Resolve `expr` and record its type. `expected` types integer literals.
    pub(super) fn resolve_expr(
        &mut self,
        expr: &Expr<'_>,
        scope: ScopeId,
        expected: Option<&Type>,
    ) -> Type {
        let ty = match expr {
            Expr::Literal(literal) => self.resolve_literal(literal, expected),
            Expr::Ident(ident) => match self.lookup_name(scope, ident.ident.name) {
                None => {
                    self.ctx
                        .report(SemanticError::unresolved(ident.ident.name, ident.ident.span));
                    Type::Error
                }
                Some(symbol) => self.value_of(symbol, ident.id, ident.ident.name, ident.ident.span),
            },
            Expr::Binary(binary) => self.resolve_binary(binary, scope, expected),
            Expr::Assign(assign) => self.resolve_assign(assign, scope),
            Expr::Call(call) => self.resolve_call(call, scope),
            Expr::Member(member) => self.resolve_member(member, scope),
        };
        self.ctx.bindings.bind_type(expr.id(), ty.clone());
        ty
    }

    fn resolve_literal(&mut self, literal: &LiteralExpr<'_>, expected: Option<&Type>) -> Type {
        match literal.kind {
            LiteralKind::Bool(_) => Type::BOOL,
            LiteralKind::String(_) => Type::pointer_to(Type::INT8),
            LiteralKind::Int(value) => {
                let ty = match expected.and_then(Type::primitive) {
                    Some(kind) if kind.is_integer() => Type::Primitive(kind),
                    _ => Type::INT32,
                };
                if let Some(kind) = ty.primitive()
                    && !fits(value, kind)
                {
                    let message = format!("integer literal {value} does not fit in '{kind}'");
                    self.ctx.report(SemanticError::mismatch(message, literal.span));
                }
                ty
            }
        }
    }

    /// Bind a name used as a value.
    fn value_of(
        &mut self,
        symbol: SymbolId,
        node: NodeId,
        name: &str,
        span: Span,
    ) -> Type {
        match self.ctx.symbols.get(symbol) {
            Symbol::Argument(_) | Symbol::LocalVariable(_) | Symbol::Field(_) => {
                self.ctx.bindings.bind_symbol(node, symbol);
                self.ctx.symbols.symbol_type(symbol)
            }
            other => {
                let message = format!("'{name}' is a {}, not a value", other.kind_name());
                self.ctx.report(SemanticError::mismatch(message, span));
                Type::Error
            }
        }
    }

    fn resolve_binary(
        &mut self,
        binary: &BinaryExpr<'_>,
        scope: ScopeId,
        expected: Option<&Type>,
    ) -> Type {
        match binary.op {
            BinaryOp::LogicalAnd | BinaryOp::LogicalOr => {
                let (left, right) = self.resolve_operands(binary, scope, Some(&Type::BOOL));
                let what = if binary.op == BinaryOp::LogicalAnd { "'&&'" } else { "'||'" };
                self.expect_bool(&left, what, binary.left.span());
                self.expect_bool(&right, what, binary.right.span());
                Type::BOOL
            }
            BinaryOp::Arithmetic(op) => {
                let (left, right) = self.resolve_operands(binary, scope, expected);
                match self.integer_pair(&left, &right, op.as_str(), binary.span) {
                    Some(ty) => ty,
                    None => Type::Error,
                }
            }
            BinaryOp::Compare(op) => {
                let (left, right) = self.resolve_operands(binary, scope, None);
                self.integer_pair(&left, &right, op.as_str(), binary.span);
                Type::BOOL
            }
        }
    }

    /// Resolve both operands. A literal operand takes the other side's type.
    fn resolve_operands(
        &mut self,
        binary: &BinaryExpr<'_>,
        scope: ScopeId,
        hint: Option<&Type>,
    ) -> (Type, Type) {
        if is_int_literal(binary.left) && !is_int_literal(binary.right) {
            let right = self.resolve_expr(binary.right, scope, hint);
            let left = self.resolve_expr(binary.left, scope, Some(&right));
            (left, right)
        } else {
            let left = self.resolve_expr(binary.left, scope, hint);
            let right = self.resolve_expr(binary.right, scope, Some(&left));
            (left, right)
        }
    }

    /// Both operands must be integers of one type; returns that type.
    fn integer_pair(&mut self, left: &Type, right: &Type, op: &str, span: Span) -> Option<Type> {
        if left.is_error() || right.is_error() {
            return Some(Type::Error);
        }
        if left.is_integer() && left == right {
            return Some(left.clone());
        }
        let message = format!(
            "operator '{op}' needs two integers of the same type, found '{}' and '{}'",
            self.type_name(left),
            self.type_name(right)
        );
        self.ctx.report(SemanticError::mismatch(message, span));
        None
    }

    fn resolve_assign(&mut self, assign: &AssignExpr<'_>, scope: ScopeId) -> Type {
        let target = self.resolve_expr(assign.target, scope, None);
        if let Expr::Ident(ident) = assign.target
            && let Some(symbol) = self.ctx.bindings.symbol(ident.id)
            && self.ctx.symbols.get(symbol).is_argument()
            && target.is_pointer()
        {
            let message = format!("cannot assign to pointer argument '{}'", ident.ident.name);
            self.ctx.report(SemanticError::mismatch(message, assign.target.span()));
        }
        let value = self.resolve_expr(assign.value, scope, Some(&target));
        self.check_assignable(&value, &target, assign.value.span());
        Type::VOID
    }

    fn resolve_call(&mut self, call: &CallExpr<'_>, scope: ScopeId) -> Type {
        let target = match call.receiver {
            None => self.lookup_name(scope, call.callee.name),
            Some(receiver) => {
                let receiver_type = self.resolve_expr(receiver, scope, None);
                if receiver_type.is_error() {
                    self.resolve_args_unchecked(call, scope);
                    return Type::Error;
                }
                match receiver_type.class_behind_pointer() {
                    Some(class) if self.ctx.symbols.class(class).is_some() => {
                        self.ctx.symbols.lookup_member(class, call.callee.name)
                    }
                    _ => {
                        let message = format!(
                            "cannot call '{}' on a value of type '{}'",
                            call.callee.name,
                            self.type_name(&receiver_type)
                        );
                        self.ctx.report(SemanticError::mismatch(message, call.callee.span));
                        self.resolve_args_unchecked(call, scope);
                        return Type::Error;
                    }
                }
            }
        };

        let function = match target {
            None => {
                self.ctx
                    .report(SemanticError::unresolved(call.callee.name, call.callee.span));
                None
            }
            Some(symbol) => match self.ctx.symbols.function(symbol) {
                Some(entry) => Some((symbol, entry.clone())),
                None => {
                    let kind = self.ctx.symbols.get(symbol).kind_name();
                    let message = format!("'{}' is a {kind}, not a function", call.callee.name);
                    self.ctx.report(SemanticError::mismatch(message, call.callee.span));
                    None
                }
            },
        };
        let Some((symbol, entry)) = function else {
            self.resolve_args_unchecked(call, scope);
            return Type::Error;
        };
        self.ctx.bindings.bind_symbol(call.id, symbol);

        let params: Vec<Type> = entry
            .arguments
            .iter()
            .filter(|a| !matches!(self.ctx.symbols.get(**a), Symbol::MultiArgumentMarker))
            .map(|a| self.ctx.symbols.symbol_type(*a))
            .collect();
        let arity_ok = if entry.is_variadic() {
            call.args.len() >= params.len()
        } else {
            call.args.len() == params.len()
        };
        if !arity_ok {
            let message = format!(
                "function '{}' expects {}{} argument(s) but {} were given",
                entry.name,
                if entry.is_variadic() { "at least " } else { "" },
                params.len(),
                call.args.len()
            );
            self.ctx.report(SemanticError::mismatch(message, call.span));
        }

        for (index, arg) in call.args.iter().enumerate() {
            match params.get(index) {
                Some(param) => {
                    let actual = self.resolve_expr(arg, scope, Some(param));
                    self.check_assignable(&actual, param, arg.span());
                }
                None => {
                    let actual = self.resolve_expr(arg, scope, None);
                    if actual.is_void() {
                        self.ctx.report(SemanticError::mismatch(
                            "cannot pass a void value",
                            arg.span(),
                        ));
                    }
                }
            }
        }
        entry.return_type
    }

    /// Resolve the arguments of a call whose target is unknown, so every
    /// nested name still gets checked.
    fn resolve_args_unchecked(&mut self, call: &CallExpr<'_>, scope: ScopeId) {
        for arg in call.args {
            self.resolve_expr(arg, scope, None);
        }
    }

    fn resolve_member(&mut self, member: &MemberExpr<'_>, scope: ScopeId) -> Type {
        let object = self.resolve_expr(member.object, scope, None);
        if object.is_error() {
            return Type::Error;
        }
        if !object.is_pointer() && !member.object.is_place() {
            self.ctx.report(SemanticError::mismatch(
                "member access needs a pointer or a variable",
                member.object.span(),
            ));
            return Type::Error;
        }

        let aggregate = object.pointee().unwrap_or(&object).clone();
        let field = match aggregate {
            Type::Class(class) => self.ctx.symbols.lookup_member(class, member.member.name),
            Type::Struct(decl) => self.ctx.symbols.struct_field(decl, member.member.name),
            _ => {
                let message = format!(
                    "type '{}' has no members",
                    self.type_name(&object)
                );
                self.ctx.report(SemanticError::mismatch(message, member.span));
                return Type::Error;
            }
        };

        match field {
            Some(symbol) if self.ctx.symbols.field(symbol).is_some() => {
                self.ctx.bindings.bind_symbol(member.id, symbol);
                self.ctx.symbols.symbol_type(symbol)
            }
            Some(_) => {
                let message = format!("'{}' is a function; call it", member.member.name);
                self.ctx.report(SemanticError::mismatch(message, member.member.span));
                Type::Error
            }
            None => {
                self.ctx
                    .report(SemanticError::unresolved(member.member.name, member.member.span));
                Type::Error
            }
        }
    }

    pub(super) fn check_assignable(&mut self, actual: &Type, target: &Type, span: Span) {
        if !actual.is_assignable_to(target) {
            let message = format!(
                "cannot use a value of type '{}' as '{}'",
                self.type_name(actual),
                self.type_name(target)
            );
            self.ctx.report(SemanticError::mismatch(message, span));
        }
    }

    pub(super) fn expect_bool(&mut self, ty: &Type, what: &str, span: Span) {
        if !ty.is_bool() && !ty.is_error() {
            let message = format!("{what} must be 'bool', found '{}'", self.type_name(ty));
            self.ctx.report(SemanticError::mismatch(message, span));
        }
    }
}

fn is_int_literal(expr: &Expr<'_>) -> bool {
    matches!(
        expr,
        Expr::Literal(LiteralExpr {
            kind: LiteralKind::Int(_),
            ..
        })
    )
}

fn fits(value: i64, kind: PrimitiveKind) -> bool {
    let bits = kind.bit_width();
    if bits >= 64 {
        return kind.is_signed() || value >= 0;
    }
    if kind.is_signed() {
        let limit = 1i64 << (bits - 1);
        (-limit..limit).contains(&value)
    } else {
        (0..(1i64 << bits)).contains(&value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_ranges() {
        assert!(fits(127, PrimitiveKind::Int8));
        assert!(!fits(128, PrimitiveKind::Int8));
        assert!(fits(-128, PrimitiveKind::Int8));
        assert!(fits(255, PrimitiveKind::UInt8));
        assert!(!fits(-1, PrimitiveKind::UInt32));
        assert!(fits(i64::MAX, PrimitiveKind::UInt64));
    }
}
