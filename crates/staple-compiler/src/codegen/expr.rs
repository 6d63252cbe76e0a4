//! Expression lowering.
//!
//! Value contexts call [`FunctionBuilder::value`]; assignment targets and
//! member bases call [`FunctionBuilder::address_of`], which yields a pointer
//! to the storage instead of loading from it.

use staple_core::{InternalError, NodeId, Span, Symbol, SymbolId, Type};
use staple_parser::ast::{
    ArithmeticOp, BinaryExpr, BinaryOp, CallExpr, Expr, IdentExpr, LiteralExpr, LiteralKind,
    MemberExpr,
};

use super::function::FunctionBuilder;
use super::lower;
use crate::ir::{Instruction, IrType, Operand};

impl FunctionBuilder<'_> {
    /// Lower `expr` for its effect and value. Assignments and calls of void
    /// functions produce no value.
    pub(super) fn lower_expr(&mut self, expr: &Expr<'_>) -> Result<Option<Operand>, InternalError> {
        match expr {
            Expr::Literal(literal) => self.lower_literal(literal).map(Some),
            Expr::Ident(ident) => self.read_ident(ident).map(Some),
            Expr::Binary(binary) => self.lower_binary(binary).map(Some),
            Expr::Assign(assign) => {
                let value = self.value(assign.value)?;
                let address = self.address_of(assign.target)?;
                self.emit(Instruction::Store { value, address });
                Ok(None)
            }
            Expr::Call(call) => self.lower_call(call),
            Expr::Member(member) => {
                let address = self.member_address(member)?;
                self.load(address).map(Some)
            }
        }
    }

    /// Lower an expression whose value is used.
    pub(super) fn value(&mut self, expr: &Expr<'_>) -> Result<Operand, InternalError> {
        self.lower_expr(expr)?.ok_or_else(|| {
            InternalError::invariant(format!(
                "expression at {} has no value in function '{}'",
                expr.span(),
                self.name
            ))
        })
    }

    fn expr_type(&self, expr: &Expr<'_>) -> Result<Type, InternalError> {
        self.node_type(expr.id(), expr.span())
    }

    fn node_type(&self, node: NodeId, span: Span) -> Result<Type, InternalError> {
        self.ctx
            .bindings
            .type_of(node)
            .cloned()
            .ok_or(InternalError::UnboundNode { what: "type", span })
    }

    fn load(&mut self, address: Operand) -> Result<Operand, InternalError> {
        let ty = address.ty().pointee().cloned().ok_or_else(|| {
            InternalError::invariant(format!("load through non-pointer {address}"))
        })?;
        let dest = self.ids.temp(ty);
        self.emit(Instruction::Load {
            dest: dest.clone(),
            address,
        });
        Ok(dest)
    }

    // =========================================
    // Literals and names
    // =========================================

    fn lower_literal(&mut self, literal: &LiteralExpr<'_>) -> Result<Operand, InternalError> {
        match literal.kind {
            LiteralKind::Bool(value) => Ok(Operand::bool(value)),
            LiteralKind::Int(value) => {
                let ty = self.lower(&self.node_type(literal.id, literal.span)?)?;
                Ok(Operand::int(value, ty))
            }
            LiteralKind::String(_) => {
                let ctx = self.ctx;
                let symbol = self.bound_symbol(literal.id, "string literal", literal.span)?;
                let entry = ctx.symbols.get(symbol).as_string_literal().ok_or_else(|| {
                    InternalError::invariant(format!(
                        "'{}' is not a string literal",
                        ctx.symbols.name(symbol)
                    ))
                })?;
                let storage = self.lower(&entry.storage_type())?;
                let global = Operand::Global {
                    name: entry.global_name.clone(),
                    ty: IrType::pointer_to(storage),
                };
                let dest = self.ids.temp(IrType::pointer_to(IrType::I8));
                self.emit(Instruction::GetElementPtr {
                    dest: dest.clone(),
                    base: global,
                    indices: vec![0, 0],
                });
                self.addresses.record(symbol, dest.clone());
                Ok(dest)
            }
        }
    }

    fn read_ident(&mut self, ident: &IdentExpr<'_>) -> Result<Operand, InternalError> {
        let ctx = self.ctx;
        let symbol = self.bound_symbol(ident.id, "symbol", ident.ident.span)?;
        match ctx.symbols.get(symbol) {
            Symbol::Argument(arg) if arg.ty.is_pointer() => Ok(Operand::Named {
                name: arg.name.clone(),
                ty: self.lower(&arg.ty)?,
            }),
            _ => {
                let address = self.symbol_address(symbol, ident.ident.span)?;
                self.load(address)
            }
        }
    }

    /// Address of the storage `expr` names.
    fn address_of(&mut self, expr: &Expr<'_>) -> Result<Operand, InternalError> {
        match expr {
            Expr::Ident(ident) => {
                let symbol = self.bound_symbol(ident.id, "symbol", ident.ident.span)?;
                self.symbol_address(symbol, ident.ident.span)
            }
            Expr::Member(member) => self.member_address(member),
            other => Err(InternalError::invariant(format!(
                "expression at {} is not a place",
                other.span()
            ))),
        }
    }

    fn symbol_address(&mut self, symbol: SymbolId, span: Span) -> Result<Operand, InternalError> {
        let ctx = self.ctx;
        match ctx.symbols.get(symbol) {
            Symbol::Argument(arg) if arg.ty.is_pointer() => Err(InternalError::invariant(format!(
                "pointer argument '{}' has no storage",
                arg.name
            ))),
            Symbol::Argument(_) | Symbol::LocalVariable(_) => {
                self.addresses.current_address(symbol, &ctx.symbols)
            }
            // A bare field name inside a member function.
            Symbol::Field(_) => {
                let receiver = self.receiver(span)?;
                self.field_address(receiver, symbol)
            }
            other => Err(InternalError::invariant(format!(
                "{} '{}' has no storage",
                other.kind_name(),
                other.name()
            ))),
        }
    }

    /// Address of `object.member`. A pointer object is dereferenced; a
    /// by-value aggregate is addressed in place.
    fn member_address(&mut self, member: &MemberExpr<'_>) -> Result<Operand, InternalError> {
        let field = self.bound_symbol(member.id, "field", member.member.span)?;
        let base = if self.expr_type(member.object)?.is_pointer() {
            self.value(member.object)?
        } else {
            self.address_of(member.object)?
        };
        self.field_address(base, field)
    }

    /// `getelementptr base, 0, offset(field)`.
    fn field_address(&mut self, base: Operand, field: SymbolId) -> Result<Operand, InternalError> {
        let ctx = self.ctx;
        let entry = ctx.symbols.field(field).ok_or_else(|| {
            InternalError::invariant(format!("'{}' is not a field", ctx.symbols.name(field)))
        })?;
        let offset = entry.offset.ok_or_else(|| InternalError::MissingLayout {
            class: ctx.symbols.name(entry.owner).to_string(),
        })?;
        let ty = self.lower(&entry.ty)?;
        let dest = self.ids.temp(IrType::pointer_to(ty));
        self.emit(Instruction::GetElementPtr {
            dest: dest.clone(),
            base,
            indices: vec![0, offset],
        });
        Ok(dest)
    }

    // =========================================
    // Operators
    // =========================================

    fn lower_binary(&mut self, binary: &BinaryExpr<'_>) -> Result<Operand, InternalError> {
        match binary.op {
            BinaryOp::LogicalOr => self.lower_or(binary),
            // Both sides always run.
            BinaryOp::LogicalAnd => {
                let left = self.value(binary.left)?;
                let right = self.value(binary.right)?;
                let dest = self.ids.temp(IrType::Bool);
                self.emit(Instruction::Arithmetic {
                    op: ArithmeticOp::BitAnd,
                    dest: dest.clone(),
                    left,
                    right,
                });
                Ok(dest)
            }
            BinaryOp::Arithmetic(op) => {
                let left = self.value(binary.left)?;
                let right = self.value(binary.right)?;
                let ty = self.lower(&self.node_type(binary.id, binary.span)?)?;
                let dest = self.ids.temp(ty);
                self.emit(Instruction::Arithmetic {
                    op,
                    dest: dest.clone(),
                    left,
                    right,
                });
                Ok(dest)
            }
            BinaryOp::Compare(op) => {
                let left = self.value(binary.left)?;
                let right = self.value(binary.right)?;
                let dest = self.ids.temp(IrType::Bool);
                self.emit(Instruction::Compare {
                    op,
                    dest: dest.clone(),
                    left,
                    right,
                });
                Ok(dest)
            }
        }
    }

    /// ```text
    ///     jump start
    /// start:
    ///     [left]
    ///     br left, end, eval
    /// eval:
    ///     [right]
    ///     jump end
    /// end:
    ///     phi [left, block after left], [right, block after right]
    /// ```
    fn lower_or(&mut self, binary: &BinaryExpr<'_>) -> Result<Operand, InternalError> {
        let start = self.ids.label();
        let eval = self.ids.label();
        let end = self.ids.label();

        self.emit(Instruction::Jump(start));
        self.emit(Instruction::Label(start));
        let left = self.value(binary.left)?;
        let left_block = self.current_label()?;
        self.emit(Instruction::Branch {
            condition: left.clone(),
            on_true: end,
            on_false: eval,
        });

        self.emit(Instruction::Label(eval));
        let right = self.value(binary.right)?;
        let right_block = self.current_label()?;
        self.emit(Instruction::Jump(end));

        self.emit(Instruction::Label(end));
        let dest = self.ids.temp(IrType::Bool);
        self.emit(Instruction::Phi {
            dest: dest.clone(),
            incoming: vec![(left, left_block), (right, right_block)],
        });
        Ok(dest)
    }

    // =========================================
    // Calls
    // =========================================

    /// Arguments run left to right after the receiver. Member functions are
    /// bound statically; an inherited one gets its receiver cast to the
    /// declaring class.
    fn lower_call(&mut self, call: &CallExpr<'_>) -> Result<Option<Operand>, InternalError> {
        let ctx = self.ctx;
        let function = self.bound_symbol(call.id, "function", call.callee.span)?;
        let entry = ctx.symbols.function(function).ok_or_else(|| {
            InternalError::invariant(format!("'{}' is not a function", ctx.symbols.name(function)))
        })?;
        let (signature, _) = lower::signature(&ctx.symbols, function)?;

        let mut args = Vec::with_capacity(call.args.len() + 1);
        if let Some(owner) = entry.owner {
            let (receiver, class) = match call.receiver {
                Some(receiver) => {
                    let class = self.expr_type(receiver)?.class_behind_pointer();
                    (self.value(receiver)?, class)
                }
                None => (self.receiver(call.span)?, self.owner),
            };
            let receiver = if class == Some(owner) {
                receiver
            } else {
                let dest = self.ids.temp(lower::receiver_type(&ctx.symbols, owner));
                self.emit(Instruction::Cast {
                    dest: dest.clone(),
                    value: receiver,
                });
                dest
            };
            args.push(receiver);
        }
        for arg in call.args {
            args.push(self.value(arg)?);
        }

        let dest = if signature.return_type.is_void() {
            None
        } else {
            Some(self.ids.temp(signature.return_type.clone()))
        };
        self.emit(Instruction::Call {
            dest: dest.clone(),
            callee: entry.link_name.clone(),
            signature,
            args,
        });
        Ok(dest)
    }
}
